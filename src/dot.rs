/*!
EGraph visualization with [GraphViz].

Use the [`Dot`] struct to visualize an [`EGraph`].

[GraphViz]: https://graphviz.gitlab.io/
!*/

use std::fmt::{self, Debug, Display, Formatter};
use std::io::{Result, Write};
use std::path::Path;

use crate::egraph::EGraph;
use crate::language::NodeData;
use crate::util::HashMap;
use crate::NodeId;

/// A wrapper for an [`EGraph`] that can output [GraphViz] for
/// visualization.
///
/// Each e-class is rendered as a dotted cluster of its live nodes;
/// edges run from a node to the cluster of each child class, labeled
/// with the child slot.
///
/// # Example
///
/// ```
/// use yolk::{EGraph, NodeKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Op {
///     X,
///     Neg,
/// }
/// impl NodeKind for Op {}
///
/// impl std::fmt::Display for Op {
///     fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
///         write!(f, "{:?}", self)
///     }
/// }
///
/// let mut egraph = EGraph::<Op>::default();
/// let x = egraph.add_leaf(Op::X);
/// let neg = egraph.add(Op::Neg, &[x]);
/// let neg_neg = egraph.add(Op::Neg, &[egraph.find(neg)]);
/// egraph.merge(neg_neg, x);
///
/// // Dot implements std::fmt::Display
/// let rendered = egraph.dot().to_string();
/// assert!(rendered.starts_with("digraph egraph {"));
/// ```
///
/// [GraphViz]: https://graphviz.gitlab.io/
pub struct Dot<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
}

impl<'a, D: NodeData> Dot<'a, D> {
    /// Given a reference to an [`EGraph`], makes a `Dot`. See also the
    /// more convenient [`EGraph::dot`].
    pub fn new(egraph: &'a EGraph<D>) -> Self {
        Dot { egraph }
    }
}

impl<D: NodeData + Display> Dot<'_, D> {
    /// Writes the `Dot` to a .dot file with the given filename. Does
    /// _not_ require a `dot` binary.
    pub fn to_dot(&self, filename: impl AsRef<Path>) -> Result<()> {
        let mut file = std::fs::File::create(filename)?;
        write!(file, "{}", self)?;
        Ok(())
    }
}

impl<D: NodeData> Debug for Dot<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dot({:?})", self.egraph)
    }
}

impl<D: NodeData + Display> Display for Dot<'_, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let egraph = self.egraph;

        // number the live nodes and pick an anchor node per cluster
        // for edges to point at
        let mut ids: HashMap<NodeId, usize> = HashMap::default();
        let mut anchors: HashMap<NodeId, usize> = HashMap::default();
        for root in egraph.roots() {
            for node in egraph.eclass(root).iter() {
                let next = ids.len();
                ids.insert(node, next);
                anchors.entry(root).or_insert(next);
            }
        }

        writeln!(f, "digraph egraph {{")?;

        // set compound=true to enable edges to clusters
        writeln!(f, "  compound=true")?;
        writeln!(f, "  clusterrank=local")?;

        for root in egraph.roots() {
            writeln!(f, "  subgraph cluster_{} {{", root)?;
            writeln!(f, "    style=dotted")?;
            for node in egraph.eclass(root).iter() {
                writeln!(f, "    node{} [label = \"{}\"]", ids[&node], egraph.data(node))?;
            }
            writeln!(f, "  }}")?;
        }

        for root in egraph.roots() {
            for node in egraph.eclass(root).iter() {
                for (slot, &child) in egraph.children(node).iter().enumerate() {
                    let child_root = egraph.find(child);
                    writeln!(
                        f,
                        "  node{} -> node{} [lhead = cluster_{}, label = {}]",
                        ids[&node], anchors[&child_root], child_root, slot
                    )?;
                }
            }
        }

        write!(f, "}}")
    }
}
