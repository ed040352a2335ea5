use std::fmt::{self, Debug};

use crate::egraph::{DownId, EGraph};
use crate::language::NodeData;
use crate::NodeId;

/// A borrowed view of one equivalence class.
///
/// Obtained from [`EGraph::eclass`]; the handle passed there is
/// canonicalized first, so views of any two merged handles see the
/// same class.
pub struct EClass<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
    root: NodeId,
}

impl<'a, D: NodeData> EClass<'a, D> {
    pub(crate) fn new(egraph: &'a EGraph<D>, root: NodeId) -> Self {
        EClass { egraph, root }
    }

    /// The canonical root identifying this class.
    pub fn id(&self) -> NodeId {
        self.root
    }

    /// Iterates over the live nodes of this class, each exactly once,
    /// in unspecified order.
    pub fn iter(&self) -> ClassIter<'a, D> {
        let start = self
            .egraph
            .node(self.root)
            .down
            .expect("class roots head a membership ring");
        ClassIter {
            egraph: self.egraph,
            start,
            cursor: Some(start),
        }
    }

    /// How many live nodes the class has. Walks the class.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the class has no live nodes. A class reachable through
    /// a public handle always has at least one.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The live nodes whose data equals `data`.
    pub fn matching_data(&self, data: D) -> impl Iterator<Item = NodeId> + 'a {
        let egraph = self.egraph;
        self.iter().filter(move |&node| *egraph.data(node) == data)
    }

    /// The live nodes whose kind equals `kind`.
    pub fn matching_kind(&self, kind: D::Kind) -> impl Iterator<Item = NodeId> + 'a {
        let egraph = self.egraph;
        self.iter()
            .filter(move |&node| *egraph.data(node).kind() == kind)
    }
}

impl<'a, D: NodeData> IntoIterator for EClass<'a, D> {
    type Item = NodeId;
    type IntoIter = ClassIter<'a, D>;

    fn into_iter(self) -> ClassIter<'a, D> {
        self.iter()
    }
}

impl<D: NodeData> Debug for EClass<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EClass")
            .field("id", &self.root)
            .field("nodes", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over the live nodes of an e-class.
///
/// The membership ring still threads nodes that were evicted from the
/// hashcons when a structural twin appeared during a merge; those are
/// skipped, so every yielded node is live.
pub struct ClassIter<'a, D: NodeData> {
    egraph: &'a EGraph<D>,
    start: DownId,
    cursor: Option<DownId>,
}

impl<D: NodeData> Iterator for ClassIter<'_, D> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(current) = self.cursor {
            let record = self.egraph.down(current);
            let node = record.node;
            let next = record.next;
            self.cursor = if next == self.start { None } else { Some(next) };
            if self.egraph.is_live(node) {
                return Some(node);
            }
        }
        None
    }
}
