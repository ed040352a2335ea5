use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::debug;

use crate::egraph::EGraph;
use crate::language::NodeData;
use crate::util::{HashMap, Instant};
use crate::NodeId;

/// The total cost of a term.
pub type Cost = u64;

/// A cost model over nodes.
///
/// The cost of a whole term is the node's own cost plus the cost of
/// the best term of each child class; extraction minimizes that sum
/// per class. For the minimum to be well-defined, `node_cost` must be
/// strictly positive — every node makes any term containing it
/// strictly more expensive than its subterms.
///
/// Any `FnMut(&D) -> Cost` closure is a cost function that prices a
/// node by its data alone:
///
/// ```
/// use yolk::{Cost, EGraph, NodeKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Op {
///     X,
///     Cheap,
///     Pricey,
/// }
/// impl NodeKind for Op {}
///
/// let mut egraph = EGraph::<Op>::default();
/// let x = egraph.add_leaf(Op::X);
/// let cheap = egraph.add(Op::Cheap, &[x]);
/// let pricey = egraph.add(Op::Pricey, &[x]);
/// egraph.merge(cheap, pricey);
///
/// let extractor = egraph.extract_with(|op: &Op| match op {
///     Op::Pricey => 10,
///     _ => 1,
/// });
/// let (cost, best) = extractor.best(cheap);
/// assert_eq!((cost, best), (2, cheap));
/// ```
pub trait CostFunction<D> {
    /// The cost this node contributes on top of its children. Must be
    /// at least 1.
    fn node_cost(&mut self, data: &D, child_count: usize) -> Cost;
}

/// The default cost model: every node costs 1, so the best term is the
/// smallest.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermSize;

impl<D> CostFunction<D> for TermSize {
    fn node_cost(&mut self, _data: &D, _child_count: usize) -> Cost {
        1
    }
}

impl<D, F: FnMut(&D) -> Cost> CostFunction<D> for F {
    fn node_cost(&mut self, data: &D, _child_count: usize) -> Cost {
        self(data)
    }
}

/// Chooses a minimum-cost representative node for every e-class.
///
/// Construction runs the whole analysis, bottom-up from the leaves:
/// classes are settled in ascending cost order, and settling a class
/// relaxes every parent recorded in its use ring. Strictly positive
/// node costs make settled costs final, exactly as in Dijkstra's
/// algorithm. The e-graph is borrowed immutably throughout; extraction
/// never changes it.
pub struct Extractor<'a, D: NodeData, CF> {
    egraph: &'a EGraph<D>,
    cost_fn: CF,
    best: HashMap<NodeId, (Cost, NodeId)>,
}

impl<'a, D: NodeData, CF: CostFunction<D>> Extractor<'a, D, CF> {
    /// Runs the cost analysis over every class of `egraph`.
    pub fn new(egraph: &'a EGraph<D>, cost_fn: CF) -> Self {
        let mut extractor = Extractor {
            egraph,
            cost_fn,
            best: HashMap::default(),
        };
        extractor.find_costs();
        extractor
    }

    /// The minimum total cost and the representative achieving it for
    /// `id`'s class.
    pub fn best(&self, id: NodeId) -> (Cost, NodeId) {
        *self
            .best
            .get(&self.egraph.find(id))
            .expect("every reachable class has a finite-cost representative")
    }

    /// Iterates over `(class root, representative, cost)` for every
    /// class that was assigned a representative.
    pub fn choices(&self) -> impl Iterator<Item = (NodeId, NodeId, Cost)> + '_ {
        self.best
            .iter()
            .map(|(&class, &(cost, node))| (class, node, cost))
    }

    fn find_costs(&mut self) {
        let start = Instant::now();
        let egraph = self.egraph;
        let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();

        // seed with the live leaves
        for index in 0..egraph.total_number_of_nodes() {
            let id = NodeId::from(index);
            if egraph.is_live(id) && egraph.children(id).is_empty() {
                let cost = self.cost_fn.node_cost(egraph.data(id), 0);
                debug_assert!(cost > 0, "node costs must be strictly positive");
                self.relax(egraph.find(id), cost, id, &mut heap);
            }
        }

        let mut pops = 0usize;
        while let Some(Reverse((cost, class))) = heap.pop() {
            pops += 1;
            if self.best[&class].0 != cost {
                continue; // superseded by a cheaper entry
            }
            egraph.each_use(class, |parent, _slot| {
                if !egraph.is_live(parent) {
                    return;
                }
                if let Some(candidate) = self.total_cost(parent) {
                    debug_assert!(candidate > cost);
                    self.relax(egraph.find(parent), candidate, parent, &mut heap);
                }
            });
        }

        debug!(
            "extracted {} classes in {} pops, {:.2?}",
            self.best.len(),
            pops,
            start.elapsed()
        );
    }

    /// The full term cost of picking `node`, or `None` while some
    /// child class is still unsettled.
    fn total_cost(&mut self, node: NodeId) -> Option<Cost> {
        let egraph = self.egraph;
        let mut total = self
            .cost_fn
            .node_cost(egraph.data(node), egraph.children(node).len());
        debug_assert!(total > 0, "node costs must be strictly positive");
        for &child in egraph.children(node) {
            let (cost, _) = *self.best.get(&egraph.find(child))?;
            total = total.saturating_add(cost);
        }
        Some(total)
    }

    fn relax(
        &mut self,
        class: NodeId,
        cost: Cost,
        node: NodeId,
        heap: &mut BinaryHeap<Reverse<(Cost, NodeId)>>,
    ) {
        let improved = match self.best.get(&class) {
            None => true,
            Some(&(old, _)) => cost < old,
        };
        if improved {
            self.best.insert(class, (cost, node));
            heap.push(Reverse((cost, class)));
        }
    }
}
