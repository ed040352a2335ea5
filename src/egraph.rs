use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::ops::Index;

use log::{debug, trace};
use smallvec::SmallVec;
use thiserror::Error;

use crate::arena::{Arena, ArenaId};
use crate::dot::Dot;
use crate::eclass::EClass;
use crate::extract::{CostFunction, Extractor, TermSize};
use crate::hashcons::{Hashcons, HashconsLink};
use crate::language::NodeData;
use crate::unionfind::UnionFind;
use crate::util::{IndexSet, Instant};
use crate::NodeId;

/// A worklist of pending merges, drained to congruence-closure
/// fixpoint by [`EGraph::merge_batch`].
///
/// Rewrite drivers typically collect every candidate pair they find in
/// one pass over the e-graph and then drain them in a single batch.
pub type MergeQueue = VecDeque<(NodeId, NodeId)>;

/// The error reported by [`EGraph::child`] for an out-of-range slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("child index {index} out of bounds for a node with {len} children")]
pub struct ChildIndexError {
    /// The requested slot.
    pub index: usize,
    /// How many children the node actually has.
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DownId(u32);

impl ArenaId for DownId {
    fn from_index(index: usize) -> Self {
        DownId(index as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UseId(u32);

impl ArenaId for UseId {
    fn from_index(index: usize) -> Self {
        UseId(index as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One record of the cyclic membership ring threading every node of an
/// e-class.
#[derive(Debug)]
pub(crate) struct DownCell {
    pub(crate) node: NodeId,
    pub(crate) next: DownId,
}

/// One record of the cyclic ring listing `(parent, slot)` pairs that
/// point into an e-class.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UseCell {
    parent: NodeId,
    child_index: u32,
    next: UseId,
}

/// Per-node storage. The children sequence has its length fixed at
/// creation; its contents are rewritten from one class root to another
/// during congruence-driven merges.
#[derive(Debug)]
pub(crate) struct NodeCell<D> {
    pub(crate) data: D,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) down: Option<DownId>,
    uses: Option<UseId>,
    pub(crate) hc: HashconsLink,
}

/// An e-graph over the alphabet `D`.
///
/// Construction is hash-consed: [`add`](EGraph::add) returns the class
/// of an existing structurally identical node instead of duplicating
/// it. [`merge`](EGraph::merge) unions two classes and closes the
/// result under upward congruence. All storage is arena-owned; nodes
/// are never individually freed, so [`NodeId`]s stay valid until the
/// e-graph itself is dropped.
pub struct EGraph<D: NodeData> {
    nodes: Arena<NodeId, NodeCell<D>>,
    downs: Arena<DownId, DownCell>,
    uses: Arena<UseId, UseCell>,
    unionfind: UnionFind,
    hashcons: Hashcons,
    roots: IndexSet<NodeId>,
}

impl<D: NodeData> Default for EGraph<D> {
    fn default() -> Self {
        EGraph {
            nodes: Arena::default(),
            downs: Arena::default(),
            uses: Arena::default(),
            unionfind: UnionFind::default(),
            hashcons: Hashcons::default(),
            roots: IndexSet::default(),
        }
    }
}

impl<D: NodeData> Debug for EGraph<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EGraph")
            .field("nodes", &self.nodes.len())
            .field("classes", &self.roots.len())
            .finish()
    }
}

impl<D: NodeData> EGraph<D> {
    /// Creates an empty e-graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical root of `id`'s e-class.
    ///
    /// Two handles denote the same class exactly when their roots are
    /// equal. This borrowing variant does not compress paths; prefer
    /// [`find_mut`](EGraph::find_mut) when you have exclusive access.
    pub fn find(&self, id: NodeId) -> NodeId {
        self.unionfind.find(id)
    }

    /// Like [`find`](EGraph::find), with path compression.
    pub fn find_mut(&mut self, id: NodeId) -> NodeId {
        self.unionfind.find_mut(id)
    }

    /// Whether `a` and `b` are currently in the same e-class.
    pub fn equiv(&self, a: NodeId, b: NodeId) -> bool {
        self.find(a) == self.find(b)
    }

    /// The data carried by the node `id`.
    ///
    /// Also available through indexing: `&egraph[id]`.
    pub fn data(&self, id: NodeId) -> &D {
        &self.nodes[id].data
    }

    /// The children of `id`, each the root of its class at the time of
    /// the last merge that touched it.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Bounds-checked child access.
    pub fn child(&self, id: NodeId, index: usize) -> Result<NodeId, ChildIndexError> {
        let children = self.children(id);
        children.get(index).copied().ok_or(ChildIndexError {
            index,
            len: children.len(),
        })
    }

    /// Iterates over the current e-class roots, in insertion order.
    pub fn roots(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.roots.iter().copied()
    }

    /// How many e-classes the e-graph currently has.
    pub fn number_of_classes(&self) -> usize {
        self.roots.len()
    }

    /// How many nodes were ever created, live or stale.
    pub fn total_number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the e-graph has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// A borrowed view of `id`'s e-class.
    pub fn eclass(&self, id: NodeId) -> EClass<'_, D> {
        EClass::new(self, self.find(id))
    }

    /// Consults the hashcons without inserting: the class of a node
    /// shaped `data(children...)`, if one exists. Children must be
    /// canonical roots, as for [`add`](EGraph::add).
    pub fn lookup(&self, data: &D, children: &[NodeId]) -> Option<NodeId> {
        debug_assert!(children.iter().all(|&c| self.unionfind.is_root(c)));
        self.hashcons
            .lookup(&self.nodes, data, children)
            .map(|id| self.find(id))
    }

    /// A [`Dot`] wrapper for rendering this e-graph with GraphViz.
    pub fn dot(&self) -> Dot<'_, D> {
        Dot::new(self)
    }

    /// Runs minimum-term-size extraction over every class.
    pub fn extract(&self) -> Extractor<'_, D, TermSize> {
        Extractor::new(self, TermSize)
    }

    /// Runs extraction under a caller-supplied [`CostFunction`].
    pub fn extract_with<CF: CostFunction<D>>(&self, cost_fn: CF) -> Extractor<'_, D, CF> {
        Extractor::new(self, cost_fn)
    }

    /// Adds the node `data(children...)`, returning its class.
    ///
    /// Every child must be a canonical root (the result of an earlier
    /// `add` or of [`find`](EGraph::find)). If a structurally
    /// identical node already exists, no node is created and the
    /// existing class is returned.
    pub fn add(&mut self, data: D, children: &[NodeId]) -> NodeId {
        debug_assert!(
            children.iter().all(|&c| self.unionfind.is_root(c)),
            "children passed to add must be canonical roots"
        );

        if let Some(existing) = self.hashcons.lookup(&self.nodes, &data, children) {
            trace!("add {:?} {:?}: hit {:?}", data, children, existing);
            return self.find_mut(existing);
        }

        let id = self.nodes.alloc(NodeCell {
            data,
            children: SmallVec::from_slice(children),
            down: None,
            uses: None,
            hc: HashconsLink::absent(),
        });
        let set = self.unionfind.make_set();
        debug_assert_eq!(id, set);
        debug_assert_eq!(self.unionfind.size(), self.nodes.len());

        let down = self.downs.alloc_with(|down| DownCell { node: id, next: down });
        self.nodes[id].down = Some(down);

        for (slot, &child) in children.iter().enumerate() {
            let record = self.uses.alloc_with(|record| UseCell {
                parent: id,
                child_index: slot as u32,
                next: record,
            });
            self.splice_use(child, record);
        }

        self.hashcons.insert(&mut self.nodes, id);
        self.roots.insert(id);
        trace!("add: new node {:?}: {:?}", id, self.nodes[id].data);
        id
    }

    /// Adds a childless node; shorthand for `add(data, &[])`.
    pub fn add_leaf(&mut self, data: D) -> NodeId {
        self.add(data, &[])
    }

    /// Merges the classes of `a` and `b` and closes the result under
    /// upward congruence. Returns whether anything changed.
    pub fn merge(&mut self, a: NodeId, b: NodeId) -> bool {
        let mut queue = MergeQueue::from([(a, b)]);
        self.merge_batch(&mut queue)
    }

    /// Drains a worklist of merges to fixpoint.
    ///
    /// Pairs are processed in order; every congruence discovered along
    /// the way is pushed onto the same worklist. When this returns,
    /// `find(a) == find(b)` holds for every submitted pair and every
    /// upward-congruent consequence has been applied. The flag is
    /// `false` iff every pair was already merged, which is the
    /// fixpoint test for equality-saturation drivers.
    pub fn merge_batch(&mut self, queue: &mut MergeQueue) -> bool {
        let start = Instant::now();
        let mut unions = 0usize;

        while let Some((a, b)) = queue.pop_front() {
            let a = self.find_mut(a);
            let b = self.find_mut(b);
            if a == b {
                continue;
            }

            let (winner, loser) = self.unionfind.union(a, b);
            unions += 1;
            trace!("union: {:?} -> {:?}", loser, winner);
            self.roots.swap_remove(&loser);

            // splice the loser's membership ring into the winner's
            let winner_down = self.nodes[winner].down.expect("class roots head a membership ring");
            let loser_down = self.nodes[loser]
                .down
                .take()
                .expect("class roots head a membership ring");
            let tmp = self.downs[winner_down].next;
            self.downs[winner_down].next = self.downs[loser_down].next;
            self.downs[loser_down].next = tmp;

            // donate the loser's use ring, remembering the donated
            // segment so only those parents are rewritten
            let Some(last) = self.nodes[loser].uses.take() else {
                continue;
            };
            let first = self.uses[last].next;
            match self.nodes[winner].uses {
                None => self.nodes[winner].uses = Some(last),
                Some(head) => {
                    let tmp = self.uses[head].next;
                    self.uses[head].next = self.uses[last].next;
                    self.uses[last].next = tmp;
                }
            }

            let mut cursor = first;
            loop {
                let UseCell {
                    parent,
                    child_index,
                    next,
                } = self.uses[cursor];

                // a parent already evicted by an earlier rewrite in
                // this batch is stale; leave it untouched
                if self.nodes[parent].hc.is_in_table() {
                    self.hashcons.erase(&mut self.nodes, parent);
                    self.nodes[parent].children[child_index as usize] = winner;
                    let twin = self.hashcons.lookup(
                        &self.nodes,
                        &self.nodes[parent].data,
                        &self.nodes[parent].children,
                    );
                    match twin {
                        None => self.hashcons.insert(&mut self.nodes, parent),
                        Some(twin) => {
                            trace!("congruent: {:?} ~ {:?}", parent, twin);
                            queue.push_back((parent, twin));
                        }
                    }
                }

                if cursor == last {
                    break;
                }
                cursor = next;
            }
        }

        if unions > 0 {
            debug!(
                "merged {} classes in {:.2?}, {} remain",
                unions,
                start.elapsed(),
                self.roots.len()
            );
        }
        unions > 0
    }

    fn splice_use(&mut self, root: NodeId, record: UseId) {
        match self.nodes[root].uses {
            None => self.nodes[root].uses = Some(record),
            Some(head) => {
                let tmp = self.uses[head].next;
                self.uses[head].next = self.uses[record].next;
                self.uses[record].next = tmp;
            }
        }
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.nodes[id].hc.is_in_table()
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeCell<D> {
        &self.nodes[id]
    }

    pub(crate) fn down(&self, id: DownId) -> &DownCell {
        &self.downs[id]
    }

    /// Calls `f(parent, slot)` for every use record in `root`'s ring.
    pub(crate) fn each_use(&self, root: NodeId, mut f: impl FnMut(NodeId, u32)) {
        let Some(head) = self.nodes[root].uses else {
            return;
        };
        let mut cursor = head;
        loop {
            let UseCell {
                parent,
                child_index,
                next,
            } = self.uses[cursor];
            f(parent, child_index);
            cursor = next;
            if cursor == head {
                break;
            }
        }
    }

    #[cfg(test)]
    fn use_count(&self) -> usize {
        self.uses.len()
    }
}

impl<D: NodeData> Index<NodeId> for EGraph<D> {
    type Output = D;

    fn index(&self, id: NodeId) -> &D {
        self.data(id)
    }
}
