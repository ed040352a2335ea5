use std::hash::{Hash, Hasher};

use crate::arena::Arena;
use crate::egraph::NodeCell;
use crate::language::NodeData;
use crate::NodeId;

const BUCKET_COUNT: usize = 1024;

/// Intrusive chain links embedded in every node cell.
///
/// A node starts outside the table, is inserted when it is created,
/// and may bounce out and back in while its children are rewritten
/// during a merge. A node that stays out is *stale*: a structural twin
/// occupies its key.
#[derive(Debug, Clone)]
pub(crate) struct HashconsLink {
    bucket: u32,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    in_table: bool,
}

impl HashconsLink {
    pub(crate) fn absent() -> Self {
        HashconsLink {
            bucket: 0,
            prev: None,
            next: None,
            in_table: false,
        }
    }

    pub(crate) fn is_in_table(&self) -> bool {
        self.in_table
    }
}

/// Open-hashed table mapping `(data, child identities)` to the unique
/// node carrying that shape.
///
/// Chains are threaded through the node cells themselves, so the table
/// proper is just the bucket heads. The bucket count is fixed; load
/// factor grows with the e-graph.
#[derive(Debug)]
pub(crate) struct Hashcons {
    buckets: Vec<Option<NodeId>>,
}

impl Default for Hashcons {
    fn default() -> Self {
        Hashcons {
            buckets: vec![None; BUCKET_COUNT],
        }
    }
}

impl Hashcons {
    fn bucket_of<D: NodeData>(&self, data: &D, children: &[NodeId]) -> usize {
        let mut hasher = fxhash::FxHasher::default();
        data.hash(&mut hasher);
        children.len().hash(&mut hasher);
        for child in children {
            child.hash(&mut hasher);
        }
        hasher.finish() as usize % self.buckets.len()
    }

    /// Finds the node whose data and exact child sequence match, if any.
    pub(crate) fn lookup<D: NodeData>(
        &self,
        nodes: &Arena<NodeId, NodeCell<D>>,
        data: &D,
        children: &[NodeId],
    ) -> Option<NodeId> {
        let mut cursor = self.buckets[self.bucket_of(data, children)];
        while let Some(id) = cursor {
            let cell = &nodes[id];
            if cell.data == *data && cell.children.as_slice() == children {
                return Some(id);
            }
            cursor = cell.hc.next;
        }
        None
    }

    /// Links `id` at the front of its bucket. The node must not
    /// currently be in the table.
    pub(crate) fn insert<D: NodeData>(&mut self, nodes: &mut Arena<NodeId, NodeCell<D>>, id: NodeId) {
        debug_assert!(!nodes[id].hc.in_table);

        let bucket = {
            let cell = &nodes[id];
            self.bucket_of(&cell.data, &cell.children)
        };
        let head = self.buckets[bucket];
        if let Some(head_id) = head {
            nodes[head_id].hc.prev = Some(id);
        }
        nodes[id].hc = HashconsLink {
            bucket: bucket as u32,
            prev: None,
            next: head,
            in_table: true,
        };
        self.buckets[bucket] = Some(id);
    }

    /// Unlinks `id`. The node must currently be in the table.
    pub(crate) fn erase<D: NodeData>(&mut self, nodes: &mut Arena<NodeId, NodeCell<D>>, id: NodeId) {
        debug_assert!(nodes[id].hc.in_table);

        let link = std::mem::replace(&mut nodes[id].hc, HashconsLink::absent());
        match link.prev {
            Some(prev) => nodes[prev].hc.next = link.next,
            None => self.buckets[link.bucket as usize] = link.next,
        }
        if let Some(next) = link.next {
            nodes[next].hc.prev = link.prev;
        }
    }
}
