use crate::NodeId;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Entry {
    Parent(NodeId),
    Root { rank: u32 },
}

/// Union by rank with path compression, one entry per node.
///
/// The node arena and this table grow in lock step, so a [`NodeId`]
/// indexes both.
#[derive(Debug, Clone, Default)]
pub(crate) struct UnionFind {
    entries: Vec<Entry>,
}

impl UnionFind {
    pub fn make_set(&mut self) -> NodeId {
        let id = NodeId::from(self.entries.len());
        self.entries.push(Entry::Root { rank: 0 });
        id
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        matches!(self.entries[usize::from(id)], Entry::Root { .. })
    }

    pub fn find(&self, mut current: NodeId) -> NodeId {
        loop {
            match self.entries[usize::from(current)] {
                Entry::Parent(parent) => current = parent,
                Entry::Root { .. } => return current,
            }
        }
    }

    /// Like [`find`](UnionFind::find), but repoints every entry on the
    /// walked path directly at the root.
    pub fn find_mut(&mut self, mut current: NodeId) -> NodeId {
        let root = self.find(current);
        while let Entry::Parent(parent) = self.entries[usize::from(current)] {
            self.entries[usize::from(current)] = Entry::Parent(root);
            current = parent;
        }
        root
    }

    /// Unions two distinct roots, returning `(winner, loser)`. The
    /// higher-ranked side wins; on equal ranks `b` wins and its rank
    /// grows by one.
    pub fn union(&mut self, a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        debug_assert!(a != b);
        debug_assert!(self.is_root(a) && self.is_root(b));

        let rank_a = self.rank(a);
        let rank_b = self.rank(b);
        let (winner, loser) = if rank_a > rank_b { (a, b) } else { (b, a) };
        if rank_a == rank_b {
            self.entries[usize::from(winner)] = Entry::Root { rank: rank_b + 1 };
        }
        self.entries[usize::from(loser)] = Entry::Parent(winner);
        (winner, loser)
    }

    fn rank(&self, id: NodeId) -> u32 {
        match self.entries[usize::from(id)] {
            Entry::Root { rank } => rank,
            Entry::Parent(_) => unreachable!("rank of a non-root"),
        }
    }
}
