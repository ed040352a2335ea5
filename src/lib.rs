#![warn(missing_docs)]
/*!

`yolk` is a small e-graph library built around hash-consing and
upward congruence closure.

An [`EGraph`] stores term-shaped nodes over a caller-supplied symbol
alphabet, shares structurally identical subterms, and groups equivalent
terms into e-classes. Merging two classes automatically propagates
upward: if `f(x)` and `f(y)` exist and `x` is merged with `y`, the
classes of `f(x)` and `f(y)` are merged too, and so on to a fixpoint.
A minimum-cost representative term can then be picked out of every
class with an [`Extractor`].

The alphabet is supplied through the [`NodeKind`] and [`NodeData`]
traits: a plain `enum` of operators implements [`NodeKind`] in one
line, while languages with payloads (embedded constants, variable
names) implement [`NodeData`] directly.

## Example

```
use yolk::{EGraph, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Bool {
    True,
    False,
    Not,
    And,
}
impl NodeKind for Bool {}

let mut egraph = EGraph::<Bool>::default();

let t = egraph.add_leaf(Bool::True);
let f = egraph.add_leaf(Bool::False);
let not_f = egraph.add(Bool::Not, &[f]);
let conj = egraph.add(Bool::And, &[t, not_f]);

// ¬false = true
egraph.merge(t, not_f);
assert!(egraph.equiv(t, not_f));

// the cheapest term in true's class is the literal
let extractor = egraph.extract();
let (cost, best) = extractor.best(t);
assert_eq!(cost, 1);
assert_eq!(egraph.data(best), &Bool::True);
# let _ = conj;
```

## Logging

`yolk` reports what it is doing through the [`log`](https://docs.rs/log)
crate facade: per-operation events at `trace` level, merge and
extraction summaries at `debug`. The easiest way to see them is to call
`env_logger::init()` near the top of your `main` and set
`RUST_LOG=yolk=debug`.

*/

mod arena;
mod dot;
mod eclass;
mod egraph;
mod extract;
mod hashcons;
mod language;
mod unionfind;
mod util;

/// A handle to a node in an [`EGraph`].
///
/// Handles are small, copyable, and stay dereferenceable for the
/// lifetime of the e-graph that issued them. A handle is *not*
/// automatically canonical: after a merge, the node it points at may no
/// longer be the root of its class. Pass it through [`EGraph::find`]
/// before using it as a child or comparing class identity.
#[derive(Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct NodeId(u32);

impl From<usize> for NodeId {
    fn from(n: usize) -> NodeId {
        NodeId(n as u32)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> usize {
        id.0 as usize
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl arena::ArenaId for NodeId {
    fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

pub use {
    dot::Dot,
    eclass::{ClassIter, EClass},
    egraph::{ChildIndexError, EGraph, MergeQueue},
    extract::{Cost, CostFunction, Extractor, TermSize},
    language::{NodeData, NodeKind},
};

#[cfg(test)]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
