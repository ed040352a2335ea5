use std::fmt::Debug;
use std::hash::Hash;

/// The payload carried by every node in an
/// [`EGraph`](crate::EGraph).
///
/// A payload is conceptually a `(kind, payload)` pair: the *kind* is
/// the discrete operator symbol, and the rest is whatever extra value
/// the language attaches to it (an embedded constant, a variable
/// name). Two nodes are structurally identical, and therefore
/// hash-consed together, exactly when their data *and* their child
/// sequences are equal.
///
/// Equality and hashing must agree, as usual. `Display` is only needed
/// if you want to render the e-graph with [`Dot`](crate::Dot).
///
/// # Example
///
/// A small arithmetic language with embedded integer constants:
///
/// ```
/// use yolk::{EGraph, NodeData};
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Math {
///     Num(i64),
///     Add,
///     Mul,
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum MathKind {
///     Num,
///     Add,
///     Mul,
/// }
///
/// impl NodeData for Math {
///     type Kind = MathKind;
///     fn kind(&self) -> &MathKind {
///         match self {
///             Math::Num(_) => &MathKind::Num,
///             Math::Add => &MathKind::Add,
///             Math::Mul => &MathKind::Mul,
///         }
///     }
/// }
///
/// let mut egraph = EGraph::<Math>::default();
/// let one = egraph.add_leaf(Math::Num(1));
/// let two = egraph.add_leaf(Math::Num(2));
/// let sum = egraph.add(Math::Add, &[one, two]);
/// let three = egraph.add_leaf(Math::Num(3));
/// egraph.merge(sum, three);
/// ```
pub trait NodeData: Debug + Clone + Eq + Hash {
    /// The discrete symbol part of this payload.
    type Kind: Debug + Clone + Eq + Hash;

    /// The kind of this value, used by
    /// [`EClass::matching_kind`](crate::EClass::matching_kind).
    fn kind(&self) -> &Self::Kind;
}

/// Marker for alphabets whose payload is nothing but the operator
/// symbol itself.
///
/// Implementing `NodeKind` for a type lifts it into [`NodeData`] with
/// `Kind = Self`, so a plain `enum` of operators is a complete
/// language definition:
///
/// ```
/// use yolk::{EGraph, NodeKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Op {
///     Zero,
///     Succ,
/// }
/// impl NodeKind for Op {}
///
/// let mut egraph = EGraph::<Op>::default();
/// let zero = egraph.add_leaf(Op::Zero);
/// let one = egraph.add(Op::Succ, &[zero]);
/// # let _ = one;
/// ```
pub trait NodeKind: Debug + Clone + Eq + Hash {}

impl<K: NodeKind> NodeData for K {
    type Kind = K;

    fn kind(&self) -> &K {
        self
    }
}
