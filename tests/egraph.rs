use yolk::{EGraph, MergeQueue, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Op {
    F,
    G,
    H,
    X,
    Y,
    Z,
    A,
    B,
}
impl NodeKind for Op {}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn hashcons() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    assert_eq!(egraph.add_leaf(Op::X), egraph.add_leaf(Op::X));
    assert_ne!(egraph.add_leaf(Op::Y), egraph.add_leaf(Op::X));

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);

    let a = egraph.add(Op::F, &[x]);
    let b = egraph.add(Op::F, &[x]);
    assert_eq!(a, b);

    let b = egraph.add(Op::F, &[y]);
    assert_ne!(a, b);

    let b = egraph.add(Op::G, &[x]);
    assert_ne!(a, b);

    let a = egraph.add(Op::H, &[x, y]);
    let b = egraph.add(Op::H, &[x, y]);
    assert_eq!(a, b);

    let b = egraph.add(Op::H, &[x]);
    assert_ne!(a, b);

    // seven distinct shapes were ever created
    assert_eq!(egraph.total_number_of_nodes(), 7);
    assert_eq!(egraph.number_of_classes(), 7);
}

#[test]
fn lookup_without_insert() {
    let mut egraph = EGraph::<Op>::default();
    let x = egraph.add_leaf(Op::X);

    assert_eq!(egraph.lookup(&Op::X, &[]), Some(x));
    assert_eq!(egraph.lookup(&Op::F, &[x]), None);

    let f = egraph.add(Op::F, &[x]);
    assert_eq!(egraph.lookup(&Op::F, &[x]), Some(f));
    assert_eq!(egraph.total_number_of_nodes(), 2);
}

#[test]
fn transitive() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let z = egraph.add_leaf(Op::Z);
    assert!(!egraph.equiv(x, y));
    assert!(!egraph.equiv(x, z));
    assert!(!egraph.equiv(y, z));

    egraph.merge(x, y);
    assert!(egraph.equiv(x, y));
    assert_eq!(egraph.add_leaf(Op::X), egraph.add_leaf(Op::Y));

    egraph.merge(y, z);
    assert!(egraph.equiv(y, z));
    assert!(egraph.equiv(x, z));
    assert_eq!(egraph.add_leaf(Op::X), egraph.add_leaf(Op::Z));
}

#[test]
fn find_is_idempotent() {
    let mut egraph = EGraph::<Op>::default();
    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    egraph.merge(x, y);

    assert_eq!(egraph.find(egraph.find(x)), egraph.find(x));
    let root = egraph.find_mut(x);
    assert_eq!(egraph.find_mut(root), root);
}

#[test]
fn congruent_merge_before() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    egraph.merge(x, y);

    // F over a merged class dedups at construction
    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let fx = egraph.add(Op::F, &[x]);
    let fy = egraph.add(Op::F, &[y]);
    assert_eq!(fx, fy);

    let a = egraph.add_leaf(Op::A);
    let b = egraph.add_leaf(Op::B);
    egraph.merge(fx, a);
    egraph.merge(fy, b);
    assert!(egraph.equiv(a, b));
}

#[test]
fn congruent_merge_after() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let fx = egraph.add(Op::F, &[x]);
    let fy = egraph.add(Op::F, &[y]);
    assert!(!egraph.equiv(fx, fy));

    let a = egraph.add_leaf(Op::A);
    let b = egraph.add_leaf(Op::B);
    egraph.merge(fx, a);
    egraph.merge(fy, b);
    assert!(!egraph.equiv(a, b));

    // merging the children must propagate upward
    egraph.merge(x, y);
    assert!(egraph.equiv(fx, fy));
    assert!(egraph.equiv(a, b));
}

#[test]
fn congruent_merge_after_two_levels() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let fx = egraph.add(Op::F, &[x]);
    let fy = egraph.add(Op::F, &[y]);
    let gfx = egraph.add(Op::G, &[fx]);
    let gfy = egraph.add(Op::G, &[fy]);
    assert!(!egraph.equiv(gfx, gfy));

    let a = egraph.add_leaf(Op::A);
    let b = egraph.add_leaf(Op::B);
    egraph.merge(gfx, a);
    egraph.merge(gfy, b);

    egraph.merge(x, y);
    assert!(egraph.equiv(fx, fy));
    assert!(egraph.equiv(gfx, gfy));
    assert!(egraph.equiv(a, b));
}

#[test]
fn merge_is_idempotent() {
    let mut egraph = EGraph::<Op>::default();
    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);

    assert!(egraph.merge(x, y));
    assert!(!egraph.merge(x, y));
    assert!(!egraph.merge(y, x));
    assert!(!egraph.merge(x, x));
}

#[test]
fn merge_batch_drains_to_fixpoint() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let fx = egraph.add(Op::F, &[x]);
    let fy = egraph.add(Op::F, &[y]);
    let a = egraph.add_leaf(Op::A);
    let b = egraph.add_leaf(Op::B);

    let mut queue = MergeQueue::from([(fx, a), (fy, b), (x, y)]);
    assert!(egraph.merge_batch(&mut queue));
    assert!(queue.is_empty());
    assert!(egraph.equiv(a, b));

    // resubmitting the same pairs is a no-op
    let mut queue = MergeQueue::from([(fx, a), (fy, b), (x, y)]);
    assert!(!egraph.merge_batch(&mut queue));
}

#[test]
fn class_iteration() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let a = egraph.add(Op::F, &[x]);
    let b = egraph.add(Op::F, &[y]);
    let c = egraph.add(Op::G, &[x]);
    egraph.merge(a, b);
    egraph.merge(a, c);

    // the same class is observable through any member
    for handle in [a, b, c] {
        let class = egraph.eclass(handle);
        assert_eq!(class.id(), egraph.find(a));
        assert_eq!(class.len(), 3);
        assert_eq!(class.matching_kind(Op::F).count(), 2);
        assert_eq!(class.matching_kind(Op::G).count(), 1);
        assert_eq!(class.matching_kind(Op::X).count(), 0);
    }

    // every member shows up exactly once
    let mut nodes: Vec<_> = egraph.eclass(a).iter().collect();
    nodes.sort();
    nodes.dedup();
    assert_eq!(nodes.len(), 3);
}

#[test]
fn class_iteration_skips_congruence_victims() {
    init_logger();
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let fx = egraph.add(Op::F, &[x]);
    let fy = egraph.add(Op::F, &[y]);

    // one of the two F nodes becomes a duplicate and drops out
    egraph.merge(x, y);
    assert!(egraph.equiv(fx, fy));
    assert_eq!(egraph.eclass(fx).len(), 1);
    assert_eq!(egraph.eclass(fx).matching_kind(Op::F).count(), 1);

    // the merged child class still shows both leaves
    assert_eq!(egraph.eclass(x).len(), 2);
}

#[test]
fn roots_track_classes() {
    let mut egraph = EGraph::<Op>::default();
    assert!(egraph.is_empty());

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let fx = egraph.add(Op::F, &[x]);
    assert_eq!(egraph.number_of_classes(), 3);

    egraph.merge(x, y);
    assert_eq!(egraph.number_of_classes(), 2);
    assert_eq!(egraph.roots().len(), 2);

    for handle in [x, y, fx] {
        assert!(egraph.roots().any(|root| root == egraph.find(handle)));
    }
}

#[test]
fn handles_stay_valid_across_merges() {
    let mut egraph = EGraph::<Op>::default();

    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let fx = egraph.add(Op::F, &[x]);
    let fy = egraph.add(Op::F, &[y]);
    egraph.merge(x, y);

    // fx may have been evicted, but the handle still dereferences
    assert_eq!(egraph.data(fx), &Op::F);
    assert_eq!(egraph.data(fy), &Op::F);
    assert_eq!(egraph.children(fx).len(), 1);
    assert_eq!(egraph[x], Op::X);
    assert!(egraph.equiv(egraph.children(fx)[0], x));
}

#[test]
fn child_access() {
    let mut egraph = EGraph::<Op>::default();
    let x = egraph.add_leaf(Op::X);
    let y = egraph.add_leaf(Op::Y);
    let h = egraph.add(Op::H, &[x, y]);

    assert_eq!(egraph.child(h, 0), Ok(x));
    assert_eq!(egraph.child(h, 1), Ok(y));

    let err = egraph.child(h, 2).unwrap_err();
    assert_eq!(err.index, 2);
    assert_eq!(err.len, 2);
    assert_eq!(
        err.to_string(),
        "child index 2 out of bounds for a node with 2 children"
    );

    let err = egraph.child(x, 0).unwrap_err();
    assert_eq!(err.len, 0);
}

#[test]
fn dot_output() {
    let mut egraph = EGraph::<Op>::default();
    let x = egraph.add_leaf(Op::X);
    let f = egraph.add(Op::F, &[x]);
    let g = egraph.add(Op::G, &[x]);
    egraph.merge(f, g);

    let rendered = egraph.dot().to_string();
    assert!(rendered.starts_with("digraph egraph {"));
    assert_eq!(
        rendered.matches("subgraph cluster_").count(),
        egraph.number_of_classes()
    );
    // one edge per child slot of each live node
    assert_eq!(rendered.matches(" -> ").count(), 2);
}
