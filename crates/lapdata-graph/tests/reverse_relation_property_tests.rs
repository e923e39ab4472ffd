use lapdata_graph::{reverse_label, GraphStore, MemoryGraph};
use proptest::prelude::*;

fn label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_]{0,12}",
        "~{0,4}[A-Za-z_]{0,8}",
        any::<String>(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn reverse_is_an_involution(label in label_strategy()) {
        let once = reverse_label(&label);
        prop_assert_ne!(&once, &label);
        prop_assert_eq!(reverse_label(&once), label);
    }

    #[test]
    fn object_edges_read_back_with_reversed_label(label in label_strategy()) {
        let mut g = MemoryGraph::new();
        g.add_class("A");
        let a = g.add_member("A").unwrap();
        let b = g.add_member("A").unwrap();
        g.add_relation(a, b, &label).unwrap();

        let seen_from_b = g.object_relations(b);
        prop_assert_eq!(seen_from_b.len(), 1);
        prop_assert_eq!(&seen_from_b[0].1, &g.reverse_relation(&label));
        prop_assert!(g.del_relation(b, a, &seen_from_b[0].1));
        prop_assert!(g.object_relations(a).is_empty());
    }
}
