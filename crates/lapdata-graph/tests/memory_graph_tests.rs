//! MemoryGraph E2E Tests

use lapdata_graph::*;
use std::collections::{BTreeMap, BTreeSet};
use tempfile::tempdir;

fn row(entries: &[(&str, &str, Value)]) -> DataRow {
    entries
        .iter()
        .map(|(c, d, v)| ((c.to_string(), d.to_string()), v.clone()))
        .collect()
}

fn edges(list: &[(&str, &str, &str)]) -> BTreeSet<ClassEdge> {
    list.iter().map(|(a, l, b)| ClassEdge::new(*a, *l, *b)).collect()
}

// ============================================================================
// Row Insertion Tests
// ============================================================================

#[test]
fn test_data_row_links_every_bound_class_pair() {
    let mut g = MemoryGraph::new();
    let data = row(&[
        ("Sample", "Id", Value::text("S-1")),
        ("Site", "Name", Value::text("Tell A")),
    ]);
    let rels = edges(&[("Sample", "Found_In", "Site")]);

    let binding = g
        .add_data_row(&data, &rels, &BTreeSet::new(), &BTreeMap::new())
        .unwrap();

    assert_eq!(binding.objects.len(), 2);
    assert_eq!(binding.created.len(), 2);
    let sample = binding.objects["Sample"];
    let site = binding.objects["Site"];
    assert_eq!(g.get_descriptor(sample, "Id"), Some(Value::text("S-1")));
    assert_eq!(g.object_relations(sample), vec![(site, "Found_In".to_string())]);
}

#[test]
fn test_data_row_reuses_identical_members_unless_unique() {
    let mut g = MemoryGraph::new();
    let data = row(&[("Site", "Name", Value::text("Tell A"))]);
    let no_edges = BTreeSet::new();
    let none = BTreeSet::new();

    let first = g.add_data_row(&data, &no_edges, &none, &BTreeMap::new()).unwrap();
    let second = g.add_data_row(&data, &no_edges, &none, &BTreeMap::new()).unwrap();
    assert_eq!(first.objects["Site"], second.objects["Site"]);
    assert!(second.created.is_empty());

    let unique: BTreeSet<String> = ["Site".to_string()].into_iter().collect();
    let third = g.add_data_row(&data, &no_edges, &unique, &BTreeMap::new()).unwrap();
    assert_ne!(first.objects["Site"], third.objects["Site"]);
    assert_eq!(g.class_members("Site", true).len(), 2);
}

#[test]
fn test_data_row_uses_existing_objects() {
    let mut g = MemoryGraph::new();
    g.add_class("Sample");
    let root = g.add_member("Sample").unwrap();
    let data = row(&[
        ("Sample", "Id", Value::text("S-9")),
        ("Site", "Name", Value::text("Tell B")),
    ]);
    let existing: BTreeMap<String, ObjectId> = [("Sample".to_string(), root)].into_iter().collect();

    let binding = g
        .add_data_row(
            &data,
            &edges(&[("Sample", "Found_In", "Site")]),
            &BTreeSet::new(),
            &existing,
        )
        .unwrap();

    assert_eq!(binding.objects["Sample"], root);
    assert!(!binding.created.contains(&root));
    assert_eq!(g.get_descriptor(root, "Id"), Some(Value::text("S-9")));
    assert_eq!(g.object_relations(root).len(), 1);
}

#[test]
fn test_data_row_does_not_reuse_member_linked_elsewhere() {
    let mut g = MemoryGraph::new();
    g.add_class("Sample");
    let rels = edges(&[
        ("Sample", "Found_In", "Site"),
        ("Site", "Located_In", "Region"),
    ]);
    let sample_row = |id: &str, region: &str| {
        row(&[
            ("Sample", "Id", Value::text(id)),
            ("Site", "Name", Value::text("Tell A")),
            ("Region", "Name", Value::text(region)),
        ])
    };
    let store_row = |g: &mut MemoryGraph, data: &DataRow| {
        let root = g.add_member("Sample").unwrap();
        let existing = BTreeMap::from([("Sample".to_string(), root)]);
        let unique = BTreeSet::from(["Sample".to_string()]);
        g.add_data_row(data, &rels, &unique, &existing).unwrap()
    };

    let upper = store_row(&mut g, &sample_row("S-1", "Upper Nile"));
    let lower = store_row(&mut g, &sample_row("S-2", "Lower Nile"));
    let upper_again = store_row(&mut g, &sample_row("S-3", "Upper Nile"));

    // same site name, different region: a separate site
    assert_ne!(upper.objects["Site"], lower.objects["Site"]);
    assert_eq!(
        g.object_relations(upper.objects["Site"])
            .iter()
            .filter(|(_, label)| label == "Located_In")
            .count(),
        1
    );
    // same site and region: both shared
    assert_eq!(upper_again.objects["Site"], upper.objects["Site"]);
    assert_eq!(upper_again.objects["Region"], upper.objects["Region"]);
    assert_eq!(g.class_members("Site", true).len(), 2);
    assert_eq!(g.class_members("Region", true).len(), 2);
}

#[test]
fn test_empty_row_binds_nothing() {
    let mut g = MemoryGraph::new();
    let binding = g
        .add_data_row(&DataRow::new(), &BTreeSet::new(), &BTreeSet::new(), &BTreeMap::new())
        .unwrap();
    assert_eq!(binding, RowBinding::default());
    assert_eq!(g.object_count(), 0);
}

// ============================================================================
// Signal Guard Tests
// ============================================================================

#[test]
fn test_signal_guard_restores_previous_state() {
    let mut g = MemoryGraph::new();
    {
        let mut outer = SignalGuard::new(&mut g);
        {
            let inner = SignalGuard::new(&mut *outer);
            assert!(inner.signals_blocked());
        }
        assert!(outer.signals_blocked());
        outer.add_class("Sample");
    }
    assert!(!g.signals_blocked());
    assert!(g.drain_events().is_empty());
}

// ============================================================================
// Snapshot Tests
// ============================================================================

#[test]
fn test_snapshot_roundtrip() {
    let mut g = MemoryGraph::new();
    g.add_class("Sample");
    g.add_class("Detail");
    g.set_class_descriptor("Detail", "Geometry").unwrap();
    g.add_class_relation("Sample", "Detail", "Drawn").unwrap();
    let s = g.add_member("Sample").unwrap();
    let d = g.add_member("Detail").unwrap();
    g.set_descriptor(s, "Id", Value::text("S-1")).unwrap();
    g.set_descriptor(d, "Filled", Value::Int(1)).unwrap();
    g.set_descriptor(d, "Image", Value::resource("file:///p.png")).unwrap();
    g.add_relation(s, d, "Drawn").unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("graph.lapg");
    g.save(&path).unwrap();
    let restored = MemoryGraph::open(&path).unwrap();

    assert_eq!(restored.class_names(), vec!["Detail", "Sample"]);
    assert_eq!(restored.class_descriptors("Detail"), vec!["Geometry"]);
    assert_eq!(restored.object_descriptors(d), g.object_descriptors(d));
    assert_eq!(restored.object_relations(s), vec![(d, "Drawn".to_string())]);
    assert_eq!(restored.class_relations("Detail"), g.class_relations("Detail"));

    // ids keep counting from where the snapshot left off
    let mut restored = restored;
    let next = restored.add_member("Sample").unwrap();
    assert!(next > d);
}

#[test]
fn test_snapshot_rejects_bad_header() {
    assert!(MemoryGraph::from_bytes(b"NOPE").is_err());

    let mut bytes = MemoryGraph::new().to_bytes().unwrap();
    bytes[4] = 9;
    assert!(MemoryGraph::from_bytes(&bytes).is_err());

    let bytes = MemoryGraph::new().to_bytes().unwrap();
    assert!(MemoryGraph::from_bytes(&bytes[..bytes.len() - 1]).is_err());
}
