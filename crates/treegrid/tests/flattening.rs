//! Tests for the flattening data source.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::team;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use treegrid::model::{GenericNode, RowId, RowSeed, TreeListDataSource, Value, parse_object};

/// A synthetic node: `(id, depth)`.
type Node = (u32, u32);

/// Deterministic children: up to three per node, four levels deep.
fn synthetic_children(&(id, depth): &Node) -> Option<Vec<Node>> {
    if depth >= 4 {
        return None;
    }
    let count = (id.wrapping_mul(2_654_435_761) >> 7) % 4;
    Some((0..count).map(|i| (id * 4 + i + 1, depth + 1)).collect())
}

fn expected_preorder<M>(source: &TreeListDataSource<M>) -> Vec<RowId> {
    fn visit<M>(source: &TreeListDataSource<M>, id: RowId, out: &mut Vec<RowId>) {
        out.push(id);
        let row = source.row(id).unwrap();
        if row.is_expanded() {
            for &child in row.children() {
                visit(source, child, out);
            }
        }
    }
    let mut out = Vec::new();
    for &root in source.roots() {
        visit(source, root, &mut out);
    }
    out
}

fn assert_preorder<M>(source: &TreeListDataSource<M>) {
    assert_eq!(source.flat_list(), expected_preorder(source).as_slice());
    for (_, row) in source.iter_visible() {
        if let Some(parent) = row.parent() {
            let parent = source.row(parent).unwrap();
            assert!(parent.is_expanded());
            assert_eq!(row.depth(), parent.depth() + 1);
        }
    }
}

#[test]
fn test_random_expand_collapse_keeps_preorder() {
    let queried = Arc::new(Mutex::new(HashSet::new()));
    let repeats = Arc::new(AtomicUsize::new(0));
    let (queried_clone, repeats_clone) = (queried.clone(), repeats.clone());

    let mut source = TreeListDataSource::builder(move |node: &Node| {
        if !queried_clone.lock().insert(node.0) {
            repeats_clone.fetch_add(1, Ordering::SeqCst);
        }
        synthetic_children(node)
    })
    .roots([(1, 0), (2, 0), (3, 0)])
    .build();

    // Mirror the flat list length from the notifications alone.
    let mirror = Arc::new(AtomicUsize::new(source.len()));
    let (inserted_mirror, removed_mirror) = (mirror.clone(), mirror.clone());
    source.signals().rows_inserted.connect(move |&(first, last)| {
        assert!(first <= last);
        inserted_mirror.fetch_add(last - first + 1, Ordering::SeqCst);
    });
    source.signals().rows_removed.connect(move |&(first, last)| {
        assert!(first <= last);
        removed_mirror.fetch_sub(last - first + 1, Ordering::SeqCst);
    });

    let mut rng = StdRng::seed_from_u64(0x7ee9_41d);
    let mut seen: Vec<RowId> = source.flat_list().to_vec();

    for _ in 0..500 {
        match rng.gen_range(0..10) {
            0..=5 => {
                let id = source.row_at(rng.gen_range(0..source.len())).unwrap();
                source.toggle(id);
            }
            6 | 7 => {
                let id = seen[rng.gen_range(0..seen.len())];
                if rng.gen_bool(0.5) {
                    source.expand(id);
                } else {
                    source.collapse(id);
                }
            }
            8 => {
                let id = seen[rng.gen_range(0..seen.len())];
                let position = source.expand_to(id);
                assert_eq!(position, source.position_of(id));
                assert!(position.is_some());
            }
            _ => {
                if rng.gen_bool(0.2) {
                    source.collapse_all();
                    assert_eq!(source.len(), source.roots().len());
                }
            }
        }

        assert_preorder(&source);
        assert_eq!(mirror.load(Ordering::SeqCst), source.len());
        for &id in source.flat_list() {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
    }

    assert_eq!(repeats.load(Ordering::SeqCst), 0);
    assert!(seen.len() > 3);
}

#[test]
fn test_collapsed_subtree_comes_back_identical() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let mut source = TreeListDataSource::builder(move |node: &Node| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        synthetic_children(node)
    })
    .roots([(5, 0)])
    .build();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let root = source.roots()[0];
    source.expand(root);
    let calls_after_first = calls.load(Ordering::SeqCst);
    let block: Vec<RowId> = source.flat_list().to_vec();

    source.collapse(root);
    assert_eq!(source.len(), 1);
    source.expand(root);

    assert_eq!(source.flat_list(), block.as_slice());
    assert_eq!(calls.load(Ordering::SeqCst), calls_after_first);
}

#[test]
fn test_walked_graph_as_data_source() {
    let boss = team();
    let mut source = parse_object(&Value::from(boss.clone())).into_data_source();
    let label = |node: &Arc<GenericNode>| node.name().to_string();

    let root = source.roots()[0];
    assert!(source.expand(root));
    assert_eq!(source.len(), 11);

    let name = source.row_at(1).unwrap();
    assert_eq!(source.model(name).map(label), Some("Name".to_string()));
    assert!(source.expand(name));
    let row = source.row(name).unwrap();
    assert!(!row.has_expand_affordance());
    assert_eq!(source.len(), 11);

    let reports = source
        .iter_visible()
        .find(|(_, row)| row.model().name() == "Reports")
        .map(|(id, _)| id)
        .unwrap();
    source.expand(reports);
    let visible: Vec<String> = source
        .iter_visible()
        .skip_while(|(_, row)| row.model().name() != "Reports")
        .take(3)
        .map(|(_, row)| label(row.model()))
        .collect();
    assert_eq!(visible, ["Reports", "[0]", "[1]"]);
    assert_preorder(&source);

    let bob_reports = {
        let bob = source.row_at(source.position_of(reports).unwrap() + 2).unwrap();
        source.expand(bob);
        source
            .iter_visible()
            .find(|(_, row)| row.model().name() == "Reports" && row.depth() == 3)
            .map(|(id, _)| id)
            .unwrap()
    };
    source.collapse_all();
    assert_eq!(source.len(), 1);
    assert!(source.expand_to(bob_reports).is_some());
    assert_preorder(&source);
}

#[test]
fn test_seeded_forest() {
    let mut source = TreeListDataSource::builder(|name: &String| match name.as_str() {
        "lazy" => Some(vec!["l1".to_string(), "l2".to_string()]),
        _ => None,
    })
    .seeds([
        RowSeed::new("known".to_string())
            .expanded()
            .with_children([
                RowSeed::new("k1".to_string()),
                RowSeed::new("k2".to_string()).expanded().with_children(Vec::new()),
            ]),
        RowSeed::new("lazy".to_string()),
    ])
    .build();

    let names = |source: &TreeListDataSource<String>| -> Vec<String> {
        source.iter_visible().map(|(_, row)| row.model().clone()).collect()
    };
    assert_eq!(names(&source), ["known", "k1", "k2", "lazy"]);

    let k2 = source.row_at(2).unwrap();
    assert!(!source.row(k2).unwrap().has_expand_affordance());

    let lazy = source.row_at(3).unwrap();
    source.expand(lazy);
    assert_eq!(names(&source), ["known", "k1", "k2", "lazy", "l1", "l2"]);

    let known = source.roots()[0];
    source.collapse(known);
    assert_eq!(names(&source), ["known", "lazy", "l1", "l2"]);
    assert!(!source.row(k2).unwrap().is_expanded());
    assert_preorder(&source);
}
