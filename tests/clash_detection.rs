// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Dual-tree clash search against known cases and a brute-force reference

use anyhow::Result;
use nalgebra::Point3;
use polyrange::{
    mesh_clash, CoordinateMap, IndexedMesh, Range3, RangeTree, RangeTreePairSearcher,
    SimpleRangeClashTester,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn boxed(low: (f64, f64, f64), high: (f64, f64, f64)) -> Range3 {
    Range3::new(
        Point3::new(low.0, low.1, low.2),
        Point3::new(high.0, high.1, high.2),
    )
}

#[test]
fn test_single_leaf_known_cases() {
    let mut searcher = RangeTreePairSearcher::new();

    // Identical single boxes: exactly one hit at zero envelope.
    let mut a = RangeTree::new();
    a.add(1u32, boxed((0.0, 0.0, 0.0), (1.0, 1.0, 1.0)));
    let mut b = RangeTree::new();
    b.add(2u32, boxed((0.0, 0.0, 0.0), (1.0, 1.0, 1.0)));

    let mut tester = SimpleRangeClashTester::new(0.0);
    assert!(searcher.search(&a, &b, &mut tester));
    assert_eq!(tester.hits(), &[(1, 2)]);

    // Well-separated boxes: nothing.
    let mut far = RangeTree::new();
    far.add(3u32, boxed((100.0, 100.0, 100.0), (101.0, 101.0, 101.0)));

    let mut tester = SimpleRangeClashTester::new(0.0);
    assert!(searcher.search(&a, &far, &mut tester));
    assert!(tester.hits().is_empty());
}

#[test]
fn test_end_to_end_scenario() {
    let mut tree_a = RangeTree::new();
    tree_a.add(10u32, boxed((0.0, 0.0, 0.0), (1.0, 1.0, 1.0)));
    tree_a.add(20u32, boxed((5.0, 5.0, 5.0), (6.0, 6.0, 6.0)));

    let mut tree_b = RangeTree::new();
    tree_b.add(99u32, boxed((0.5, 0.5, 0.5), (0.5, 0.5, 0.5)));

    let mut searcher = RangeTreePairSearcher::new();
    let mut tester = SimpleRangeClashTester::new(0.1);
    assert!(searcher.search(&tree_a, &tree_b, &mut tester));

    assert_eq!(tester.hits(), &[(10, 99)]);
}

#[test]
fn test_dual_search_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(31);
    let mut make_boxes = |count: usize| -> Vec<Range3> {
        (0..count)
            .map(|_| {
                let x = rng.gen_range(-50.0..50.0);
                let y = rng.gen_range(-50.0..50.0);
                let z = rng.gen_range(-5.0..5.0);
                let size = rng.gen_range(0.5..3.0);
                boxed((x, y, z), (x + size, y + size, z + size))
            })
            .collect()
    };
    let boxes_a = make_boxes(400);
    let boxes_b = make_boxes(400);

    let mut tree_a = RangeTree::new();
    for (i, &b) in boxes_a.iter().enumerate() {
        tree_a.add(i, b);
    }
    let mut tree_b = RangeTree::new();
    for (i, &b) in boxes_b.iter().enumerate() {
        tree_b.add(i, b);
    }

    let envelope = 0.25;
    let mut searcher = RangeTreePairSearcher::new();
    let mut tester = SimpleRangeClashTester::new(envelope);
    assert!(searcher.search(&tree_a, &tree_b, &mut tester));

    let mut expected = Vec::new();
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            if a.intersects_within(b, envelope, 3) {
                expected.push((i, j));
            }
        }
    }

    let mut hits = tester.into_hits();
    hits.sort_unstable();
    expected.sort_unstable();
    assert!(!expected.is_empty(), "test input produced no overlaps");
    assert_eq!(hits, expected);
}

#[test]
fn test_plan_view_search_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut boxes_a = Vec::new();
    let mut boxes_b = Vec::new();
    for _ in 0..200 {
        let x = rng.gen_range(-30.0..30.0);
        let y = rng.gen_range(-30.0..30.0);
        boxes_a.push(boxed((x, y, 0.0), (x + 2.0, y + 2.0, 1.0)));
        let x = rng.gen_range(-30.0..30.0);
        let y = rng.gen_range(-30.0..30.0);
        // Same plan footprint band, far away vertically.
        boxes_b.push(boxed((x, y, 500.0), (x + 2.0, y + 2.0, 501.0)));
    }

    let mut tree_a = RangeTree::new();
    for (i, &b) in boxes_a.iter().enumerate() {
        tree_a.add(i, b);
    }
    let mut tree_b = RangeTree::new();
    for (i, &b) in boxes_b.iter().enumerate() {
        tree_b.add(i, b);
    }

    let mut searcher = RangeTreePairSearcher::new();

    let mut full = SimpleRangeClashTester::new(0.0);
    searcher.search(&tree_a, &tree_b, &mut full);
    assert!(full.hits().is_empty(), "z gap must block full 3-axis hits");

    let mut plan = SimpleRangeClashTester::new(0.0);
    plan.axis_count = 2;
    searcher.search(&tree_a, &tree_b, &mut plan);

    let mut expected = Vec::new();
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            if a.intersects_within(b, 0.0, 2) {
                expected.push((i, j));
            }
        }
    }
    let mut hits = plan.into_hits();
    hits.sort_unstable();
    expected.sort_unstable();
    assert_eq!(hits, expected);
}

#[test]
fn test_max_hits_stops_the_search() {
    let mut tree_a = RangeTree::new();
    let mut tree_b = RangeTree::new();
    for i in 0..100 {
        let x = i as f64 * 4.0;
        tree_a.add(i, boxed((x, 0.0, 0.0), (x + 1.0, 1.0, 1.0)));
        tree_b.add(i, boxed((x, 0.0, 0.0), (x + 1.0, 1.0, 1.0)));
    }

    let mut searcher = RangeTreePairSearcher::new();
    let mut tester = SimpleRangeClashTester::new(0.0);
    tester.max_hits = Some(7);

    assert!(!searcher.search(&tree_a, &tree_b, &mut tester));
    assert_eq!(tester.hits().len(), 7);
}

fn grid_mesh(offset_x: f64, cells: usize) -> IndexedMesh {
    let mut mesh = IndexedMesh::new();
    let mut map = CoordinateMap::new(&mut mesh);
    for i in 0..cells {
        for j in 0..cells {
            let x = offset_x + i as f64 * 2.0;
            let y = j as f64 * 2.0;
            map.add_polygon(
                &[
                    Point3::new(x, y, 0.0),
                    Point3::new(x + 1.0, y, 0.0),
                    Point3::new(x + 1.0, y + 1.0, 0.0),
                    Point3::new(x, y + 1.0, 0.0),
                ],
                None,
                None,
                None,
            );
        }
    }
    mesh
}

#[test]
fn test_mesh_clash_end_to_end() -> Result<()> {
    // 5x5 grids of unit squares, the second shifted so each face overlaps
    // exactly its counterpart.
    let a = grid_mesh(0.0, 5);
    let b = grid_mesh(0.5, 5);

    let hits = mesh_clash(&a, &b, 0.0, None)?;
    assert_eq!(hits.len(), 25);
    for &(face_a, face_b) in &hits {
        assert_eq!(face_a, face_b);
    }

    // A tight cap is honored.
    let capped = mesh_clash(&a, &b, 0.0, Some(3))?;
    assert_eq!(capped.len(), 3);
    Ok(())
}

#[test]
fn test_mesh_clash_rejects_malformed_input() {
    let a = grid_mesh(0.0, 2);
    let mut bad = grid_mesh(0.0, 2);
    bad.point_index.push(1);

    assert!(mesh_clash(&a, &bad, 0.0, None).is_err());
}
