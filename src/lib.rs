// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Polyrange spatial indexing core
//!
//! A bounded-fanout range tree over axis-aligned boxes with visitor traversal
//! and dual-tree clash search, plus a tolerant coordinate deduplication map
//! for building indexed polyface meshes.

pub mod clash;
pub mod dedup;
pub mod geometry;
pub mod tree;

pub use clash::{build_facet_tree, mesh_clash};
pub use dedup::{CoordinateMap, ToleranceOrdering};
pub use geometry::{FacetVisitor, IndexedMesh, IndexedMeshVisitor, MeshIndexError, Range3};
pub use tree::{
    ClashTester, ClosestRangeSearcher, NodeRef, RangeTree, RangeTreePairSearcher,
    SimpleRangeClashTester, TreeHandler, TreeStatisticsCollector, MAX_FANOUT,
};

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_basic_clash_pipeline() {
        let mut a = IndexedMesh::new();
        let mut map = CoordinateMap::new(&mut a);
        map.add_polygon(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            None,
            None,
            None,
        );

        let hits = mesh_clash(&a, &a, 0.0, None).unwrap();
        assert_eq!(hits, vec![(0, 0)]);
    }
}
