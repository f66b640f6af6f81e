// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Mesh clash detection built from facet range trees

use crate::geometry::{FacetVisitor, IndexedMesh, IndexedMeshVisitor};
use crate::tree::{RangeTree, RangeTreePairSearcher, SimpleRangeClashTester};
use anyhow::Result;

/// Build a range tree with one leaf per face; payloads are face ordinals.
///
/// Fails when the mesh's index arrays are malformed.
pub fn build_facet_tree(mesh: &IndexedMesh) -> Result<RangeTree<usize>> {
    let mut visitor = IndexedMeshVisitor::new(mesh)?;
    let mut tree = RangeTree::new();
    let mut face = 0;
    while visitor.advance() {
        tree.add(face, visitor.face_range());
        face += 1;
    }
    Ok(tree)
}

/// Face-ordinal pairs `(face_a, face_b)` whose facet ranges come within
/// `envelope` of each other; `max_hits` caps the search.
pub fn mesh_clash(
    a: &IndexedMesh,
    b: &IndexedMesh,
    envelope: f64,
    max_hits: Option<usize>,
) -> Result<Vec<(usize, usize)>> {
    let tree_a = build_facet_tree(a)?;
    let tree_b = build_facet_tree(b)?;

    let mut searcher = RangeTreePairSearcher::new();
    let mut tester = SimpleRangeClashTester::new(envelope);
    tester.max_hits = max_hits;
    searcher.search(&tree_a, &tree_b, &mut tester);
    Ok(tester.into_hits())
}
