// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Dual-tree pairwise search between two range trees

use super::range_tree::{NodeRef, RangeTree};
use crate::geometry::Range3;

/// Pair tests for [`RangeTreePairSearcher`].
///
/// The mixed and interior tests return whether the pair's subtrees are worth
/// descending into; `leaf_leaf` is where hits get recorded.
pub trait ClashTester<T> {
    fn interior_interior(&mut self, a: &Range3, b: &Range3) -> bool;

    fn interior_leaf(&mut self, a: &Range3, b: &Range3, b_payload: &T) -> bool;

    fn leaf_interior(&mut self, a: &Range3, a_payload: &T, b: &Range3) -> bool;

    fn leaf_leaf(&mut self, a: &Range3, a_payload: &T, b: &Range3, b_payload: &T);

    /// Checked once per search step; false stops the search.
    fn still_searching(&self) -> bool {
        true
    }
}

/// One suspended pair of nodes: `next_a`/`next_b` cursor over the
/// cross-product of their child lists (a leaf side contributes itself as its
/// only item).
#[derive(Debug, Clone, Copy)]
struct PairFrame {
    a: NodeRef,
    b: NodeRef,
    next_a: usize,
    next_b: usize,
}

/// Depth-first driver pairing the nodes of two range trees.
///
/// Owns an explicit frame stack instead of recursing, cleared but not
/// deallocated between runs, so one searcher can serve many tree pairs
/// without reallocating.
#[derive(Debug, Default)]
pub struct RangeTreePairSearcher {
    stack: Vec<PairFrame>,
}

impl RangeTreePairSearcher {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Run `tester` over all node pairs it does not prune; false iff the
    /// tester stopped the search early.
    pub fn search<T, C: ClashTester<T>>(
        &mut self,
        tree_a: &RangeTree<T>,
        tree_b: &RangeTree<T>,
        tester: &mut C,
    ) -> bool {
        self.stack.clear();
        let (Some(root_a), Some(root_b)) = (tree_a.root_child(), tree_b.root_child()) else {
            return true;
        };
        self.stack.push(PairFrame {
            a: NodeRef::Interior(root_a),
            b: NodeRef::Interior(root_b),
            next_a: 0,
            next_b: 0,
        });

        while let Some(frame) = self.stack.last_mut() {
            if !tester.still_searching() {
                return false;
            }
            let count_a = item_count(tree_a, frame.a);
            let count_b = item_count(tree_b, frame.b);
            if frame.next_a >= count_a || count_b == 0 {
                self.stack.pop();
                continue;
            }
            let pair_a = item(tree_a, frame.a, frame.next_a);
            let pair_b = item(tree_b, frame.b, frame.next_b);
            frame.next_b += 1;
            if frame.next_b >= count_b {
                frame.next_b = 0;
                frame.next_a += 1;
            }

            let descend = match (pair_a, pair_b) {
                (NodeRef::Interior(a), NodeRef::Interior(b)) => {
                    tester.interior_interior(tree_a.interior_range(a), tree_b.interior_range(b))
                }
                (NodeRef::Interior(a), NodeRef::Leaf(b)) => tester.interior_leaf(
                    tree_a.interior_range(a),
                    tree_b.leaf_range(b),
                    tree_b.leaf_payload(b),
                ),
                (NodeRef::Leaf(a), NodeRef::Interior(b)) => tester.leaf_interior(
                    tree_a.leaf_range(a),
                    tree_a.leaf_payload(a),
                    tree_b.interior_range(b),
                ),
                (NodeRef::Leaf(a), NodeRef::Leaf(b)) => {
                    tester.leaf_leaf(
                        tree_a.leaf_range(a),
                        tree_a.leaf_payload(a),
                        tree_b.leaf_range(b),
                        tree_b.leaf_payload(b),
                    );
                    false
                }
            };
            if descend {
                self.stack.push(PairFrame {
                    a: pair_a,
                    b: pair_b,
                    next_a: 0,
                    next_b: 0,
                });
            }
        }
        true
    }
}

fn item_count<T>(tree: &RangeTree<T>, node: NodeRef) -> usize {
    match node {
        NodeRef::Interior(interior) => tree.children(interior).len(),
        NodeRef::Leaf(_) => 1,
    }
}

fn item<T>(tree: &RangeTree<T>, node: NodeRef, i: usize) -> NodeRef {
    match node {
        NodeRef::Interior(interior) => tree.children(interior)[i],
        NodeRef::Leaf(_) => node,
    }
}

/// Tester reporting leaf pairs whose ranges come within `envelope` of each
/// other on the first `axis_count` axes (2 = plan view, 3 = full).
///
/// An optional `max_hits` turns it into a "stop after N hits" search.
#[derive(Debug)]
pub struct SimpleRangeClashTester<T> {
    pub envelope: f64,
    pub axis_count: usize,
    pub max_hits: Option<usize>,
    hits: Vec<(T, T)>,
}

impl<T: Clone> SimpleRangeClashTester<T> {
    pub fn new(envelope: f64) -> Self {
        Self {
            envelope,
            axis_count: 3,
            max_hits: None,
            hits: Vec::new(),
        }
    }

    pub fn hits(&self) -> &[(T, T)] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<(T, T)> {
        self.hits
    }

    pub fn clear_hits(&mut self) {
        self.hits.clear();
    }
}

impl<T: Clone> ClashTester<T> for SimpleRangeClashTester<T> {
    fn interior_interior(&mut self, a: &Range3, b: &Range3) -> bool {
        a.intersects_within(b, self.envelope, self.axis_count)
    }

    fn interior_leaf(&mut self, a: &Range3, b: &Range3, _b_payload: &T) -> bool {
        a.intersects_within(b, self.envelope, self.axis_count)
    }

    fn leaf_interior(&mut self, a: &Range3, _a_payload: &T, b: &Range3) -> bool {
        a.intersects_within(b, self.envelope, self.axis_count)
    }

    fn leaf_leaf(&mut self, a: &Range3, a_payload: &T, b: &Range3, b_payload: &T) {
        if a.intersects_within(b, self.envelope, self.axis_count) {
            self.hits.push((a_payload.clone(), b_payload.clone()));
        }
    }

    fn still_searching(&self) -> bool {
        match self.max_hits {
            Some(cap) => self.hits.len() < cap,
            None => true,
        }
    }
}
