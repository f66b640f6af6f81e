// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Ready-made traversal handlers: shape statistics and closest-range search

use super::range_tree::{RangeTree, TreeHandler};
use crate::geometry::Range3;
use nalgebra::{Point3, Vector3};
use serde::Serialize;

/// Collects node counts, depth, and fringe shape numbers in one traversal.
///
/// Extents are squared diagonals, matching the tree's cached node extents.
/// The squared per-fringe leaf counts expose imbalance: for a fixed leaf
/// count the sum is smallest when fringes are evenly filled.
#[derive(Debug, Clone, Serialize)]
pub struct TreeStatisticsCollector {
    pub leaf_count: usize,
    pub interior_count: usize,
    pub fringe_count: usize,
    /// Interior levels below the root on the current path.
    #[serde(skip)]
    pub depth: usize,
    pub max_depth: usize,
    pub fringe_extent_squared_min: f64,
    pub fringe_extent_squared_max: f64,
    pub fringe_extent_squared_sum: f64,
    pub fringe_leaf_count_squared_sum: usize,
}

impl TreeStatisticsCollector {
    pub fn new() -> Self {
        Self {
            leaf_count: 0,
            interior_count: 0,
            fringe_count: 0,
            depth: 0,
            max_depth: 0,
            fringe_extent_squared_min: f64::INFINITY,
            fringe_extent_squared_max: f64::NEG_INFINITY,
            fringe_extent_squared_sum: 0.0,
            fringe_leaf_count_squared_sum: 0,
        }
    }

    pub fn mean_fringe_extent_squared(&self) -> f64 {
        if self.fringe_count == 0 {
            return 0.0;
        }
        self.fringe_extent_squared_sum / self.fringe_count as f64
    }
}

impl Default for TreeStatisticsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeHandler<T> for TreeStatisticsCollector {
    fn should_recurse_into_subtree(&mut self, tree: &RangeTree<T>, interior: usize) -> bool {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.interior_count += 1;
        if tree.is_fringe(interior) {
            self.fringe_count += 1;
            let extent = tree.interior_extent_squared(interior);
            self.fringe_extent_squared_min = self.fringe_extent_squared_min.min(extent);
            self.fringe_extent_squared_max = self.fringe_extent_squared_max.max(extent);
            self.fringe_extent_squared_sum += extent;
            let leaves = tree.children(interior).len();
            self.fringe_leaf_count_squared_sum += leaves * leaves;
        }
        true
    }

    fn should_continue_after_subtree(&mut self, _tree: &RangeTree<T>, _interior: usize) -> bool {
        self.depth -= 1;
        true
    }

    fn should_continue_after_leaf(
        &mut self,
        _tree: &RangeTree<T>,
        _interior: usize,
        _leaf: usize,
    ) -> bool {
        self.leaf_count += 1;
        true
    }
}

/// Finds the leaf range closest to a target point, within a starting search
/// distance.
///
/// The hit envelope (`target ± distance`) shrinks each time a closer leaf is
/// found, so later subtrees outside it are pruned without distance math.
#[derive(Debug, Clone)]
pub struct ClosestRangeSearcher<T> {
    target: Point3<f64>,
    hit_range: Range3,
    closest_distance_squared: f64,
    closest_point: Option<Point3<f64>>,
    closest_payload: Option<T>,
}

fn envelope_around(target: Point3<f64>, distance: f64) -> Range3 {
    let radius = Vector3::new(distance, distance, distance);
    Range3::new(target - radius, target + radius)
}

impl<T: Clone> ClosestRangeSearcher<T> {
    pub fn new(target: Point3<f64>, max_distance: f64) -> Self {
        Self {
            target,
            hit_range: envelope_around(target, max_distance),
            closest_distance_squared: max_distance * max_distance,
            closest_point: None,
            closest_payload: None,
        }
    }

    pub fn target(&self) -> Point3<f64> {
        self.target
    }

    pub fn found(&self) -> bool {
        self.closest_payload.is_some()
    }

    /// Squared distance to the best leaf so far; the squared starting
    /// distance while nothing was found.
    pub fn closest_distance_squared(&self) -> f64 {
        self.closest_distance_squared
    }

    /// Point of the winning leaf's range closest to the target.
    pub fn closest_point(&self) -> Option<Point3<f64>> {
        self.closest_point
    }

    pub fn closest_payload(&self) -> Option<&T> {
        self.closest_payload.as_ref()
    }
}

impl<T: Clone> TreeHandler<T> for ClosestRangeSearcher<T> {
    fn should_recurse_into_subtree(&mut self, tree: &RangeTree<T>, interior: usize) -> bool {
        tree.interior_range(interior).intersects(&self.hit_range)
    }

    fn should_continue_after_leaf(
        &mut self,
        tree: &RangeTree<T>,
        _interior: usize,
        leaf: usize,
    ) -> bool {
        let range = tree.leaf_range(leaf);
        if !range.intersects(&self.hit_range) {
            return true;
        }
        let distance_squared = range.distance_squared_to_point(&self.target);
        if distance_squared < self.closest_distance_squared {
            self.closest_distance_squared = distance_squared;
            self.closest_point = Some(range.closest_point_to(&self.target));
            self.closest_payload = Some(tree.leaf_payload(leaf).clone());
            self.hit_range = envelope_around(self.target, distance_squared.sqrt());
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box_at(x: f64, y: f64, z: f64) -> Range3 {
        Range3::new(Point3::new(x, y, z), Point3::new(x + 1.0, y + 1.0, z + 1.0))
    }

    #[test]
    fn test_statistics_on_flat_tree() {
        let mut tree = RangeTree::new();
        for i in 0..10 {
            tree.add(i, unit_box_at(i as f64 * 2.0, 0.0, 0.0));
        }

        let mut stats = TreeStatisticsCollector::new();
        assert!(tree.traverse(&mut stats));

        assert_eq!(stats.leaf_count, 10);
        assert_eq!(stats.interior_count, 1);
        assert_eq!(stats.fringe_count, 1);
        assert_eq!(stats.max_depth, 1);
        assert_eq!(stats.depth, 0);
        assert_eq!(stats.fringe_leaf_count_squared_sum, 100);
        // The single fringe covers [0, 19] x [0, 1] x [0, 1].
        assert_relative_eq!(stats.fringe_extent_squared_min, 19.0 * 19.0 + 2.0);
        assert_relative_eq!(stats.mean_fringe_extent_squared(), 19.0 * 19.0 + 2.0);
    }

    #[test]
    fn test_statistics_after_splits() {
        let mut tree = RangeTree::new();
        for i in 0..500 {
            tree.add(i, unit_box_at(i as f64, 0.0, 0.0));
        }

        let mut stats = TreeStatisticsCollector::new();
        tree.traverse(&mut stats);

        assert_eq!(stats.leaf_count, 500);
        assert_eq!(stats.interior_count, tree.interior_count());
        assert!(stats.fringe_count > 1);
        assert!(stats.max_depth >= 2);
        assert_eq!(stats.depth, 0);
        assert!(stats.fringe_extent_squared_min <= stats.fringe_extent_squared_max);
        assert!(stats.mean_fringe_extent_squared() <= stats.fringe_extent_squared_max);
    }

    #[test]
    fn test_closest_range_basic() {
        let mut tree = RangeTree::new();
        tree.add(10u32, Range3::from_point(Point3::new(0.0, 0.0, 0.0)));
        tree.add(20u32, Range3::from_point(Point3::new(3.0, 0.0, 0.0)));
        tree.add(30u32, Range3::from_point(Point3::new(0.0, 4.0, 0.0)));

        let mut searcher = ClosestRangeSearcher::new(Point3::new(1.0, 0.0, 0.0), 10.0);
        assert!(tree.traverse(&mut searcher));

        assert!(searcher.found());
        assert_eq!(searcher.closest_payload(), Some(&10));
        assert_relative_eq!(searcher.closest_distance_squared(), 1.0);
        assert_eq!(searcher.closest_point(), Some(Point3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_closest_range_inside_box_is_zero() {
        let mut tree = RangeTree::new();
        tree.add(1u32, unit_box_at(0.0, 0.0, 0.0));

        let target = Point3::new(0.5, 0.5, 0.5);
        let mut searcher = ClosestRangeSearcher::new(target, 100.0);
        tree.traverse(&mut searcher);

        assert_relative_eq!(searcher.closest_distance_squared(), 0.0);
        assert_eq!(searcher.closest_point(), Some(target));
    }

    #[test]
    fn test_closest_range_out_of_reach() {
        let mut tree = RangeTree::new();
        tree.add(1u32, unit_box_at(100.0, 0.0, 0.0));

        let mut searcher = ClosestRangeSearcher::new(Point3::new(0.0, 0.0, 0.0), 5.0);
        tree.traverse(&mut searcher);

        assert!(!searcher.found());
        assert_eq!(searcher.closest_payload(), None);
        assert_relative_eq!(searcher.closest_distance_squared(), 25.0);
    }

    #[test]
    fn test_closest_range_shrinks_envelope() {
        let mut tree = RangeTree::new();
        for i in 0..300 {
            tree.add(i, unit_box_at(i as f64 * 10.0, 50.0, 0.0));
        }

        let mut searcher = ClosestRangeSearcher::new(Point3::new(1502.0, 0.0, 0.0), 1.0e4);
        tree.traverse(&mut searcher);

        // Box 150 spans [1500, 1501] in x and sits 50 above the target in y.
        assert_eq!(searcher.closest_payload(), Some(&150));
        assert_relative_eq!(searcher.closest_distance_squared(), 1.0 + 50.0 * 50.0);
    }
}
