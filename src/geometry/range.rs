// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Axis-aligned 3D range (bounding box) utilities

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned 3D range, possibly null (empty).
///
/// A null range carries the inverted infinite sentinel (`low = +INF`,
/// `high = -INF`) so that extending it by any point yields that point's
/// degenerate box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Range3 {
    pub low: Point3<f64>,
    pub high: Point3<f64>,
}

impl Range3 {
    pub fn new(low: Point3<f64>, high: Point3<f64>) -> Self {
        Self { low, high }
    }

    /// The explicit empty sentinel.
    pub fn null() -> Self {
        Self {
            low: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            high: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Degenerate range containing a single point.
    pub fn from_point(p: Point3<f64>) -> Self {
        Self { low: p, high: p }
    }

    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let mut range = Self::null();
        for p in points {
            range.extend_point(p);
        }
        range
    }

    /// True when low exceeds high on any axis (the null sentinel qualifies).
    pub fn is_null(&self) -> bool {
        self.low.x > self.high.x || self.low.y > self.high.y || self.low.z > self.high.z
    }

    pub fn extend_point(&mut self, p: &Point3<f64>) {
        self.low.x = self.low.x.min(p.x);
        self.low.y = self.low.y.min(p.y);
        self.low.z = self.low.z.min(p.z);

        self.high.x = self.high.x.max(p.x);
        self.high.y = self.high.y.max(p.y);
        self.high.z = self.high.z.max(p.z);
    }

    pub fn extend_range(&mut self, other: &Range3) {
        if other.is_null() {
            return;
        }
        self.extend_point(&other.low);
        self.extend_point(&other.high);
    }

    pub fn union(&self, other: &Range3) -> Range3 {
        let mut range = *self;
        range.extend_range(other);
        range
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.low.x + self.high.x) / 2.0,
            (self.low.y + self.high.y) / 2.0,
            (self.low.z + self.high.z) / 2.0,
        )
    }

    pub fn diagonal(&self) -> Vector3<f64> {
        self.high - self.low
    }

    /// Squared length of the box diagonal; zero for a degenerate point range,
    /// zero for null.
    pub fn extent_squared(&self) -> f64 {
        if self.is_null() {
            return 0.0;
        }
        self.diagonal().norm_squared()
    }

    /// Point containment, expanded outward by `tolerance` on every face.
    pub fn contains_point(&self, p: &Point3<f64>, tolerance: f64) -> bool {
        p.x >= self.low.x - tolerance
            && p.x <= self.high.x + tolerance
            && p.y >= self.low.y - tolerance
            && p.y <= self.high.y + tolerance
            && p.z >= self.low.z - tolerance
            && p.z <= self.high.z + tolerance
    }

    /// Exact overlap test on all three axes.
    pub fn intersects(&self, other: &Range3) -> bool {
        self.intersects_within(other, 0.0, 3)
    }

    /// True when the two boxes come within `distance` of each other,
    /// considering only the first `axis_count` axes (2 = xy, 3 = xyz).
    /// Null ranges never intersect anything.
    pub fn intersects_within(&self, other: &Range3, distance: f64, axis_count: usize) -> bool {
        let a_low = [self.low.x, self.low.y, self.low.z];
        let a_high = [self.high.x, self.high.y, self.high.z];
        let b_low = [other.low.x, other.low.y, other.low.z];
        let b_high = [other.high.x, other.high.y, other.high.z];

        for axis in 0..axis_count.min(3) {
            if a_low[axis] > b_high[axis] + distance || b_low[axis] > a_high[axis] + distance {
                return false;
            }
        }
        !self.is_null() && !other.is_null()
    }

    /// Squared distance from a point to the box exterior; zero inside.
    pub fn distance_squared_to_point(&self, p: &Point3<f64>) -> f64 {
        let mut dist_squared = 0.0;
        for axis in 0..3 {
            let v = p[axis];
            let low = self.low[axis];
            let high = self.high[axis];
            if v < low {
                dist_squared += (low - v) * (low - v);
            } else if v > high {
                dist_squared += (v - high) * (v - high);
            }
        }
        dist_squared
    }

    /// Point of the box closest to `p`; `p` itself when inside.
    pub fn closest_point_to(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            p.x.max(self.low.x).min(self.high.x),
            p.y.max(self.low.y).min(self.high.y),
            p.z.max(self.low.z).min(self.high.z),
        )
    }
}

impl Default for Range3 {
    fn default() -> Self {
        Self::null()
    }
}
