// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Tolerant coordinate ordering and the ordered index map built on it

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default absolute tolerance for coordinate comparison.
pub const DEFAULT_ABS_TOL: f64 = 1.0e-14;
/// Default relative tolerance for coordinate comparison.
pub const DEFAULT_REL_TOL: f64 = 1.0e-12;

/// A 3-component coordinate key. Params use `(u, v, current_param_z)`.
pub type CoordinateKey = [f64; 3];

/// Strict-weak-order comparator treating two coordinates as equal when every
/// component differs by no more than the absolute + relative tolerance band.
///
/// Components are compared in z, then y, then x order: deterministic, and it
/// orders mostly-planar point sets (constant z) by position within the plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToleranceOrdering {
    pub abs_tol: f64,
    pub rel_tol: f64,
}

impl Default for ToleranceOrdering {
    fn default() -> Self {
        Self {
            abs_tol: DEFAULT_ABS_TOL,
            rel_tol: DEFAULT_REL_TOL,
        }
    }
}

impl ToleranceOrdering {
    pub fn new(abs_tol: f64, rel_tol: f64) -> Self {
        Self { abs_tol, rel_tol }
    }

    /// Tolerance band for one comparison: the relative part scales with the
    /// summed magnitudes of both operands' components.
    fn band(&self, a: &CoordinateKey, b: &CoordinateKey) -> f64 {
        self.abs_tol
            + self.rel_tol
                * (a[0].abs() + a[1].abs() + a[2].abs() + b[0].abs() + b[1].abs() + b[2].abs())
    }

    pub fn compare(&self, a: &CoordinateKey, b: &CoordinateKey) -> Ordering {
        let band = self.band(a, b);
        for axis in [2, 1, 0] {
            if a[axis] < b[axis] - band {
                return Ordering::Less;
            }
            if a[axis] > b[axis] + band {
                return Ordering::Greater;
            }
        }
        Ordering::Equal
    }

    pub fn equal(&self, a: &CoordinateKey, b: &CoordinateKey) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

/// Ordered map from tolerant coordinate keys to stable indices.
///
/// A sorted vector searched with the comparator bound at construction; the
/// deduplication workload is lookup-heavy, and for coordinates already seen
/// the binary search does all the work.
#[derive(Debug, Clone)]
pub struct TolerantIndexMap {
    ordering: ToleranceOrdering,
    entries: Vec<(CoordinateKey, usize)>,
}

impl TolerantIndexMap {
    pub fn new(ordering: ToleranceOrdering) -> Self {
        Self {
            ordering,
            entries: Vec::new(),
        }
    }

    pub fn ordering(&self) -> &ToleranceOrdering {
        &self.ordering
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index recorded for a key tolerantly equal to `key`, if any.
    pub fn find(&self, key: &CoordinateKey) -> Option<usize> {
        self.entries
            .binary_search_by(|(entry, _)| self.ordering.compare(entry, key))
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    /// Return the existing index for an equal key, or record the index
    /// produced by `append` (which typically pushes into an external array).
    pub fn insert_or_find<F: FnOnce() -> usize>(&mut self, key: CoordinateKey, append: F) -> usize {
        match self
            .entries
            .binary_search_by(|(entry, _)| self.ordering.compare(entry, &key))
        {
            Ok(pos) => self.entries[pos].1,
            Err(pos) => {
                let index = append();
                self.entries.insert(pos, (key, index));
                index
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
