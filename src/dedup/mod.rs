// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Deduplication module - tolerant coordinate comparison and index maps

mod map;
mod ordering;

pub use map::CoordinateMap;
pub use ordering::{
    CoordinateKey, ToleranceOrdering, TolerantIndexMap, DEFAULT_ABS_TOL, DEFAULT_REL_TOL,
};
