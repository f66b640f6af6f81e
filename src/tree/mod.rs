// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Range tree module - spatial index, traversal protocol, dual-tree search

mod handlers;
mod range_tree;
mod search;

pub use handlers::{ClosestRangeSearcher, TreeStatisticsCollector};
pub use range_tree::{NodeRef, RangeTree, TreeHandler, MAX_FANOUT};
pub use search::{ClashTester, RangeTreePairSearcher, SimpleRangeClashTester};
