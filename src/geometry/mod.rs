// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Geometry module - ranges, indexed meshes and face visitors

mod mesh;
mod range;

pub use mesh::{FacetVisitor, IndexedMesh, IndexedMeshVisitor, MeshIndexError};
pub use range::Range3;
