// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Indexed mesh (polyface) representation and face visitors
//!
//! Coordinate data lives in shared parallel arrays; faces are 1-based index
//! loops terminated by 0. Point indices are sign-encoded for edge visibility
//! (negative = hidden edge); normal/param/color indices are always positive.

use super::Range3;
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integrity failures in polyface index arrays.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshIndexError {
    #[error("point index {index} out of range for {count} points")]
    PointIndexOutOfRange { index: i32, count: usize },

    #[error("{array} index {index} out of range for {count} entries")]
    AuxIndexOutOfRange {
        array: &'static str,
        index: i32,
        count: usize,
    },

    #[error("{array} index array does not end with a face terminator")]
    MissingTerminator { array: &'static str },

    #[error("{array} index array length {len} does not match point index length {point_len}")]
    IndexLengthMismatch {
        array: &'static str,
        len: usize,
        point_len: usize,
    },

    #[error("{array} index array has a face terminator out of step with the point indices at entry {position}")]
    TerminatorMismatch {
        array: &'static str,
        position: usize,
    },
}

/// Indexed mesh with shared coordinate arrays and 0-terminated face loops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub points: Vec<Point3<f64>>,
    pub normals: Vec<Vector3<f64>>,
    pub params: Vec<Point2<f64>>,
    pub colors: Vec<u32>,

    /// 1-based, sign-encoded for edge visibility, 0 terminates a face.
    pub point_index: Vec<i32>,
    /// 1-based, 0 terminates a face. Empty when the channel is unused.
    pub normal_index: Vec<i32>,
    pub param_index: Vec<i32>,
    pub color_index: Vec<i32>,
}

impl IndexedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(point_count: usize, index_count: usize) -> Self {
        Self {
            points: Vec::with_capacity(point_count),
            point_index: Vec::with_capacity(index_count),
            ..Self::default()
        }
    }

    /// Append a point and return its 0-based index.
    pub fn append_point(&mut self, p: Point3<f64>) -> usize {
        let index = self.points.len();
        self.points.push(p);
        index
    }

    pub fn append_normal(&mut self, n: Vector3<f64>) -> usize {
        let index = self.normals.len();
        self.normals.push(n);
        index
    }

    pub fn append_param(&mut self, uv: Point2<f64>) -> usize {
        let index = self.params.len();
        self.params.push(uv);
        index
    }

    pub fn append_color(&mut self, c: u32) -> usize {
        let index = self.colors.len();
        self.colors.push(c);
        index
    }

    /// Emit a 1-based point index, negated when the following edge is hidden.
    pub fn push_point_index(&mut self, index: usize, visible: bool) {
        let one_based = index as i32 + 1;
        self.point_index
            .push(if visible { one_based } else { -one_based });
    }

    pub fn push_normal_index(&mut self, index: usize) {
        self.normal_index.push(index as i32 + 1);
    }

    pub fn push_param_index(&mut self, index: usize) {
        self.param_index.push(index as i32 + 1);
    }

    pub fn push_color_index(&mut self, index: usize) {
        self.color_index.push(index as i32 + 1);
    }

    /// Close the current face: one 0 terminator in every index array in use.
    pub fn terminate_face(&mut self) {
        self.point_index.push(0);
        if !self.normal_index.is_empty() {
            self.normal_index.push(0);
        }
        if !self.param_index.is_empty() {
            self.param_index.push(0);
        }
        if !self.color_index.is_empty() {
            self.color_index.push(0);
        }
    }

    /// Number of terminated faces.
    pub fn face_count(&self) -> usize {
        self.point_index.iter().filter(|&&i| i == 0).count()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Range of the point array.
    pub fn point_range(&self) -> Range3 {
        Range3::from_points(&self.points)
    }

    /// Truncate all coordinate and index arrays.
    pub fn clear(&mut self) {
        self.points.clear();
        self.normals.clear();
        self.params.clear();
        self.colors.clear();
        self.point_index.clear();
        self.normal_index.clear();
        self.param_index.clear();
        self.color_index.clear();
    }

    /// Check index arrays: every index in range, faces terminated, auxiliary
    /// arrays in lockstep with the point indices.
    pub fn validate_indices(&self) -> Result<(), MeshIndexError> {
        for &index in &self.point_index {
            if index != 0 && index.unsigned_abs() as usize > self.points.len() {
                return Err(MeshIndexError::PointIndexOutOfRange {
                    index,
                    count: self.points.len(),
                });
            }
        }
        if self.point_index.last().is_some_and(|&i| i != 0) {
            return Err(MeshIndexError::MissingTerminator { array: "point" });
        }

        self.validate_aux("normal", &self.normal_index, self.normals.len())?;
        self.validate_aux("param", &self.param_index, self.params.len())?;
        self.validate_aux("color", &self.color_index, self.colors.len())?;
        Ok(())
    }

    fn validate_aux(
        &self,
        array: &'static str,
        indices: &[i32],
        count: usize,
    ) -> Result<(), MeshIndexError> {
        if indices.is_empty() {
            return Ok(());
        }
        if indices.len() != self.point_index.len() {
            return Err(MeshIndexError::IndexLengthMismatch {
                array,
                len: indices.len(),
                point_len: self.point_index.len(),
            });
        }
        for (position, (&index, &point_index)) in
            indices.iter().zip(&self.point_index).enumerate()
        {
            if (index == 0) != (point_index == 0) {
                return Err(MeshIndexError::TerminatorMismatch { array, position });
            }
            if index < 0 || index as usize > count {
                return Err(MeshIndexError::AuxIndexOutOfRange {
                    array,
                    index,
                    count,
                });
            }
        }
        Ok(())
    }
}

/// Read-only view of one mesh face at a time.
///
/// `i` addresses the face's vertices in loop order, `0 <= i < edge_count()`.
pub trait FacetVisitor {
    /// Number of edges (= vertices) in the current face.
    fn edge_count(&self) -> usize;

    fn point(&self, i: usize) -> Point3<f64>;

    /// None when the mesh carries no normal channel.
    fn normal(&self, i: usize) -> Option<Vector3<f64>>;

    fn param(&self, i: usize) -> Option<Point2<f64>>;

    fn color(&self, i: usize) -> Option<u32>;

    /// Visibility of the edge leaving vertex `i`.
    fn edge_visible(&self, i: usize) -> bool;

    /// Bounding range of the current face's points.
    fn face_range(&self) -> Range3 {
        let mut range = Range3::null();
        for i in 0..self.edge_count() {
            range.extend_point(&self.point(i));
        }
        range
    }
}

/// Visitor walking the face loops of an [`IndexedMesh`].
///
/// Construction validates the index arrays once; iteration is then plain
/// array access.
pub struct IndexedMeshVisitor<'a> {
    mesh: &'a IndexedMesh,
    /// Current face loop is `point_index[start..end]`; `end` sits on the 0.
    start: usize,
    end: usize,
}

impl<'a> IndexedMeshVisitor<'a> {
    pub fn new(mesh: &'a IndexedMesh) -> Result<Self, MeshIndexError> {
        mesh.validate_indices()?;
        Ok(Self {
            mesh,
            start: 0,
            end: 0,
        })
    }

    /// Move to the next face; false when the loops are exhausted.
    pub fn advance(&mut self) -> bool {
        let indices = &self.mesh.point_index;
        let mut start = self.end;
        // Step over the terminator that closed the previous face.
        if start < indices.len() && indices[start] == 0 {
            start += 1;
        }
        if start >= indices.len() {
            return false;
        }
        let mut end = start;
        while end < indices.len() && indices[end] != 0 {
            end += 1;
        }
        self.start = start;
        self.end = end;
        true
    }

    /// Restart iteration from the first face.
    pub fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
    }
}

impl FacetVisitor for IndexedMeshVisitor<'_> {
    fn edge_count(&self) -> usize {
        self.end - self.start
    }

    fn point(&self, i: usize) -> Point3<f64> {
        let index = self.mesh.point_index[self.start + i];
        self.mesh.points[(index.unsigned_abs() - 1) as usize]
    }

    fn normal(&self, i: usize) -> Option<Vector3<f64>> {
        if self.mesh.normal_index.is_empty() {
            return None;
        }
        let index = self.mesh.normal_index[self.start + i];
        Some(self.mesh.normals[(index - 1) as usize])
    }

    fn param(&self, i: usize) -> Option<Point2<f64>> {
        if self.mesh.param_index.is_empty() {
            return None;
        }
        let index = self.mesh.param_index[self.start + i];
        Some(self.mesh.params[(index - 1) as usize])
    }

    fn color(&self, i: usize) -> Option<u32> {
        if self.mesh.color_index.is_empty() {
            return None;
        }
        let index = self.mesh.color_index[self.start + i];
        Some(self.mesh.colors[(index - 1) as usize])
    }

    fn edge_visible(&self, i: usize) -> bool {
        self.mesh.point_index[self.start + i] > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangle_mesh() -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ] {
            mesh.append_point(p);
        }
        for &(a, b, c) in &[(0, 1, 2), (1, 3, 2)] {
            mesh.push_point_index(a, true);
            mesh.push_point_index(b, true);
            mesh.push_point_index(c, true);
            mesh.terminate_face();
        }
        mesh
    }

    #[test]
    fn test_append_and_terminate() {
        let mesh = two_triangle_mesh();
        assert_eq!(mesh.point_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.point_index, vec![1, 2, 3, 0, 2, 4, 3, 0]);
        assert!(mesh.validate_indices().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut mesh = two_triangle_mesh();
        mesh.point_index[1] = 9;
        assert_eq!(
            mesh.validate_indices(),
            Err(MeshIndexError::PointIndexOutOfRange { index: 9, count: 4 })
        );
    }

    #[test]
    fn test_validate_rejects_unterminated_face() {
        let mut mesh = two_triangle_mesh();
        mesh.point_index.push(2);
        assert_eq!(
            mesh.validate_indices(),
            Err(MeshIndexError::MissingTerminator { array: "point" })
        );
    }

    #[test]
    fn test_validate_rejects_aux_out_of_step() {
        let mut mesh = two_triangle_mesh();
        mesh.append_normal(Vector3::new(0.0, 0.0, 1.0));
        // Terminators in the wrong slots relative to the point loops.
        mesh.normal_index = vec![1, 1, 0, 1, 1, 1, 1, 0];
        let err = mesh.validate_indices().unwrap_err();
        assert_eq!(
            err,
            MeshIndexError::TerminatorMismatch {
                array: "normal",
                position: 2
            }
        );
    }

    #[test]
    fn test_visitor_walks_faces() {
        let mesh = two_triangle_mesh();
        let mut visitor = IndexedMeshVisitor::new(&mesh).unwrap();

        assert!(visitor.advance());
        assert_eq!(visitor.edge_count(), 3);
        assert_eq!(visitor.point(0), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(visitor.point(2), Point3::new(0.0, 1.0, 0.0));
        assert!(visitor.edge_visible(0));
        assert_eq!(visitor.normal(0), None);

        assert!(visitor.advance());
        assert_eq!(visitor.point(1), Point3::new(1.0, 1.0, 0.0));
        assert!(!visitor.advance());

        visitor.reset();
        assert!(visitor.advance());
        assert_eq!(visitor.point(0), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_visitor_hidden_edges_and_face_range() {
        let mut mesh = IndexedMesh::new();
        mesh.append_point(Point3::new(0.0, 0.0, 0.0));
        mesh.append_point(Point3::new(2.0, 0.0, 0.0));
        mesh.append_point(Point3::new(0.0, 3.0, 1.0));
        mesh.push_point_index(0, true);
        mesh.push_point_index(1, false);
        mesh.push_point_index(2, true);
        mesh.terminate_face();

        let mut visitor = IndexedMeshVisitor::new(&mesh).unwrap();
        assert!(visitor.advance());
        assert!(visitor.edge_visible(0));
        assert!(!visitor.edge_visible(1));

        let range = visitor.face_range();
        assert_eq!(range.low, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(range.high, Point3::new(2.0, 3.0, 1.0));
    }
}
