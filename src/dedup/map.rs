// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyrange Inc.

//! Coordinate deduplication map for building indexed meshes

use crate::dedup::ordering::{CoordinateKey, ToleranceOrdering, TolerantIndexMap};
use crate::geometry::{FacetVisitor, IndexedMesh};
use nalgebra::{Point2, Point3, Vector3};
use std::collections::BTreeMap;

fn point_key(p: &Point3<f64>) -> CoordinateKey {
    [p.x, p.y, p.z]
}

fn normal_key(n: &Vector3<f64>) -> CoordinateKey {
    [n.x, n.y, n.z]
}

/// Builds an [`IndexedMesh`] with shared coordinate data.
///
/// Each `add_*` call returns the zero-based index of the coordinate in the
/// mesh's data array, appending only when no tolerantly-equal coordinate was
/// seen before. Points, normals, and params are matched with a
/// [`ToleranceOrdering`]; integer colors are matched exactly.
///
/// The map borrows the mesh for its lifetime, so lookups always agree with
/// the mesh contents. Params are two-dimensional; the third key component
/// comes from [`CoordinateMap::set_current_param_z`], which callers bump
/// between surfaces whose parameter spaces must not be merged.
pub struct CoordinateMap<'a> {
    mesh: &'a mut IndexedMesh,
    points: TolerantIndexMap,
    normals: TolerantIndexMap,
    params: TolerantIndexMap,
    colors: BTreeMap<u32, usize>,
    current_param_z: f64,
}

impl<'a> CoordinateMap<'a> {
    /// Map with the default tolerances.
    pub fn new(mesh: &'a mut IndexedMesh) -> Self {
        Self::with_tolerances(mesh, ToleranceOrdering::default())
    }

    pub fn with_tolerances(mesh: &'a mut IndexedMesh, ordering: ToleranceOrdering) -> Self {
        Self {
            mesh,
            points: TolerantIndexMap::new(ordering),
            normals: TolerantIndexMap::new(ordering),
            params: TolerantIndexMap::new(ordering),
            colors: BTreeMap::new(),
            current_param_z: 0.0,
        }
    }

    pub fn mesh(&self) -> &IndexedMesh {
        &*self.mesh
    }

    pub fn ordering(&self) -> &ToleranceOrdering {
        self.points.ordering()
    }

    /// Z planes separate param spaces: bump this between surfaces so their
    /// `(u, v)` coordinates never merge.
    pub fn set_current_param_z(&mut self, z: f64) {
        self.current_param_z = z;
    }

    pub fn current_param_z(&self) -> f64 {
        self.current_param_z
    }

    /// Index of `point` in the mesh point array, appending if unseen.
    pub fn add_point(&mut self, point: Point3<f64>) -> usize {
        let mesh = &mut *self.mesh;
        self.points
            .insert_or_find(point_key(&point), || mesh.append_point(point))
    }

    pub fn add_normal(&mut self, normal: Vector3<f64>) -> usize {
        let mesh = &mut *self.mesh;
        self.normals
            .insert_or_find(normal_key(&normal), || mesh.append_normal(normal))
    }

    pub fn add_param(&mut self, param: Point2<f64>) -> usize {
        let key = [param.x, param.y, self.current_param_z];
        let mesh = &mut *self.mesh;
        self.params
            .insert_or_find(key, || mesh.append_param(param))
    }

    pub fn add_int_color(&mut self, color: u32) -> usize {
        let mesh = &mut *self.mesh;
        *self
            .colors
            .entry(color)
            .or_insert_with(|| mesh.append_color(color))
    }

    /// Index of a point tolerantly equal to `point`, without inserting.
    pub fn find_point(&self, point: &Point3<f64>) -> Option<usize> {
        self.points.find(&point_key(point))
    }

    pub fn find_normal(&self, normal: &Vector3<f64>) -> Option<usize> {
        self.normals.find(&normal_key(normal))
    }

    pub fn find_param(&self, param: &Point2<f64>) -> Option<usize> {
        self.params.find(&[param.x, param.y, self.current_param_z])
    }

    pub fn find_int_color(&self, color: u32) -> Option<usize> {
        self.colors.get(&color).copied()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Append one face from parallel per-vertex arrays, deduplicating every
    /// coordinate and terminating the face.
    ///
    /// Trailing vertices tolerantly equal to the first are dropped, so
    /// closed rings (last vertex repeating the first) and open rings produce
    /// the same face. All edges are emitted visible. Aux slices, when
    /// present, must be at least as long as `points`.
    pub fn add_polygon(
        &mut self,
        points: &[Point3<f64>],
        normals: Option<&[Vector3<f64>]>,
        params: Option<&[Point2<f64>]>,
        colors: Option<&[u32]>,
    ) {
        let count = self.open_ring_len(points.len(), |i| self.ordering().equal(
            &point_key(&points[i]),
            &point_key(&points[0]),
        ));
        if count == 0 {
            return;
        }
        for i in 0..count {
            let point_index = self.add_point(points[i]);
            self.mesh.push_point_index(point_index, true);
            if let Some(normals) = normals {
                let normal_index = self.add_normal(normals[i]);
                self.mesh.push_normal_index(normal_index);
            }
            if let Some(params) = params {
                let param_index = self.add_param(params[i]);
                self.mesh.push_param_index(param_index);
            }
            if let Some(colors) = colors {
                let color_index = self.add_int_color(colors[i]);
                self.mesh.push_color_index(color_index);
            }
        }
        self.mesh.terminate_face();
    }

    /// Append one face read through a [`FacetVisitor`], carrying per-edge
    /// visibility and whichever aux data the visitor supplies.
    pub fn add_visitor_face<V: FacetVisitor>(&mut self, visitor: &V) {
        let count = self.open_ring_len(visitor.edge_count(), |i| {
            self.ordering().equal(
                &point_key(&visitor.point(i)),
                &point_key(&visitor.point(0)),
            )
        });
        if count == 0 {
            return;
        }
        for i in 0..count {
            let point_index = self.add_point(visitor.point(i));
            self.mesh.push_point_index(point_index, visitor.edge_visible(i));
            if let Some(normal) = visitor.normal(i) {
                let normal_index = self.add_normal(normal);
                self.mesh.push_normal_index(normal_index);
            }
            if let Some(param) = visitor.param(i) {
                let param_index = self.add_param(param);
                self.mesh.push_param_index(param_index);
            }
            if let Some(color) = visitor.color(i) {
                let color_index = self.add_int_color(color);
                self.mesh.push_color_index(color_index);
            }
        }
        self.mesh.terminate_face();
    }

    /// Length after stripping trailing vertices equal to the first.
    fn open_ring_len<F: Fn(usize) -> bool>(&self, mut len: usize, equals_first: F) -> usize {
        while len > 1 && equals_first(len - 1) {
            len -= 1;
        }
        len
    }

    /// Reset the map and the mesh it builds to empty.
    pub fn clear_data(&mut self) {
        self.points.clear();
        self.normals.clear();
        self.params.clear();
        self.colors.clear();
        self.current_param_z = 0.0;
        self.mesh.clear();
    }
}
