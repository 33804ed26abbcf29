//! Read-only triangle mesh model.
//!
//! A [`MeshModel`] keeps the raw triangle soup as delivered by the loader
//! (three positions and one normal per triangle) together with a welded
//! vertex index table, so that topology queries work on integer keys rather
//! than on floating-point coordinates.

pub mod adjacency;
pub mod load;
pub mod weld;

pub use adjacency::{EdgeAdjacency, EdgeKey, MeshReport};
pub use load::{load_mesh, read_stl, MeshFormat};
pub use weld::VertexTable;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::MeshLoadError;
use crate::math::{triangle_normal, Point3, Vector3, TOLERANCE};

/// Parameters controlling how a mesh is built from raw triangles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Maximum per-axis distance at which two positions are the same vertex.
    pub weld_tolerance: f64,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            weld_tolerance: 1e-6,
        }
    }
}

/// Axis-aligned bounds of a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Bounds {
    /// Midpoint of the box, `(min + max) / 2`.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the box diagonal, `‖max - min‖`.
    #[must_use]
    pub fn size(&self) -> f64 {
        (self.max - self.min).norm()
    }

    /// Returns `true` if `point` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Point3) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    fn from_points<'a>(mut points: impl Iterator<Item = &'a Point3>) -> Option<Self> {
        let first = *points.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in points {
            bounds.min = bounds.min.inf(p);
            bounds.max = bounds.max.sup(p);
        }
        Some(bounds)
    }
}

/// An immutable triangle mesh with per-triangle normals.
#[derive(Debug, Clone)]
pub struct MeshModel {
    triangles: Vec<[Point3; 3]>,
    normals: Vec<Vector3>,
    faces: Vec<[u32; 3]>,
    vertices: Vec<Point3>,
    bounds: Bounds,
}

impl MeshModel {
    /// Loads a mesh file, dispatching on its extension.
    ///
    /// # Errors
    ///
    /// See [`load_mesh`].
    pub fn load(path: impl AsRef<Path>, params: &MeshParams) -> Result<Self, MeshLoadError> {
        load::load_mesh(path.as_ref(), params)
    }

    /// Builds a mesh from a triangle soup and its per-triangle normals.
    ///
    /// Stored normals are normalized. Zero-length or non-finite normals are
    /// recomputed from the triangle winding. An empty `normals` slice means
    /// all normals are computed from the winding.
    ///
    /// # Errors
    ///
    /// Returns [`MeshLoadError::Empty`] for an empty soup and
    /// [`MeshLoadError::Malformed`] for non-finite coordinates, a normal count
    /// that does not match the triangle count, or more triangles than `u32`
    /// can index.
    pub fn from_triangles(
        triangles: Vec<[Point3; 3]>,
        normals: Vec<Vector3>,
        params: &MeshParams,
    ) -> Result<Self, MeshLoadError> {
        if triangles.is_empty() {
            return Err(MeshLoadError::Empty);
        }
        if !normals.is_empty() && normals.len() != triangles.len() {
            return Err(MeshLoadError::Malformed(format!(
                "{} normals for {} triangles",
                normals.len(),
                triangles.len()
            )));
        }
        // Three vertex slots per triangle must fit the u32 id space.
        if triangles
            .len()
            .checked_mul(3)
            .and_then(|n| u32::try_from(n).ok())
            .is_none()
        {
            return Err(MeshLoadError::Malformed(format!(
                "{} triangles exceed the supported mesh size",
                triangles.len()
            )));
        }
        if let Some(index) = triangles
            .iter()
            .position(|tri| tri.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())))
        {
            return Err(MeshLoadError::Malformed(format!(
                "triangle {index} has non-finite coordinates"
            )));
        }

        let mut recomputed = 0usize;
        let normals: Vec<Vector3> = triangles
            .iter()
            .enumerate()
            .map(|(i, tri)| {
                let stored = normals.get(i).copied().unwrap_or_else(Vector3::zeros);
                let len = stored.norm();
                if len > TOLERANCE && len.is_finite() {
                    stored / len
                } else {
                    recomputed += 1;
                    triangle_normal(tri).unwrap_or_else(Vector3::zeros)
                }
            })
            .collect();
        if recomputed > 0 {
            debug!("Recomputed {} missing triangle normals from winding", recomputed);
        }

        let mut table = VertexTable::new(params.weld_tolerance);
        let faces: Vec<[u32; 3]> = triangles
            .iter()
            .map(|tri| [table.insert(tri[0]), table.insert(tri[1]), table.insert(tri[2])])
            .collect();
        let vertices = table.into_positions();

        let collapsed = faces
            .iter()
            .filter(|f| f[0] == f[1] || f[1] == f[2] || f[0] == f[2])
            .count();
        if collapsed > 0 {
            warn!(
                "{} triangles collapse to fewer than 3 distinct vertices at weld tolerance {}",
                collapsed, params.weld_tolerance
            );
        }

        let bounds = Bounds::from_points(triangles.iter().flatten()).ok_or(MeshLoadError::Empty)?;

        debug!(
            "Built mesh: {} triangles, {} welded vertices (from {} positions)",
            triangles.len(),
            vertices.len(),
            triangles.len() * 3
        );

        Ok(Self {
            triangles,
            normals,
            faces,
            vertices,
            bounds,
        })
    }

    /// Builds a mesh from a triangle soup, computing normals from the winding.
    ///
    /// # Errors
    ///
    /// See [`MeshModel::from_triangles`].
    pub fn from_positions(
        triangles: Vec<[Point3; 3]>,
        params: &MeshParams,
    ) -> Result<Self, MeshLoadError> {
        Self::from_triangles(triangles, Vec::new(), params)
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of distinct (welded) vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Corner positions of triangle `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= triangle_count()`.
    #[must_use]
    pub fn triangle(&self, index: usize) -> [Point3; 3] {
        self.triangles[index]
    }

    /// Unit normal of triangle `index` (zero for degenerate triangles).
    ///
    /// # Panics
    ///
    /// Panics if `index >= triangle_count()`.
    #[must_use]
    pub fn normal(&self, index: usize) -> Vector3 {
        self.normals[index]
    }

    /// Welded vertex ids of triangle `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= triangle_count()`.
    #[must_use]
    pub fn triangle_vertex_ids(&self, index: usize) -> [u32; 3] {
        self.faces[index]
    }

    /// All triangles as corner positions.
    #[must_use]
    pub fn triangles(&self) -> &[[Point3; 3]] {
        &self.triangles
    }

    /// All per-triangle unit normals.
    #[must_use]
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    /// All triangles as welded vertex ids.
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Welded vertex positions, indexed by vertex id.
    #[must_use]
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Position of welded vertex `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a vertex id of this mesh.
    #[must_use]
    pub fn vertex(&self, id: u32) -> Point3 {
        self.vertices[id as usize]
    }

    /// Axis-aligned bounds over all triangle corners.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Builds the edge → triangles index for this mesh.
    #[must_use]
    pub fn adjacency(&self) -> EdgeAdjacency {
        EdgeAdjacency::build(&self.faces)
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::{flat_square, unit_cube};
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn cube_welds_to_eight_vertices() {
        let cube = unit_cube();
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.vertex_count(), 8);
    }

    #[test]
    fn cube_normals_point_outward() {
        let cube = unit_cube();
        let center = p(0.5, 0.5, 0.5);
        for i in 0..cube.triangle_count() {
            let tri = cube.triangle(i);
            let outward = tri[0] - center;
            assert!(
                cube.normal(i).dot(&outward) > 0.0,
                "triangle {i} normal {:?} points inward",
                cube.normal(i)
            );
        }
    }

    #[test]
    fn bounds_center_and_size() {
        let cube = unit_cube();
        let bounds = cube.bounds();
        assert_relative_eq!(bounds.center(), p(0.5, 0.5, 0.5));
        assert_relative_eq!(bounds.size(), 3.0_f64.sqrt());
        assert!(bounds.contains(&p(0.25, 0.5, 1.0)));
        assert!(!bounds.contains(&p(1.5, 0.5, 0.5)));
    }

    #[test]
    fn stored_normals_are_normalized() {
        let tris = vec![[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]];
        let mesh = MeshModel::from_triangles(
            tris,
            vec![Vector3::new(0.0, 0.0, 4.0)],
            &MeshParams::default(),
        )
        .unwrap();
        assert_relative_eq!(mesh.normal(0), Vector3::z());
    }

    #[test]
    fn zero_normals_are_recomputed_from_winding() {
        let tris = vec![[p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0)]];
        let mesh =
            MeshModel::from_triangles(tris, vec![Vector3::zeros()], &MeshParams::default())
                .unwrap();
        assert_relative_eq!(mesh.normal(0), -Vector3::z());
    }

    #[test]
    fn empty_soup_is_rejected() {
        let err = MeshModel::from_positions(Vec::new(), &MeshParams::default()).unwrap_err();
        assert!(matches!(err, MeshLoadError::Empty));
    }

    #[test]
    fn normal_count_mismatch_is_malformed() {
        let square = flat_square();
        let err = MeshModel::from_triangles(
            square.triangles().to_vec(),
            vec![Vector3::z()],
            &MeshParams::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MeshLoadError::Malformed(_)));
    }

    #[test]
    fn non_finite_coordinates_are_malformed() {
        let tris = vec![[p(0.0, 0.0, 0.0), p(f64::NAN, 0.0, 0.0), p(0.0, 1.0, 0.0)]];
        let err = MeshModel::from_positions(tris, &MeshParams::default()).unwrap_err();
        assert!(matches!(err, MeshLoadError::Malformed(msg) if msg.contains("triangle 0")));
    }

    #[test]
    fn large_coordinates_load_without_overflow() {
        let tris = vec![
            [p(1e13, 0.0, 0.0), p(1e13 + 1.0, 0.0, 0.0), p(1e13, 1.0, 0.0)],
            [p(1e13 + 1.0, 0.0, 0.0), p(1e13 + 1.0, 1.0, 0.0), p(1e13, 1.0, 0.0)],
        ];
        let mesh = MeshModel::from_positions(tris, &MeshParams::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn near_duplicate_positions_share_a_vertex() {
        let tris = vec![
            [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)],
            [p(1e-9, 0.0, 0.0), p(1.0, 1.0, 1e-9), p(0.0, 1.0, 0.0)],
        ];
        let mesh = MeshModel::from_positions(tris, &MeshParams::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_vertex_ids(0)[0], mesh.triangle_vertex_ids(1)[0]);
        assert_eq!(mesh.triangle_vertex_ids(0)[2], mesh.triangle_vertex_ids(1)[1]);
    }
}
