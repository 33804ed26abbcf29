//! Surface segmentation.
//!
//! Feature edges (open boundaries, sharp creases, non-manifold edges) split
//! the mesh; every maximal set of triangles connected across non-feature
//! edges becomes one [`Surface`].

mod boundary;
mod feature_edges;
mod segment;

pub use boundary::surface_boundary_loops;
pub use feature_edges::{ComputeFeatureEdges, FeatureEdges};
pub use segment::SegmentSurfaces;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::math::{triangle_area, triangle_cross, Point3, Vector3, TOLERANCE};
use crate::mesh::{EdgeAdjacency, MeshModel};

/// How triangles are grouped into surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationStrategy {
    /// Flood fill across edges that are not feature edges.
    #[default]
    FeatureEdges,
    /// Grow each surface from a seed triangle, accepting neighbours whose
    /// corners all lie within `tolerance` of the seed plane.
    Coplanar { tolerance: f64 },
}

/// Parameters for feature edge detection and segmentation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationParams {
    /// Two-triangle edges whose normals differ by more than this are creases.
    pub angle_threshold_degrees: f64,
    pub strategy: SegmentationStrategy,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            angle_threshold_degrees: 30.0,
            strategy: SegmentationStrategy::FeatureEdges,
        }
    }
}

/// A set of triangles forming one logical wall or facet group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    triangles: Vec<usize>,
}

impl Surface {
    pub(crate) fn new(mut triangles: Vec<usize>) -> Self {
        triangles.sort_unstable();
        Self { triangles }
    }

    /// Triangle indices in ascending order.
    #[must_use]
    pub fn triangles(&self) -> &[usize] {
        &self.triangles
    }

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Always `false` for surfaces produced by segmentation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns `true` if triangle `index` belongs to this surface.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.triangles.binary_search(&index).is_ok()
    }
}

/// Geometric summary of one surface.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceSummary {
    pub index: usize,
    pub triangle_count: usize,
    pub area: f64,
    /// Area-weighted unit normal, zero if the triangle normals cancel out.
    pub normal: Vector3,
    /// Area-weighted centroid.
    pub centroid: Point3,
}

/// A partition of the mesh triangles into surfaces.
///
/// Every triangle belongs to exactly one surface. Surfaces are numbered in
/// discovery order, which is stable for a fixed triangle order.
#[derive(Debug, Clone)]
pub struct Segmentation {
    surfaces: Vec<Surface>,
    triangle_to_surface: Vec<usize>,
}

impl Segmentation {
    pub(crate) fn from_surfaces(surfaces: Vec<Surface>, triangle_count: usize) -> Self {
        let mut triangle_to_surface = vec![usize::MAX; triangle_count];
        for (surface_index, surface) in surfaces.iter().enumerate() {
            for &t in surface.triangles() {
                triangle_to_surface[t] = surface_index;
            }
        }
        debug_assert!(triangle_to_surface.iter().all(|&s| s != usize::MAX));
        Self {
            surfaces,
            triangle_to_surface,
        }
    }

    /// All surfaces, indexed by surface index.
    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Surface `index`, if it exists.
    #[must_use]
    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    /// Surface containing triangle `triangle`, if the triangle exists.
    #[must_use]
    pub fn surface_of(&self, triangle: usize) -> Option<usize> {
        self.triangle_to_surface.get(triangle).copied()
    }

    /// Surface index per triangle.
    #[must_use]
    pub fn triangle_to_surface(&self) -> &[usize] {
        &self.triangle_to_surface
    }

    /// Number of surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Returns `true` if there are no surfaces (only for an empty mesh).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Area, normal and centroid of every surface.
    #[must_use]
    pub fn summaries(&self, mesh: &MeshModel) -> Vec<SurfaceSummary> {
        self.surfaces
            .iter()
            .enumerate()
            .map(|(index, surface)| {
                let mut area = 0.0;
                let mut weighted_normal = Vector3::zeros();
                let mut weighted_centroid = Vector3::zeros();
                for &t in surface.triangles() {
                    let tri = mesh.triangle(t);
                    let a = triangle_area(&tri);
                    area += a;
                    weighted_normal += triangle_cross(&tri) * 0.5;
                    weighted_centroid += (tri[0].coords + tri[1].coords + tri[2].coords) / 3.0 * a;
                }
                let len = weighted_normal.norm();
                let normal = if len > TOLERANCE {
                    weighted_normal / len
                } else {
                    Vector3::zeros()
                };
                let centroid = if area > TOLERANCE {
                    Point3::from(weighted_centroid / area)
                } else {
                    mesh.triangle(surface.triangles()[0])[0]
                };
                SurfaceSummary {
                    index,
                    triangle_count: surface.len(),
                    area,
                    normal,
                    centroid,
                }
            })
            .collect()
    }
}

/// Runs feature edge detection and segmentation with `params`.
///
/// Feature edges are always computed, even for the coplanar strategy,
/// because renderers draw them as outlines.
#[must_use]
pub fn segment_mesh(
    mesh: &MeshModel,
    adjacency: &EdgeAdjacency,
    params: &SegmentationParams,
) -> (FeatureEdges, Segmentation) {
    let feature_edges =
        ComputeFeatureEdges::new(params.angle_threshold_degrees).execute(mesh, adjacency);

    let segmentation = match params.strategy {
        SegmentationStrategy::FeatureEdges => {
            SegmentSurfaces::new(&feature_edges).execute(mesh, adjacency)
        }
        SegmentationStrategy::Coplanar { tolerance } => {
            SegmentSurfaces::coplanar(tolerance).execute(mesh, adjacency)
        }
    };

    info!(
        "Segmented {} triangles into {} surfaces ({} feature edges, threshold {}°)",
        mesh.triangle_count(),
        segmentation.len(),
        feature_edges.len(),
        params.angle_threshold_degrees
    );

    (feature_edges, segmentation)
}
