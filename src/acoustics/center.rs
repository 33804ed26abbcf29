use serde::Serialize;
use tracing::debug;

use crate::error::DegenerateMeshError;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::{EdgeAdjacency, MeshModel};

/// Volumetric centroid and enclosed volume of a closed mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoomCenter {
    pub center: Point3,
    /// Absolute enclosed volume in model units cubed.
    pub volume: f64,
}

/// Computes the volume-weighted centroid of a closed triangle mesh.
///
/// Every triangle forms a tetrahedron with the origin. Its signed volume is
/// `v0 · (v1 × v2) / 6` and its centroid `(v0 + v1 + v2) / 4`; the room
/// center is the volume-weighted mean of those centroids. The result does
/// not depend on the winding direction as long as it is consistent.
pub struct VolumetricCenter {
    tolerance: f64,
}

impl VolumetricCenter {
    /// Creates a new `VolumetricCenter` query.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: TOLERANCE,
        }
    }

    /// Volumes at or below this magnitude count as zero.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the computation.
    ///
    /// # Errors
    ///
    /// Returns [`DegenerateMeshError::NotClosed`] if the mesh has boundary
    /// edges and [`DegenerateMeshError::ZeroVolume`] if the enclosed volume
    /// vanishes.
    pub fn execute(
        &self,
        mesh: &MeshModel,
        adjacency: &EdgeAdjacency,
    ) -> Result<RoomCenter, DegenerateMeshError> {
        // An open mesh can still produce a plausible non-zero volume.
        let boundary_edges = adjacency.boundary_edge_count();
        if boundary_edges > 0 {
            return Err(DegenerateMeshError::NotClosed { boundary_edges });
        }

        let mut volume = 0.0;
        let mut weighted = Vector3::zeros();
        for [v0, v1, v2] in mesh.triangles() {
            let tetra = v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0;
            volume += tetra;
            weighted += (v0.coords + v1.coords + v2.coords) / 4.0 * tetra;
        }

        if !(volume.is_finite() && volume.abs() > self.tolerance) {
            return Err(DegenerateMeshError::ZeroVolume { volume });
        }

        let center = Point3::from(weighted / volume);
        debug!("Room volume {:.6}, center {:?}", volume.abs(), center);

        Ok(RoomCenter {
            center,
            volume: volume.abs(),
        })
    }
}

impl Default for VolumetricCenter {
    fn default() -> Self {
        Self::new()
    }
}
