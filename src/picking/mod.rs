//! Resolving pointer rays to mesh triangles.

mod camera;
mod ray_cast;
mod unproject;

pub use camera::OrbitCamera;
pub use ray_cast::{intersect_triangle, PickHit, PickTriangle, Ray};
pub use unproject::{ray_from_screen_point, Viewport};

use serde::{Deserialize, Serialize};

/// Parameters for ray picking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PickParams {
    /// Determinant and distance cutoff of the intersection test.
    pub epsilon: f64,
    /// Meshes with at least this many triangles are scanned in parallel.
    pub parallel_threshold: usize,
}

impl Default for PickParams {
    fn default() -> Self {
        Self {
            epsilon: 1e-8,
            parallel_threshold: 50_000,
        }
    }
}
