//! Hand-off to the external room-acoustics engine.
//!
//! The engine needs one reflective wall per mesh triangle, scaled into
//! simulation units, plus a point inside the room to place the default
//! source. This module produces both and packs them into a [`RoomScene`].

mod center;
mod scene;
mod walls;

pub use center::{RoomCenter, VolumetricCenter};
pub use scene::{scale_for_target_volume, AcousticEngine, RoomScene, RoomSceneBuilder};
pub use walls::{BuildWalls, MaterialTable, WallMaterial, WallTriangle};

use serde::{Deserialize, Serialize};

/// Parameters for wall export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportParams {
    /// Multiplier from model units to simulation units (meters).
    pub scale_factor: f64,
    /// Material of surfaces without an explicit assignment.
    pub default_material: WallMaterial,
}

impl Default for ExportParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            default_material: WallMaterial::default(),
        }
    }
}

/// Simulation settings forwarded to the acoustic engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AcousticParams {
    /// Samples per second.
    pub sample_rate: u32,
    /// Meters per second.
    pub speed_of_sound: f64,
    /// Maximum reflection order of the image source model.
    pub max_order: u32,
    pub ray_tracing: bool,
    pub air_absorption: bool,
}

impl Default for AcousticParams {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            speed_of_sound: 343.0,
            max_order: 3,
            ray_tracing: true,
            air_absorption: true,
        }
    }
}
