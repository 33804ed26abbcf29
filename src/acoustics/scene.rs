use serde::Serialize;
use tracing::debug;

use super::{AcousticParams, WallTriangle};
use crate::error::GeometryError;
use crate::math::Point3;

/// Everything the acoustic engine needs to simulate a room.
///
/// Positions are in simulation units, like the walls.
#[derive(Debug, Clone, Serialize)]
pub struct RoomScene {
    pub walls: Vec<WallTriangle>,
    pub room_center: Point3,
    pub source: Point3,
    pub microphones: Vec<Point3>,
    pub sample_rate: u32,
    pub speed_of_sound: f64,
    pub max_order: u32,
    pub ray_tracing: bool,
    pub air_absorption: bool,
}

/// Assembles a [`RoomScene`].
///
/// The source defaults to the room center. At least one microphone is
/// required.
#[derive(Debug, Clone)]
pub struct RoomSceneBuilder {
    walls: Vec<WallTriangle>,
    room_center: Point3,
    source: Option<Point3>,
    microphones: Vec<Point3>,
    params: AcousticParams,
}

impl RoomSceneBuilder {
    /// Starts a scene from exported walls and the scaled room center.
    #[must_use]
    pub fn new(walls: Vec<WallTriangle>, room_center: Point3, params: AcousticParams) -> Self {
        Self {
            walls,
            room_center,
            source: None,
            microphones: Vec::new(),
            params,
        }
    }

    /// Places the sound source.
    #[must_use]
    pub fn source(mut self, position: Point3) -> Self {
        self.source = Some(position);
        self
    }

    /// Adds one microphone.
    #[must_use]
    pub fn microphone(mut self, position: Point3) -> Self {
        self.microphones.push(position);
        self
    }

    /// Adds several microphones, for example an array.
    #[must_use]
    pub fn microphones(mut self, positions: impl IntoIterator<Item = Point3>) -> Self {
        self.microphones.extend(positions);
        self
    }

    /// Validates and builds the scene.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidScene`] if there are no walls, no
    /// microphones, a non-finite position, or invalid simulation settings.
    pub fn build(self) -> Result<RoomScene, GeometryError> {
        if self.walls.is_empty() {
            return Err(GeometryError::InvalidScene("scene has no walls".into()));
        }
        if self.microphones.is_empty() {
            return Err(GeometryError::InvalidScene(
                "at least one microphone is required".into(),
            ));
        }
        let source = self.source.unwrap_or(self.room_center);
        let finite = |p: &Point3| p.coords.iter().all(|c| c.is_finite());
        if !finite(&source) {
            return Err(GeometryError::InvalidScene(format!(
                "source position {source:?} is not finite"
            )));
        }
        if let Some(mic) = self.microphones.iter().find(|m| !finite(m)) {
            return Err(GeometryError::InvalidScene(format!(
                "microphone position {mic:?} is not finite"
            )));
        }
        if self.params.sample_rate == 0 {
            return Err(GeometryError::InvalidScene("sample rate must be non-zero".into()));
        }
        let c = self.params.speed_of_sound;
        if !(c.is_finite() && c > 0.0) {
            return Err(GeometryError::InvalidScene(format!(
                "speed of sound {c} must be positive"
            )));
        }

        debug!(
            "Scene: {} walls, source {:?}, {} microphones",
            self.walls.len(),
            source,
            self.microphones.len()
        );

        Ok(RoomScene {
            walls: self.walls,
            room_center: self.room_center,
            source,
            microphones: self.microphones,
            sample_rate: self.params.sample_rate,
            speed_of_sound: c,
            max_order: self.params.max_order,
            ray_tracing: self.params.ray_tracing,
            air_absorption: self.params.air_absorption,
        })
    }
}

/// An external room-acoustics simulator.
pub trait AcousticEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Simulates `signal` played at the scene source and returns one channel
    /// of samples per microphone, at the scene sample rate.
    ///
    /// # Errors
    ///
    /// Engine specific.
    fn simulate(&mut self, scene: &RoomScene, signal: &[f32]) -> Result<Vec<Vec<f32>>, Self::Error>;
}

/// Uniform scale factor that turns a room of `volume` into one of
/// `target_volume`.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if `volume` is not a finite
/// positive number and [`GeometryError::InvalidScale`] if `target_volume`
/// is not.
pub fn scale_for_target_volume(volume: f64, target_volume: f64) -> Result<f64, GeometryError> {
    if !(volume.is_finite() && volume > 0.0) {
        return Err(GeometryError::Degenerate(format!(
            "room volume {volume} must be positive"
        )));
    }
    if !(target_volume.is_finite() && target_volume > 0.0) {
        return Err(GeometryError::InvalidScale(target_volume));
    }
    Ok((target_volume / volume).cbrt())
}
