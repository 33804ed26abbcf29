use super::unproject::empty_viewport;
use super::{ray_from_screen_point, Ray, Viewport};
use crate::error::GeometryError;
use crate::math::{Matrix4, Point2, Point3, Vector3, TOLERANCE};
use crate::mesh::Bounds;

const DEGREES_PER_PIXEL: f64 = 0.5;
const PITCH_LIMIT_DEGREES: f64 = 89.0;
const INITIAL_HEADING_DEGREES: f64 = 35.0;
const INITIAL_PITCH_DEGREES: f64 = 35.0;

/// A z-up camera orbiting the center of a mesh.
///
/// Distances are expressed relative to the length of the mesh bounding box
/// diagonal: the camera starts at `2.5 × size`, can zoom between `0.2 ×` and
/// `5 × size` in steps of `0.1 × size`, and dragging by one pixel turns it by
/// half a degree.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    target: Point3,
    size: f64,
    heading_degrees: f64,
    pitch_degrees: f64,
    distance: f64,
    fov_degrees: f64,
}

impl OrbitCamera {
    /// Frames the given bounds.
    #[must_use]
    pub fn framing(bounds: &Bounds) -> Self {
        let size = bounds.size();
        let size = if size.is_finite() && size > TOLERANCE {
            size
        } else {
            1.0
        };
        Self {
            target: bounds.center(),
            size,
            heading_degrees: INITIAL_HEADING_DEGREES,
            pitch_degrees: INITIAL_PITCH_DEGREES,
            distance: 2.5 * size,
            fov_degrees: 45.0,
        }
    }

    #[must_use]
    pub fn target(&self) -> Point3 {
        self.target
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn heading_degrees(&self) -> f64 {
        self.heading_degrees
    }

    #[must_use]
    pub fn pitch_degrees(&self) -> f64 {
        self.pitch_degrees
    }

    /// Applies a pointer drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f64, dy: f64) {
        self.heading_degrees -= dx * DEGREES_PER_PIXEL;
        self.pitch_degrees = (self.pitch_degrees + dy * DEGREES_PER_PIXEL)
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
    }

    /// Moves one zoom step toward the target.
    pub fn zoom_in(&mut self) {
        self.distance = (self.distance - 0.1 * self.size).max(self.min_distance());
    }

    /// Moves one zoom step away from the target.
    pub fn zoom_out(&mut self) {
        self.distance = (self.distance + 0.1 * self.size).min(self.max_distance());
    }

    #[must_use]
    pub fn min_distance(&self) -> f64 {
        0.2 * self.size
    }

    #[must_use]
    pub fn max_distance(&self) -> f64 {
        5.0 * self.size
    }

    /// Camera position.
    #[must_use]
    pub fn eye(&self) -> Point3 {
        let heading = self.heading_degrees.to_radians();
        let pitch = self.pitch_degrees.to_radians();
        let offset = Vector3::new(
            heading.sin() * pitch.cos(),
            -heading.cos() * pitch.cos(),
            pitch.sin(),
        ) * self.distance;
        self.target + offset
    }

    /// Right-handed look-at matrix with +z up.
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at_rh(&self.eye(), &self.target, &Vector3::z())
    }

    /// Perspective projection for a viewport aspect ratio.
    ///
    /// The clip planes scale with the mesh so that the farthest zoom still
    /// shows the whole model.
    #[must_use]
    pub fn projection_matrix(&self, aspect: f64) -> Matrix4 {
        Matrix4::new_perspective(
            aspect,
            self.fov_degrees.to_radians(),
            0.01 * self.size,
            20.0 * self.size,
        )
    }

    /// Pick ray under a window point.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a viewport without area
    /// (a minimized window); otherwise see [`ray_from_screen_point`].
    pub fn ray_through(&self, screen: Point2, viewport: &Viewport) -> Result<Ray, GeometryError> {
        // The projection needs a finite, non-zero aspect ratio.
        if !viewport.has_area() {
            return Err(empty_viewport(viewport));
        }
        ray_from_screen_point(
            screen,
            viewport,
            &self.view_matrix(),
            &self.projection_matrix(viewport.aspect()),
        )
    }
}
