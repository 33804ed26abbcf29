use nalgebra::Vector4;

use super::Ray;
use crate::error::GeometryError;
use crate::math::{Matrix4, Point2, Point3};

/// The on-screen rectangle the scene is drawn into, in window pixels with a
/// top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// A viewport covering a whole window of the given size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Returns `true` if both extents are positive.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Returns `true` if the window point falls inside the viewport.
    #[must_use]
    pub fn contains(&self, screen: Point2) -> bool {
        screen.x >= self.x
            && screen.x <= self.x + self.width
            && screen.y >= self.y
            && screen.y <= self.y + self.height
    }

    /// Normalized device coordinates of a window point (y pointing up).
    fn to_ndc(self, screen: Point2) -> (f64, f64) {
        let x = 2.0 * (screen.x - self.x) / self.width - 1.0;
        let y = 1.0 - 2.0 * (screen.y - self.y) / self.height;
        (x, y)
    }
}

pub(super) fn empty_viewport(viewport: &Viewport) -> GeometryError {
    GeometryError::Degenerate(format!(
        "viewport {}x{} has no area",
        viewport.width, viewport.height
    ))
}

/// Builds the world-space pick ray under a window point.
///
/// The point is unprojected at the near (`z = -1`) and far (`z = 1`) clip
/// planes through `(projection * view)^-1`; the ray starts on the near plane
/// and points toward the far one.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if the viewport is empty or the
/// combined matrix is not invertible, and [`GeometryError::ZeroVector`] if
/// both unprojected points coincide.
pub fn ray_from_screen_point(
    screen: Point2,
    viewport: &Viewport,
    view: &Matrix4,
    projection: &Matrix4,
) -> Result<Ray, GeometryError> {
    if !viewport.has_area() {
        return Err(empty_viewport(viewport));
    }
    let inverse = (projection * view).try_inverse().ok_or_else(|| {
        GeometryError::Degenerate("view-projection matrix is not invertible".into())
    })?;

    let (x, y) = viewport.to_ndc(screen);
    let unproject = |z: f64| -> Result<Point3, GeometryError> {
        Point3::from_homogeneous(inverse * Vector4::new(x, y, z, 1.0)).ok_or_else(|| {
            GeometryError::Degenerate("unprojected point lies at infinity".into())
        })
    };
    let near = unproject(-1.0)?;
    let far = unproject(1.0)?;
    Ray::new(near, far - near)
}
