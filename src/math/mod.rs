/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Un-normalized normal of a triangle from its winding (`(v1-v0) x (v2-v0)`).
///
/// The length equals twice the triangle area.
#[must_use]
pub fn triangle_cross(tri: &[Point3; 3]) -> Vector3 {
    (tri[1] - tri[0]).cross(&(tri[2] - tri[0]))
}

/// Area of a triangle.
#[must_use]
pub fn triangle_area(tri: &[Point3; 3]) -> f64 {
    triangle_cross(tri).norm() * 0.5
}

/// Unit normal of a triangle from its winding, or `None` when degenerate.
#[must_use]
pub fn triangle_normal(tri: &[Point3; 3]) -> Option<Vector3> {
    let cross = triangle_cross(tri);
    let len = cross.norm();
    if len < TOLERANCE || !len.is_finite() {
        None
    } else {
        Some(cross / len)
    }
}

/// Angle in radians between two vectors, clamped against rounding.
///
/// Returns `None` if either vector has zero length.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> Option<f64> {
    let denom = a.norm() * b.norm();
    if denom < TOLERANCE || !denom.is_finite() {
        return None;
    }
    Some((a.dot(b) / denom).clamp(-1.0, 1.0).acos())
}
