use rayon::prelude::*;
use tracing::trace;

use super::PickParams;
use crate::error::GeometryError;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::MeshModel;

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Vector3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if `direction` has (near) zero
    /// or non-finite length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self, GeometryError> {
        let len = direction.norm();
        if !(len.is_finite() && len > TOLERANCE) {
            return Err(GeometryError::ZeroVector);
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    #[must_use]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Unit direction.
    #[must_use]
    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Möller–Trumbore ray/triangle test.
///
/// Returns the distance `t` along the ray, or `None` if the ray is parallel
/// to the triangle plane (`|det| < epsilon`), misses it, or hits it at
/// `t <= epsilon`. Hits exactly on an edge count.
#[must_use]
pub fn intersect_triangle(ray: &Ray, tri: &[Point3; 3], epsilon: f64) -> Option<f64> {
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];
    let h = ray.direction.cross(&edge2);
    let det = edge1.dot(&h);
    if det.abs() < epsilon {
        return None;
    }
    let f = 1.0 / det;
    let s = ray.origin - tri[0];
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * edge2.dot(&q);
    (t > epsilon).then_some(t)
}

/// The nearest triangle hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub triangle: usize,
    /// Distance along the ray.
    pub t: f64,
    pub point: Point3,
}

impl PickHit {
    /// Nearer hit first; equal distances go to the lower triangle index.
    fn closer(self, other: Self) -> Self {
        if other
            .t
            .total_cmp(&self.t)
            .then(other.triangle.cmp(&self.triangle))
            .is_lt()
        {
            other
        } else {
            self
        }
    }
}

/// Finds the nearest triangle along a ray by testing every triangle.
///
/// The result does not depend on whether the scan runs in parallel: the
/// reduction keeps the smallest `(t, triangle)` pair, which is associative
/// and commutative.
pub struct PickTriangle {
    ray: Ray,
    params: PickParams,
}

impl PickTriangle {
    /// Creates a new `PickTriangle` query with default parameters.
    #[must_use]
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            params: PickParams::default(),
        }
    }

    /// Sets custom picking parameters.
    #[must_use]
    pub fn with_params(mut self, params: PickParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the query. A miss is `None`.
    #[must_use]
    pub fn execute(&self, mesh: &MeshModel) -> Option<PickHit> {
        let triangles = mesh.triangles();
        let eps = self.params.epsilon;
        let hit_at = |(triangle, tri): (usize, &[Point3; 3])| {
            intersect_triangle(&self.ray, tri, eps).map(|t| PickHit {
                triangle,
                t,
                point: self.ray.at(t),
            })
        };

        let hit = if triangles.len() >= self.params.parallel_threshold {
            triangles
                .par_iter()
                .enumerate()
                .filter_map(hit_at)
                .reduce_with(PickHit::closer)
        } else {
            triangles
                .iter()
                .enumerate()
                .filter_map(hit_at)
                .reduce(PickHit::closer)
        };

        trace!("Pick ray {:?} -> {:?}", self.ray, hit.map(|h| h.triangle));
        hit
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{flat_square, unit_cube};
    use crate::mesh::MeshParams;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn down_at(x: f64, y: f64, z: f64) -> Ray {
        Ray::new(p(x, y, z), -Vector3::z()).unwrap()
    }

    fn sequential() -> PickParams {
        PickParams {
            parallel_threshold: usize::MAX,
            ..PickParams::default()
        }
    }

    fn parallel() -> PickParams {
        PickParams {
            parallel_threshold: 0,
            ..PickParams::default()
        }
    }

    /// `n x n` unit squares in the z = 0 plane.
    fn grid(n: u32) -> MeshModel {
        let mut tris = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let (x, y) = (f64::from(i), f64::from(j));
                tris.push([p(x, y, 0.0), p(x + 1.0, y, 0.0), p(x + 1.0, y + 1.0, 0.0)]);
                tris.push([p(x, y, 0.0), p(x + 1.0, y + 1.0, 0.0), p(x, y + 1.0, 0.0)]);
            }
        }
        MeshModel::from_positions(tris, &MeshParams::default()).unwrap()
    }

    #[test]
    fn ray_direction_is_normalized() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), Vector3::new(0.0, 3.0, 4.0)).unwrap();
        assert_relative_eq!(ray.direction().norm(), 1.0);
        assert_relative_eq!(ray.at(5.0), p(0.0, 3.0, 4.0));
    }

    #[test]
    fn zero_direction_is_rejected() {
        let err = Ray::new(p(0.0, 0.0, 0.0), Vector3::zeros()).unwrap_err();
        assert!(matches!(err, GeometryError::ZeroVector));
    }

    #[test]
    fn hits_triangle_interior() {
        let tri = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let t = intersect_triangle(&down_at(0.25, 0.25, 2.0), &tri, 1e-8).unwrap();
        assert_relative_eq!(t, 2.0);
    }

    #[test]
    fn parallel_ray_and_backward_hit_are_misses() {
        let tri = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let sideways = Ray::new(p(-1.0, 0.25, 0.0), Vector3::x()).unwrap();
        assert!(intersect_triangle(&sideways, &tri, 1e-8).is_none());
        let upward = Ray::new(p(0.25, 0.25, 1.0), Vector3::z()).unwrap();
        assert!(intersect_triangle(&upward, &tri, 1e-8).is_none());
        assert!(intersect_triangle(&down_at(0.9, 0.9, 1.0), &tri, 1e-8).is_none());
    }

    #[test]
    fn picks_nearest_face_of_cube() {
        let cube = unit_cube();
        let hit = PickTriangle::new(down_at(0.25, 0.75, 5.0)).execute(&cube).unwrap();
        // Triangle 3 is the second half of the top face.
        assert_eq!(hit.triangle, 3);
        assert_relative_eq!(hit.t, 4.0);
        assert_relative_eq!(hit.point, p(0.25, 0.75, 1.0));
    }

    #[test]
    fn ray_from_inside_ignores_faces_behind_it() {
        let cube = unit_cube();
        let ray = Ray::new(p(0.25, 0.75, 0.5), Vector3::z()).unwrap();
        let hit = PickTriangle::new(ray).execute(&cube).unwrap();
        assert_eq!(hit.triangle, 3);
        assert_relative_eq!(hit.t, 0.5);
    }

    #[test]
    fn miss_is_none() {
        let cube = unit_cube();
        assert!(PickTriangle::new(down_at(3.0, 3.0, 5.0)).execute(&cube).is_none());
    }

    #[test]
    fn shared_edge_tie_goes_to_lower_index() {
        // (0.5, 0.5) lies on the diagonal shared by both triangles.
        let square = flat_square();
        for params in [sequential(), parallel()] {
            let hit = PickTriangle::new(down_at(0.5, 0.5, 1.0))
                .with_params(params)
                .execute(&square)
                .unwrap();
            assert_eq!(hit.triangle, 0);
            assert_relative_eq!(hit.t, 1.0);
        }
    }

    #[test]
    fn pick_is_deterministic() {
        let cube = unit_cube();
        let query = PickTriangle::new(down_at(0.5, 0.5, 5.0));
        assert_eq!(query.execute(&cube), query.execute(&cube));
    }

    #[test]
    fn parallel_scan_matches_sequential() {
        let mesh = grid(30);
        for (x, y) in [(0.5, 0.5), (10.0, 10.0), (12.3, 7.7), (29.9, 0.1), (31.0, 2.0)] {
            let ray = Ray::new(p(x, y, 3.0), Vector3::new(0.01, -0.02, -1.0)).unwrap();
            let seq = PickTriangle::new(ray).with_params(sequential()).execute(&mesh);
            let par = PickTriangle::new(ray).with_params(parallel()).execute(&mesh);
            assert_eq!(seq, par, "ray at ({x}, {y})");
        }
    }
}
