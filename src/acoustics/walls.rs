use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ExportParams;
use crate::error::GeometryError;
use crate::math::{triangle_area, Point3, TOLERANCE};
use crate::mesh::MeshModel;
use crate::segmentation::Segmentation;

/// Energy absorption and scattering coefficients of a wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallMaterial {
    pub absorption: f64,
    pub scattering: f64,
}

impl WallMaterial {
    /// Creates a material, clamping both coefficients to `[0, 1]`.
    #[must_use]
    pub fn new(absorption: f64, scattering: f64) -> Self {
        let unit = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            absorption: unit(absorption),
            scattering: unit(scattering),
        }
    }

    /// Returns `true` if both coefficients lie in `[0, 1]`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.absorption) && (0.0..=1.0).contains(&self.scattering)
    }
}

impl Default for WallMaterial {
    fn default() -> Self {
        Self {
            absorption: 0.2,
            scattering: 0.1,
        }
    }
}

/// Wall materials per surface, with a fallback for unassigned surfaces.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    default: WallMaterial,
    surfaces: FxHashMap<usize, WallMaterial>,
}

impl MaterialTable {
    /// A table that assigns `default` to every surface.
    #[must_use]
    pub fn new(default: WallMaterial) -> Self {
        Self {
            default,
            surfaces: FxHashMap::default(),
        }
    }

    /// Assigns `material` to `surface`.
    pub fn set(&mut self, surface: usize, material: WallMaterial) {
        self.surfaces.insert(surface, material);
    }

    /// Removes the assignment of `surface`, falling back to the default.
    pub fn clear(&mut self, surface: usize) {
        self.surfaces.remove(&surface);
    }

    /// Material of `surface`.
    #[must_use]
    pub fn get(&self, surface: usize) -> WallMaterial {
        self.surfaces.get(&surface).copied().unwrap_or(self.default)
    }

    #[must_use]
    pub fn default_material(&self) -> WallMaterial {
        self.default
    }
}

/// One reflective wall for the acoustic engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallTriangle {
    pub surface: usize,
    pub triangle: usize,
    /// Corners in simulation units.
    pub vertices: [Point3; 3],
    pub absorption: f64,
    pub scattering: f64,
}

/// Builds one wall per mesh triangle, surface by surface.
///
/// Walls are emitted in surface order and, within a surface, in ascending
/// triangle order. Triangles that collapse onto fewer than three distinct
/// vertices, or whose scaled area vanishes, are skipped with a warning.
pub struct BuildWalls<'a> {
    segmentation: &'a Segmentation,
    scale_factor: f64,
    default_material: WallMaterial,
    materials: Option<&'a MaterialTable>,
}

impl<'a> BuildWalls<'a> {
    /// Creates a new `BuildWalls` operation that gives every wall
    /// [`WallMaterial::default`].
    #[must_use]
    pub fn new(segmentation: &'a Segmentation, scale_factor: f64) -> Self {
        Self {
            segmentation,
            scale_factor,
            default_material: WallMaterial::default(),
            materials: None,
        }
    }

    /// Creates a new `BuildWalls` operation from export settings.
    #[must_use]
    pub fn from_params(segmentation: &'a Segmentation, params: &ExportParams) -> Self {
        Self::new(segmentation, params.scale_factor).with_default_material(params.default_material)
    }

    /// Sets the material used when no material table is attached.
    #[must_use]
    pub fn with_default_material(mut self, material: WallMaterial) -> Self {
        self.default_material = material;
        self
    }

    /// Uses per-surface materials from `materials`, including its fallback.
    #[must_use]
    pub fn with_materials(mut self, materials: &'a MaterialTable) -> Self {
        self.materials = Some(materials);
        self
    }

    /// Executes the export.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NoSurfaces`] if the segmentation is empty.
    /// - [`GeometryError::InvalidScale`] if the scale factor is not a finite
    ///   positive number.
    /// - [`GeometryError::NoWalls`] if every triangle was skipped.
    pub fn execute(&self, mesh: &MeshModel) -> Result<Vec<WallTriangle>, GeometryError> {
        if self.segmentation.is_empty() {
            return Err(GeometryError::NoSurfaces);
        }
        let scale = self.scale_factor;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(GeometryError::InvalidScale(scale));
        }

        let mut walls = Vec::with_capacity(mesh.triangle_count());
        let mut skipped = 0usize;

        for (surface, members) in self.segmentation.surfaces().iter().enumerate() {
            let material = self
                .materials
                .map_or(self.default_material, |table| table.get(surface));

            for &triangle in members.triangles() {
                let [a, b, c] = mesh.triangle_vertex_ids(triangle);
                let vertices = mesh.triangle(triangle).map(|v| Point3::from(v.coords * scale));
                if a == b || b == c || a == c || triangle_area(&vertices) <= TOLERANCE {
                    skipped += 1;
                    continue;
                }
                walls.push(WallTriangle {
                    surface,
                    triangle,
                    vertices,
                    absorption: material.absorption,
                    scattering: material.scattering,
                });
            }
        }

        if skipped > 0 {
            warn!("Skipped {} degenerate triangles during wall export", skipped);
        }
        if walls.is_empty() {
            return Err(GeometryError::NoWalls { skipped });
        }

        debug!(
            "Exported {} walls from {} surfaces at scale {}",
            walls.len(),
            self.segmentation.len(),
            scale
        );

        Ok(walls)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::unit_cube;
    use crate::mesh::MeshParams;
    use crate::segmentation::{segment_mesh, SegmentationParams};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn segmented(mesh: &MeshModel) -> Segmentation {
        segment_mesh(mesh, &mesh.adjacency(), &SegmentationParams::default()).1
    }

    #[test]
    fn one_wall_per_cube_triangle() {
        let cube = unit_cube();
        let seg = segmented(&cube);
        let walls = BuildWalls::new(&seg, 2.0).execute(&cube).unwrap();
        assert_eq!(walls.len(), 12);
        for wall in &walls {
            assert_eq!(seg.surface_of(wall.triangle), Some(wall.surface));
            let original = cube.triangle(wall.triangle);
            for (scaled, raw) in wall.vertices.iter().zip(original.iter()) {
                assert_relative_eq!(scaled.coords, raw.coords * 2.0);
            }
            assert_relative_eq!(wall.absorption, 0.2);
            assert_relative_eq!(wall.scattering, 0.1);
        }
    }

    #[test]
    fn per_surface_materials_override_default() {
        let cube = unit_cube();
        let seg = segmented(&cube);
        let mut table = MaterialTable::new(WallMaterial::new(0.5, 0.5));
        table.set(1, WallMaterial::new(0.9, 0.0));
        let walls = BuildWalls::new(&seg, 1.0)
            .with_materials(&table)
            .execute(&cube)
            .unwrap();
        for wall in &walls {
            let expected = if wall.surface == 1 { 0.9 } else { 0.5 };
            assert_relative_eq!(wall.absorption, expected);
        }
        table.clear(1);
        assert_eq!(table.get(1), table.default_material());
    }

    #[test]
    fn export_params_default_material_applies_without_table() {
        let cube = unit_cube();
        let seg = segmented(&cube);
        let params = ExportParams {
            scale_factor: 3.0,
            default_material: WallMaterial::new(0.6, 0.4),
        };
        let walls = BuildWalls::from_params(&seg, &params).execute(&cube).unwrap();
        assert_eq!(walls.len(), 12);
        for wall in &walls {
            assert_relative_eq!(wall.absorption, 0.6);
            assert_relative_eq!(wall.scattering, 0.4);
            for v in &wall.vertices {
                assert!(v.x <= 3.0 + 1e-12 && v.y <= 3.0 + 1e-12 && v.z <= 3.0 + 1e-12);
            }
        }
    }

    #[test]
    fn empty_segmentation_is_rejected() {
        let cube = unit_cube();
        let seg = Segmentation::from_surfaces(Vec::new(), 0);
        let err = BuildWalls::new(&seg, 1.0).execute(&cube).unwrap_err();
        assert!(matches!(err, GeometryError::NoSurfaces));
    }

    #[test]
    fn invalid_scale_is_rejected() {
        let cube = unit_cube();
        let seg = segmented(&cube);
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = BuildWalls::new(&seg, scale).execute(&cube).unwrap_err();
            assert!(matches!(err, GeometryError::InvalidScale(_)));
        }
    }

    #[test]
    fn all_degenerate_triangles_produce_no_walls() {
        let sliver = MeshModel::from_positions(
            vec![[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]],
            &MeshParams::default(),
        )
        .unwrap();
        let seg = segmented(&sliver);
        let err = BuildWalls::new(&seg, 1.0).execute(&sliver).unwrap_err();
        assert!(matches!(err, GeometryError::NoWalls { skipped: 1 }));
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let mesh = MeshModel::from_positions(
            vec![
                [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
                [p(0.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            ],
            &MeshParams::default(),
        )
        .unwrap();
        let seg = segmented(&mesh);
        let walls = BuildWalls::new(&seg, 1.0).execute(&mesh).unwrap();
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].triangle, 0);
    }

    #[test]
    fn material_coefficients_are_clamped() {
        let m = WallMaterial::new(1.5, -0.2);
        assert!(m.is_valid());
        assert_relative_eq!(m.absorption, 1.0);
        assert_relative_eq!(m.scattering, 0.0);
        assert!(!WallMaterial { absorption: 2.0, scattering: 0.0 }.is_valid());
    }
}
