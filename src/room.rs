//! A loaded room: mesh, segmentation and appearance state together.
//!
//! [`RoomModel`] is what a renderer or GUI holds on to. Everything derived
//! from the mesh is computed once at construction; only the registry and
//! the wall materials change afterwards.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::acoustics::{
    BuildWalls, MaterialTable, RoomCenter, RoomSceneBuilder, VolumetricCenter, WallMaterial,
    WallTriangle,
};
use crate::config::StudioConfig;
use crate::error::Result;
use crate::math::{Point3, Vector3};
use crate::mesh::{EdgeAdjacency, MeshModel, MeshReport};
use crate::picking::{PickHit, PickTriangle, Ray};
use crate::registry::{Appearance, Material, Rgb, SurfaceRegistry};
use crate::segmentation::{segment_mesh, FeatureEdges, Segmentation, SurfaceSummary};

/// One triangle as a renderer draws it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTriangle {
    pub vertices: [Point3; 3],
    pub normal: Vector3,
    pub surface: usize,
    pub appearance: Appearance,
}

/// Machine-readable overview of a loaded room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub report: MeshReport,
    pub feature_edges: usize,
    pub surfaces: Vec<SurfaceSummary>,
    /// `None` if the mesh does not enclose a volume.
    pub room_center: Option<RoomCenter>,
    /// Reason the room center is missing.
    pub room_center_error: Option<String>,
    pub walls: usize,
}

impl RoomSummary {
    /// Pretty-printed JSON form of the summary.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::Serialize`](crate::StudioError::Serialize) if
    /// a value cannot be represented in JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A loaded, segmented room mesh with its appearance and material state.
#[derive(Debug, Clone)]
pub struct RoomModel {
    config: StudioConfig,
    mesh: MeshModel,
    adjacency: EdgeAdjacency,
    feature_edges: FeatureEdges,
    segmentation: Arc<Segmentation>,
    registry: SurfaceRegistry,
    materials: MaterialTable,
}

impl RoomModel {
    /// Loads and segments a mesh file.
    ///
    /// Nothing is returned unless every step succeeds, so a failed reload
    /// never replaces a model the caller already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the mesh cannot be loaded.
    pub fn load(path: impl AsRef<Path>, config: &StudioConfig) -> Result<Self> {
        config.validate()?;
        let mesh = MeshModel::load(path, &config.mesh)?;
        Self::from_mesh(mesh, config)
    }

    /// Segments an already built mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub fn from_mesh(mesh: MeshModel, config: &StudioConfig) -> Result<Self> {
        config.validate()?;
        let adjacency = mesh.adjacency();
        let (feature_edges, segmentation) = segment_mesh(&mesh, &adjacency, &config.segmentation);
        let segmentation = Arc::new(segmentation);
        let registry = SurfaceRegistry::new(Arc::clone(&segmentation));

        let report = MeshReport::new(&mesh, &adjacency);
        info!(
            "Room ready: {} surfaces, watertight: {}",
            segmentation.len(),
            report.is_watertight
        );

        Ok(Self {
            config: config.clone(),
            materials: MaterialTable::new(config.export.default_material),
            mesh,
            adjacency,
            feature_edges,
            segmentation,
            registry,
        })
    }

    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    #[must_use]
    pub fn mesh(&self) -> &MeshModel {
        &self.mesh
    }

    #[must_use]
    pub fn adjacency(&self) -> &EdgeAdjacency {
        &self.adjacency
    }

    #[must_use]
    pub fn feature_edges(&self) -> &FeatureEdges {
        &self.feature_edges
    }

    /// Endpoints of every feature edge, for outline drawing.
    #[must_use]
    pub fn feature_edge_segments(&self) -> Vec<[Point3; 2]> {
        self.feature_edges.segments(&self.mesh)
    }

    #[must_use]
    pub fn segmentation(&self) -> &Segmentation {
        &self.segmentation
    }

    /// Surface index per triangle.
    #[must_use]
    pub fn triangle_to_surface(&self) -> &[usize] {
        self.segmentation.triangle_to_surface()
    }

    #[must_use]
    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SurfaceRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Assigns an acoustic material to a surface.
    ///
    /// # Errors
    ///
    /// Returns an error if `surface` does not exist.
    pub fn set_wall_material(&mut self, surface: usize, material: WallMaterial) -> Result<()> {
        // Validates the index against the same surface count as the registry.
        self.registry.material_of(surface)?;
        self.materials.set(surface, material);
        Ok(())
    }

    /// Topology report of the mesh.
    #[must_use]
    pub fn report(&self) -> MeshReport {
        MeshReport::new(&self.mesh, &self.adjacency)
    }

    /// Nearest triangle along `ray`.
    #[must_use]
    pub fn pick(&self, ray: Ray) -> Option<PickHit> {
        PickTriangle::new(ray)
            .with_params(self.config.picking)
            .execute(&self.mesh)
    }

    /// Colors the surface under `ray` and returns its index.
    ///
    /// # Errors
    ///
    /// Only fails if the registry and segmentation disagree, which cannot
    /// happen for a registry built by this model.
    pub fn highlight_at(&mut self, ray: Ray, color: Rgb) -> Result<Option<usize>> {
        let Some(surface) = self.surface_at(ray) else {
            return Ok(None);
        };
        self.registry.set_color(surface, color)?;
        Ok(Some(surface))
    }

    /// Marks the surface under `ray` as textured and returns its index.
    ///
    /// # Errors
    ///
    /// See [`RoomModel::highlight_at`].
    pub fn apply_texture_at(&mut self, ray: Ray) -> Result<Option<usize>> {
        let Some(surface) = self.surface_at(ray) else {
            return Ok(None);
        };
        self.registry.set_material(surface, Material::Textured)?;
        Ok(Some(surface))
    }

    fn surface_at(&self, ray: Ray) -> Option<usize> {
        let hit = self.pick(ray)?;
        self.segmentation.surface_of(hit.triangle)
    }

    /// Volumetric center and volume of the room in model units.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is not closed or encloses no volume.
    pub fn room_center(&self) -> Result<RoomCenter> {
        Ok(VolumetricCenter::new().execute(&self.mesh, &self.adjacency)?)
    }

    /// Walls scaled by the configured scale factor.
    ///
    /// # Errors
    ///
    /// See [`BuildWalls::execute`].
    pub fn walls(&self) -> Result<Vec<WallTriangle>> {
        self.walls_scaled(self.config.export.scale_factor)
    }

    /// Walls scaled by `scale_factor`.
    ///
    /// # Errors
    ///
    /// See [`BuildWalls::execute`].
    pub fn walls_scaled(&self, scale_factor: f64) -> Result<Vec<WallTriangle>> {
        Ok(BuildWalls::new(&self.segmentation, scale_factor)
            .with_materials(&self.materials)
            .execute(&self.mesh)?)
    }

    /// Starts a simulation scene in simulation units: scaled walls and the
    /// scaled room center, with the configured acoustic settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the room is not closed or no walls can be built.
    pub fn scene_builder(&self) -> Result<RoomSceneBuilder> {
        let scale = self.config.export.scale_factor;
        let center = self.room_center()?;
        let walls = self.walls_scaled(scale)?;
        Ok(RoomSceneBuilder::new(
            walls,
            Point3::from(center.center.coords * scale),
            self.config.acoustics,
        ))
    }

    /// Every triangle with the appearance of its surface.
    #[must_use]
    pub fn render_triangles(&self) -> Vec<RenderTriangle> {
        let styles: Vec<Appearance> = self
            .registry
            .iter()
            .map(|(_, style)| style.appearance())
            .collect();
        self.segmentation
            .triangle_to_surface()
            .iter()
            .enumerate()
            .map(|(triangle, &surface)| RenderTriangle {
                vertices: self.mesh.triangle(triangle),
                normal: self.mesh.normal(triangle),
                surface,
                appearance: styles[surface],
            })
            .collect()
    }

    /// Report, surfaces, room center and wall count in one structure.
    #[must_use]
    pub fn summary(&self) -> RoomSummary {
        let (room_center, room_center_error) = match self.room_center() {
            Ok(center) => (Some(center), None),
            Err(e) => (None, Some(e.to_string())),
        };
        RoomSummary {
            report: self.report(),
            feature_edges: self.feature_edges.len(),
            surfaces: self.segmentation.summaries(&self.mesh),
            room_center,
            room_center_error,
            walls: self.walls().map_or(0, |walls| walls.len()),
        }
    }
}
