use std::collections::VecDeque;

use tracing::debug;

use super::{FeatureEdges, Segmentation, Surface};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::mesh::adjacency::face_edges;
use crate::mesh::{EdgeAdjacency, MeshModel};

enum Rule<'a> {
    FeatureEdges(&'a FeatureEdges),
    Coplanar { tolerance: f64 },
}

/// Partitions the mesh triangles into connected surfaces.
///
/// Runs a breadth-first flood fill from every unvisited triangle in index
/// order. Each triangle is marked visited when first enqueued, so it is
/// assigned to exactly one surface.
pub struct SegmentSurfaces<'a> {
    rule: Rule<'a>,
}

impl<'a> SegmentSurfaces<'a> {
    /// Two triangles are connected iff they share an edge that is not in
    /// `feature_edges`.
    #[must_use]
    pub fn new(feature_edges: &'a FeatureEdges) -> Self {
        Self {
            rule: Rule::FeatureEdges(feature_edges),
        }
    }

    /// Grows each surface from its seed triangle, crossing shared edges into
    /// neighbours whose three corners lie within `tolerance` of the seed
    /// plane. A seed with a degenerate normal forms a surface on its own.
    #[must_use]
    pub fn coplanar(tolerance: f64) -> Self {
        Self {
            rule: Rule::Coplanar { tolerance },
        }
    }

    /// Executes the segmentation.
    #[must_use]
    pub fn execute(&self, mesh: &MeshModel, adjacency: &EdgeAdjacency) -> Segmentation {
        let n = mesh.triangle_count();
        let mut visited = vec![false; n];
        let mut surfaces = Vec::new();
        let mut queue = VecDeque::new();

        for seed in 0..n {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            queue.push_back(seed);

            let plane = SeedPlane::of(mesh, seed);
            let mut members = Vec::new();

            while let Some(current) = queue.pop_front() {
                members.push(current);
                for edge in face_edges(mesh.triangle_vertex_ids(current)) {
                    if edge.is_degenerate() {
                        continue;
                    }
                    if let Rule::FeatureEdges(features) = self.rule {
                        if features.contains(edge) {
                            continue;
                        }
                    }
                    for &neighbor in adjacency.triangles_of(edge) {
                        let neighbor = neighbor as usize;
                        if visited[neighbor] || !self.accepts(mesh, plane.as_ref(), neighbor) {
                            continue;
                        }
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }

            surfaces.push(Surface::new(members));
        }

        debug!("Flood fill produced {} surfaces from {} triangles", surfaces.len(), n);

        Segmentation::from_surfaces(surfaces, n)
    }

    fn accepts(&self, mesh: &MeshModel, plane: Option<&SeedPlane>, triangle: usize) -> bool {
        match self.rule {
            Rule::FeatureEdges(_) => true,
            Rule::Coplanar { tolerance } => plane.is_some_and(|plane| {
                mesh.triangle(triangle)
                    .iter()
                    .all(|corner| plane.distance(corner) <= tolerance)
            }),
        }
    }
}

struct SeedPlane {
    origin: Point3,
    normal: Vector3,
}

impl SeedPlane {
    fn of(mesh: &MeshModel, seed: usize) -> Option<Self> {
        let normal = mesh.normal(seed);
        (normal.norm() > TOLERANCE).then(|| Self {
            origin: mesh.triangle(seed)[0],
            normal,
        })
    }

    fn distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal).abs()
    }
}
