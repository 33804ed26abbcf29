use rustc_hash::FxHashSet;
use tracing::debug;

use crate::math::{angle_between, Point3};
use crate::mesh::{EdgeAdjacency, EdgeKey, MeshModel};

/// The set of edges that bound surfaces.
#[derive(Debug, Clone, Default)]
pub struct FeatureEdges {
    edges: FxHashSet<EdgeKey>,
}

impl FeatureEdges {
    /// Returns `true` if `edge` is a feature edge.
    #[must_use]
    pub fn contains(&self, edge: EdgeKey) -> bool {
        self.edges.contains(&edge)
    }

    /// Number of feature edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if there are no feature edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterates the feature edges in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.iter().copied()
    }

    /// Endpoint positions of every feature edge, sorted by vertex ids.
    #[must_use]
    pub fn segments(&self, mesh: &MeshModel) -> Vec<[Point3; 2]> {
        let mut edges: Vec<EdgeKey> = self.edges.iter().copied().collect();
        edges.sort_unstable();
        edges
            .into_iter()
            .map(|edge| {
                let (a, b) = edge.vertices();
                [mesh.vertex(a), mesh.vertex(b)]
            })
            .collect()
    }
}

/// Detects boundary, crease and non-manifold edges.
///
/// - An edge used by one triangle is a mesh boundary and always a feature.
/// - An edge used by two triangles is a feature iff the angle between their
///   normals is strictly greater than the threshold, or either normal is
///   degenerate.
/// - An edge used by more than two triangles (non-manifold) is a feature.
pub struct ComputeFeatureEdges {
    threshold_radians: f64,
}

impl ComputeFeatureEdges {
    /// Creates a new `ComputeFeatureEdges` operation.
    #[must_use]
    pub fn new(angle_threshold_degrees: f64) -> Self {
        Self {
            threshold_radians: angle_threshold_degrees.to_radians(),
        }
    }

    /// Executes the detection over every edge of `adjacency`.
    #[must_use]
    pub fn execute(&self, mesh: &MeshModel, adjacency: &EdgeAdjacency) -> FeatureEdges {
        let mut edges = FxHashSet::default();
        let (mut boundary, mut crease, mut non_manifold) = (0usize, 0usize, 0usize);

        for (edge, tris) in adjacency.iter() {
            let is_feature = match *tris {
                [_] => {
                    boundary += 1;
                    true
                }
                [a, b] => {
                    let n1 = mesh.normal(a as usize);
                    let n2 = mesh.normal(b as usize);
                    let sharp = angle_between(&n1, &n2)
                        .map_or(true, |angle| angle > self.threshold_radians);
                    if sharp {
                        crease += 1;
                    }
                    sharp
                }
                _ => {
                    non_manifold += 1;
                    true
                }
            };
            if is_feature {
                edges.insert(edge);
            }
        }

        debug!(
            "Feature edges: {} boundary, {} crease, {} non-manifold",
            boundary, crease, non_manifold
        );

        FeatureEdges { edges }
    }
}
