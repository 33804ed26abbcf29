//! Edge → triangle adjacency and mesh validity report.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::MeshModel;

/// An undirected edge between two welded vertices, stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(u32, u32);

impl EdgeKey {
    /// Canonicalizes the vertex pair so `new(a, b) == new(b, a)`.
    #[must_use]
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Vertex ids of the edge, smaller id first.
    #[must_use]
    pub fn vertices(self) -> (u32, u32) {
        (self.0, self.1)
    }

    /// Returns `true` if both ends are the same vertex (a collapsed edge).
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.0 == self.1
    }
}

/// The three edges of a face in winding order `(v0,v1)`, `(v1,v2)`, `(v2,v0)`.
#[must_use]
pub fn face_edges(face: [u32; 3]) -> [EdgeKey; 3] {
    [
        EdgeKey::new(face[0], face[1]),
        EdgeKey::new(face[1], face[2]),
        EdgeKey::new(face[2], face[0]),
    ]
}

/// Maps every edge to the triangles that use it.
///
/// Collapsed edges (both ends on the same welded vertex) are not recorded.
#[derive(Debug, Clone, Default)]
pub struct EdgeAdjacency {
    edge_to_triangles: FxHashMap<EdgeKey, Vec<u32>>,
}

impl EdgeAdjacency {
    /// Builds the adjacency from welded faces.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_triangles: FxHashMap<EdgeKey, Vec<u32>> = FxHashMap::default();
        for (tri, &face) in faces.iter().enumerate() {
            for edge in face_edges(face) {
                if edge.is_degenerate() {
                    continue;
                }
                let list = edge_to_triangles.entry(edge).or_default();
                // Faces are bounded to the u32 range by `MeshModel`.
                let tri = tri as u32;
                if list.last() != Some(&tri) {
                    list.push(tri);
                }
            }
        }
        Self { edge_to_triangles }
    }

    /// Triangles sharing `edge`, in ascending index order.
    #[must_use]
    pub fn triangles_of(&self, edge: EdgeKey) -> &[u32] {
        self.edge_to_triangles
            .get(&edge)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates all edges with their adjacent triangles.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeKey, &[u32])> + '_ {
        self.edge_to_triangles
            .iter()
            .map(|(&edge, tris)| (edge, tris.as_slice()))
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_triangles.len()
    }

    /// Edges with exactly one adjacent triangle.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.iter()
            .filter(|(_, tris)| tris.len() == 1)
            .map(|(edge, _)| edge)
    }

    /// Edges with more than two adjacent triangles.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.iter()
            .filter(|(_, tris)| tris.len() > 2)
            .map(|(edge, _)| edge)
    }

    /// Number of boundary edges.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Number of non-manifold edges.
    #[must_use]
    pub fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges().count()
    }

    /// A closed mesh has no boundary edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.edge_to_triangles.values().all(|tris| tris.len() >= 2)
    }

    /// A manifold mesh has at most two triangles per edge.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.edge_to_triangles.values().all(|tris| tris.len() <= 2)
    }
}

/// Summary of the topological health of a mesh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshReport {
    pub triangles: usize,
    pub vertices: usize,
    pub edges: usize,
    pub boundary_edges: usize,
    pub non_manifold_edges: usize,
    /// Triangles whose corners collapse onto fewer than three welded vertices.
    pub degenerate_triangles: usize,
    pub is_watertight: bool,
    pub is_manifold: bool,
}

impl MeshReport {
    /// Collects the report for `mesh` using a prebuilt adjacency.
    #[must_use]
    pub fn new(mesh: &MeshModel, adjacency: &EdgeAdjacency) -> Self {
        let degenerate_triangles = mesh
            .faces()
            .iter()
            .filter(|f| f[0] == f[1] || f[1] == f[2] || f[0] == f[2])
            .count();
        Self {
            triangles: mesh.triangle_count(),
            vertices: mesh.vertex_count(),
            edges: adjacency.edge_count(),
            boundary_edges: adjacency.boundary_edge_count(),
            non_manifold_edges: adjacency.non_manifold_edge_count(),
            degenerate_triangles,
            is_watertight: adjacency.is_watertight(),
            is_manifold: adjacency.is_manifold(),
        }
    }
}

impl fmt::Display for MeshReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} triangles, {} vertices, {} edges",
            self.triangles, self.vertices, self.edges
        )?;
        writeln!(
            f,
            "watertight: {} ({} boundary edges)",
            self.is_watertight, self.boundary_edges
        )?;
        writeln!(
            f,
            "manifold: {} ({} non-manifold edges)",
            self.is_manifold, self.non_manifold_edges
        )?;
        write!(f, "degenerate triangles: {}", self.degenerate_triangles)
    }
}
