use rustc_hash::FxHashMap;

use super::Surface;
use crate::mesh::adjacency::face_edges;
use crate::mesh::{EdgeKey, MeshModel};

/// Outline of a surface as ordered loops of welded vertex ids.
///
/// An edge is on the outline when exactly one triangle of the surface uses
/// it. Loops follow the triangle winding and do not repeat their first
/// vertex. A closed surface (for example a whole cube) has no loops. If the
/// outline is not a set of simple cycles, the unclosed remainder is returned
/// as an open chain.
#[must_use]
pub fn surface_boundary_loops(surface: &Surface, mesh: &MeshModel) -> Vec<Vec<u32>> {
    let mut counts: FxHashMap<EdgeKey, usize> = FxHashMap::default();
    for &t in surface.triangles() {
        for edge in face_edges(mesh.triangle_vertex_ids(t)) {
            if !edge.is_degenerate() {
                *counts.entry(edge).or_default() += 1;
            }
        }
    }

    let mut directed = Vec::new();
    for &t in surface.triangles() {
        let [a, b, c] = mesh.triangle_vertex_ids(t);
        for (from, to) in [(a, b), (b, c), (c, a)] {
            if from != to && counts.get(&EdgeKey::new(from, to)) == Some(&1) {
                directed.push((from, to));
            }
        }
    }
    directed.sort_unstable();

    let mut outgoing: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
    for (i, &(from, _)) in directed.iter().enumerate() {
        outgoing.entry(from).or_default().push(i);
    }

    let mut used = vec![false; directed.len()];
    let mut loops = Vec::new();
    for start in 0..directed.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (origin, mut next) = directed[start];
        let mut vertices = vec![origin];
        while next != origin {
            vertices.push(next);
            let Some(i) = outgoing
                .get(&next)
                .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]))
            else {
                break;
            };
            used[i] = true;
            next = directed[i].1;
        }
        loops.push(vertices);
    }
    loops
}
