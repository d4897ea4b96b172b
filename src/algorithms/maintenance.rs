//! Bulk maintenance passes.
//!
//! Every routine materializes its work set before the first mutation, since
//! collapsing or removing invalidates ids the enumeration would otherwise
//! still hand out.

use glam::Vec3;
use tracing::warn;

use crate::model::{CollapseOption, EdgeId, VertexId};
use crate::SkeletalGraph;

impl SkeletalGraph {
    /// Collapses (at the midpoint) every edge whose curve arc length is below
    /// `min_length`, leaving alone edges that are a lone segment (both
    /// endpoints of degree 1). Returns how many edges were collapsed.
    pub fn collapse_edges_shorter_than(&mut self, min_length: f32) -> usize {
        let targets: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|(_, entry)| {
                entry.props.curve.length() < min_length
                    && !(self.degree(entry.source) == 1 && self.degree(entry.target) == 1)
            })
            .map(|(id, _)| id)
            .collect();
        self.collapse_all(&targets)
    }

    /// Collapses (at the midpoint) every edge with fewer than `n` curve
    /// samples, with the same lone-segment exception. Returns how many edges
    /// were collapsed.
    pub fn collapse_edges_with_less_than_n_splines(&mut self, n: usize) -> usize {
        let targets: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|(_, entry)| {
                entry.props.curve.len() < n
                    && !(self.degree(entry.source) == 1 && self.degree(entry.target) == 1)
            })
            .map(|(id, _)| id)
            .collect();
        self.collapse_all(&targets)
    }

    /// Collapses every edge that carries only its two endpoint samples.
    pub fn collapse_simple_edges(&mut self) -> usize {
        self.collapse_edges_with_less_than_n_splines(3)
    }

    fn collapse_all(&mut self, targets: &[EdgeId]) -> usize {
        let mut collapsed = 0;
        for &edge in targets {
            if !self.contains_edge(edge) {
                // consumed by an earlier collapse in this pass
                continue;
            }
            match self.collapse_edge(edge, CollapseOption::Midpoint) {
                Ok(_) => collapsed += 1,
                Err(error) => warn!("skipping edge collapse: {error}"),
            }
        }
        collapsed
    }

    /// Removes every vertex of total degree `k`. Returns how many were
    /// removed.
    pub fn remove_vertices_of_degree(&mut self, k: usize) -> usize {
        let targets: Vec<VertexId> = self
            .vertex_ids()
            .filter(|&vertex| self.degree(vertex) == k)
            .collect();
        let mut removed = 0;
        for vertex in targets {
            // removing a neighbor may have changed this vertex's degree
            if self.contains_vertex(vertex) && self.degree(vertex) == k {
                self.remove_vertex(vertex);
                removed += 1;
            }
        }
        removed
    }

    /// Translates then scales every vertex position and every curve sample:
    /// `p := (p + offset) * factor`. Tangents are refreshed per curve.
    pub fn move_and_scale(&mut self, offset: Vec3, factor: f32) {
        for entry in self.vertices.values_mut() {
            entry.props.position = (entry.props.position + offset) * factor;
        }
        for entry in self.edges.values_mut() {
            let curve = &mut entry.props.curve;
            for i in 0..curve.len() {
                curve[i].position = (curve[i].position + offset) * factor;
            }
            curve.update_tangents();
        }
    }
}
