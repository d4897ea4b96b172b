//! Editable skeletal graph engine.
//!
//! A [`SkeletalGraph`] is a directed multigraph whose vertices are 3D points
//! with radii and whose edges carry deformable polyline curves describing the
//! shape of the link between their endpoints. On top of the plain topology
//! store it offers geometry-aware rewrite operations (split, cut, collapse,
//! merge, join-along-path) that keep the embedded curves continuous across
//! topology changes, plus the graph algorithms they lean on (BFS shortest
//! path, cycle detection over a spanning tree, connected components) and a
//! tagged-line file format.
//!
//! Identifiers are generational slotmap keys: they stay valid exactly as long
//! as the entity they name exists. Rewrite operations report what they added
//! and removed so callers can reconcile derived state.

pub mod error;
pub mod model;

pub mod geometry {
    pub mod curve;
    pub mod deform;
    pub mod tolerance;
}

pub mod algorithms {
    pub mod components;
    pub mod cycles;
    pub mod maintenance;
    pub mod paths;
    pub mod rewrite;
}

mod skl;

use std::fmt;

use glam::Vec3;
use slotmap::SlotMap;

use crate::geometry::curve::Curve;
use crate::model::{
    EdgeId, EdgeLookup, EdgeProperties, VertexId, VertexProperties,
};

#[derive(Clone, Debug)]
pub(crate) struct VertexEntry {
    pub(crate) props: VertexProperties,
    pub(crate) in_edges: Vec<EdgeId>,
    pub(crate) out_edges: Vec<EdgeId>,
}

#[derive(Clone, Debug)]
pub(crate) struct EdgeEntry {
    pub(crate) source: VertexId,
    pub(crate) target: VertexId,
    pub(crate) props: EdgeProperties,
}

/// A directed multigraph of positioned, radius-carrying vertices connected by
/// deformable spline curves.
#[derive(Clone, Debug, Default)]
pub struct SkeletalGraph {
    pub(crate) vertices: SlotMap<VertexId, VertexEntry>,
    pub(crate) edges: SlotMap<EdgeId, EdgeEntry>,
    pub(crate) edge_spline_count: usize,
}

impl SkeletalGraph {
    pub fn new() -> Self {
        SkeletalGraph::default()
    }

    // ---- size getters ----

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Total number of curve samples over all edges.
    pub fn edge_spline_count(&self) -> usize {
        self.edge_spline_count
    }

    // ---- vertices ----

    pub fn add_vertex(&mut self, props: VertexProperties) -> VertexId {
        self.vertices.insert(VertexEntry {
            props,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        })
    }

    pub fn add_vertex_at(&mut self, position: Vec3) -> VertexId {
        self.add_vertex(VertexProperties::at(position))
    }

    pub fn get_vertex(&self, vertex: VertexId) -> Option<&VertexProperties> {
        self.vertices.get(vertex).map(|entry| &entry.props)
    }

    pub fn get_vertex_mut(&mut self, vertex: VertexId) -> Option<&mut VertexProperties> {
        self.vertices.get_mut(vertex).map(|entry| &mut entry.props)
    }

    pub fn contains_vertex(&self, vertex: VertexId) -> bool {
        self.vertices.contains_key(vertex)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &VertexProperties)> {
        self.vertices.iter().map(|(id, entry)| (id, &entry.props))
    }

    /// Removes all edges incident to `vertex`, then the vertex itself.
    /// Returns the removed edge ids; empty for a stale descriptor.
    pub fn remove_vertex(&mut self, vertex: VertexId) -> Vec<EdgeId> {
        if !self.vertices.contains_key(vertex) {
            return Vec::new();
        }
        let removed = self.clear_vertex(vertex);
        self.vertices.remove(vertex);
        removed
    }

    /// Removes all edges incident to `vertex` but keeps the vertex.
    pub fn clear_vertex(&mut self, vertex: VertexId) -> Vec<EdgeId> {
        let Some(entry) = self.vertices.get(vertex) else {
            return Vec::new();
        };
        let incident: Vec<EdgeId> = entry
            .in_edges
            .iter()
            .chain(entry.out_edges.iter())
            .copied()
            .collect();
        let mut removed = Vec::new();
        for edge in incident {
            // a self-loop shows up in both rings; the second take is a no-op
            if let Some(removed_entry) = self.edges.remove(edge) {
                self.edge_spline_count -= removed_entry.props.curve.len();
                self.unlink(edge, removed_entry.source, removed_entry.target);
                removed.push(edge);
            }
        }
        removed
    }

    fn unlink(&mut self, edge: EdgeId, source: VertexId, target: VertexId) {
        if let Some(entry) = self.vertices.get_mut(source) {
            entry.out_edges.retain(|&e| e != edge);
        }
        if let Some(entry) = self.vertices.get_mut(target) {
            entry.in_edges.retain(|&e| e != edge);
        }
    }

    // ---- edges ----

    /// Adds an edge carrying `props`. Returns `None` when either endpoint is
    /// stale. The edge's cycle mark is derived from both endpoints' marks.
    pub fn add_edge_with(
        &mut self,
        from: VertexId,
        to: VertexId,
        props: EdgeProperties,
    ) -> Option<EdgeId> {
        if !self.vertices.contains_key(from) || !self.vertices.contains_key(to) {
            return None;
        }
        let mut props = props;
        props.in_cycle = self.vertices[from].props.in_cycle && self.vertices[to].props.in_cycle;
        self.edge_spline_count += props.curve.len();
        let edge = self.edges.insert(EdgeEntry {
            source: from,
            target: to,
            props,
        });
        self.vertices[from].out_edges.push(edge);
        self.vertices[to].in_edges.push(edge);
        Some(edge)
    }

    /// Adds an edge with a straight two-sample curve between the endpoint
    /// positions.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        let position_from = self.get_vertex(from)?.position;
        let position_to = self.get_vertex(to)?.position;
        self.add_edge_with(
            from,
            to,
            EdgeProperties::from(Curve::straight(position_from, position_to)),
        )
    }

    /// Removes `edge`. Endpoints whose degree was 1 before the removal (so
    /// they end up isolated) are removed as well and reported; this
    /// auto-removal is suppressed while the graph has exactly one vertex so
    /// it can never end up empty.
    pub fn remove_edge(&mut self, edge: EdgeId) -> (Option<VertexId>, Option<VertexId>) {
        let Some(entry) = self.edges.get(edge) else {
            return (None, None);
        };
        let source = entry.source;
        let target = entry.target;
        let remove_source = source != target && self.degree(source) == 1;
        let remove_target = source != target && self.degree(target) == 1;

        if let Some(removed_entry) = self.edges.remove(edge) {
            self.edge_spline_count -= removed_entry.props.curve.len();
        }
        self.unlink(edge, source, target);

        let mut removed = (None, None);
        if remove_source && self.vertex_count() != 1 {
            self.vertices.remove(source);
            removed.0 = Some(source);
        }
        if remove_target && self.vertex_count() != 1 {
            self.vertices.remove(target);
            removed.1 = Some(target);
        }
        removed
    }

    pub fn get_edge(&self, edge: EdgeId) -> Option<&EdgeProperties> {
        self.edges.get(edge).map(|entry| &entry.props)
    }

    pub fn get_edge_mut(&mut self, edge: EdgeId) -> Option<&mut EdgeProperties> {
        self.edges.get_mut(edge).map(|entry| &mut entry.props)
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains_key(edge)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeProperties)> {
        self.edges.iter().map(|(id, entry)| (id, &entry.props))
    }

    pub fn source(&self, edge: EdgeId) -> Option<VertexId> {
        self.edges.get(edge).map(|entry| entry.source)
    }

    pub fn target(&self, edge: EdgeId) -> Option<VertexId> {
        self.edges.get(edge).map(|entry| entry.target)
    }

    pub fn endpoints(&self, edge: EdgeId) -> Option<(VertexId, VertexId)> {
        self.edges.get(edge).map(|entry| (entry.source, entry.target))
    }

    pub(crate) fn in_edges(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertices
            .get(vertex)
            .map(|entry| entry.in_edges.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn out_edges(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertices
            .get(vertex)
            .map(|entry| entry.out_edges.as_slice())
            .unwrap_or(&[])
    }

    pub fn in_degree(&self, vertex: VertexId) -> usize {
        self.in_edges(vertex).len()
    }

    pub fn out_degree(&self, vertex: VertexId) -> usize {
        self.out_edges(vertex).len()
    }

    /// Total degree; self-loops count twice.
    pub fn degree(&self, vertex: VertexId) -> usize {
        self.in_degree(vertex) + self.out_degree(vertex)
    }

    /// Reports the edges between `from` and `to` in either direction.
    pub fn edge_exists(&self, from: VertexId, to: VertexId) -> EdgeLookup {
        let mut lookup = EdgeLookup::default();
        if !self.vertices.contains_key(from) || !self.vertices.contains_key(to) {
            return lookup;
        }
        for &edge in self.out_edges(to) {
            if self.edges[edge].target == from {
                lookup.edges.push(edge);
                lookup.found = true;
                lookup.forward = false;
            }
        }
        for &edge in self.out_edges(from) {
            if self.edges[edge].target == to {
                lookup.edges.push(edge);
                lookup.found = true;
                lookup.forward = true;
            }
        }
        lookup
    }

    /// First edge directed `from -> to`, if any.
    pub(crate) fn edge_from_to(&self, from: VertexId, to: VertexId) -> Option<EdgeId> {
        self.out_edges(from)
            .iter()
            .copied()
            .find(|&edge| self.edges[edge].target == to)
    }

    /// First edge between `a` and `b` in either direction.
    pub(crate) fn first_edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_from_to(a, b).or_else(|| self.edge_from_to(b, a))
    }

    pub fn is_edge_source_or_target(&self, edge: EdgeId, vertex: VertexId) -> bool {
        self.endpoints(edge)
            .map(|(source, target)| source == vertex || target == vertex)
            .unwrap_or(false)
    }

    /// The vertex of `edge` that is not shared with `adjacent_edge`, or
    /// `None` when the edges are not adjacent.
    pub fn find_vertex_not_connected_to_adjacent_edge(
        &self,
        edge: EdgeId,
        adjacent_edge: EdgeId,
    ) -> Option<VertexId> {
        let (source, target) = self.endpoints(edge)?;
        let (adjacent_source, adjacent_target) = self.endpoints(adjacent_edge)?;
        if source == adjacent_source || source == adjacent_target {
            Some(target)
        } else if target == adjacent_source || target == adjacent_target {
            Some(source)
        } else {
            None
        }
    }

    /// Whether the edge's curve holds only its two endpoint samples.
    pub fn is_simple_edge(&self, edge: EdgeId) -> bool {
        self.get_edge(edge)
            .map(|props| props.curve.len() <= 2)
            .unwrap_or(false)
    }

    /// Radius of the curve at `segment_index`, interpolated between the
    /// harmonic mean of the endpoint radii at the source and the target's
    /// radius at the other end.
    pub fn get_edge_radius(&self, edge: EdgeId, segment_index: usize) -> Option<f32> {
        let entry = self.edges.get(edge)?;
        let r1 = self.get_vertex(entry.source)?.radius;
        let r2 = self.get_vertex(entry.target)?.radius;
        let r_start = (2.0 * r1 * r2) / (r1 + r2);
        let r_end = r2;
        let len = entry.props.curve.len();
        let index = segment_index.min(len - 1);
        Some((1.0 - index as f32 / (len as f32 - 1.0)) * (r_start - r_end) + r_end)
    }

    /// Fast-path deformation of a single curve sample towards a target.
    /// Returns `false` when the deformer declines (stale edge, out-of-range
    /// index, or too much distortion); the curve is untouched in that case.
    pub fn deform_edge(&mut self, edge: EdgeId, point_index: usize, target: Vec3) -> bool {
        let Some(entry) = self.edges.get_mut(edge) else {
            return false;
        };
        geometry::deform::deform_curve(&mut entry.props.curve, point_index, target)
    }

    /// Re-anchors the curve's deformation reference to its current shape.
    pub fn fix_curve_shape(&mut self, edge: EdgeId) -> bool {
        let Some(entry) = self.edges.get_mut(edge) else {
            return false;
        };
        entry.props.curve.set_original_shape();
        true
    }
}

impl fmt::Display for SkeletalGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "skeletal graph with {} vertices and {} edges:",
            self.vertex_count(),
            self.edge_count()
        )?;
        let mut index_of = std::collections::HashMap::new();
        writeln!(f, "------ vertices ------")?;
        for (i, (id, props)) in self.vertices().enumerate() {
            index_of.insert(id, i);
            writeln!(
                f,
                "{i} : ({:.4} {:.4} {:.4}), radius {:.4}, in cycle: {}",
                props.position.x, props.position.y, props.position.z, props.radius, props.in_cycle
            )?;
        }
        writeln!(f, "------- edges -------")?;
        for (i, (id, props)) in self.edges().enumerate() {
            let Some((source, target)) = self.endpoints(id) else {
                continue;
            };
            let (Some(source), Some(target)) = (index_of.get(&source), index_of.get(&target))
            else {
                continue;
            };
            writeln!(
                f,
                "{i} : {source} -> {target} ({} samples, in cycle: {})",
                props.curve.len(),
                props.in_cycle
            )?;
        }
        Ok(())
    }
}
