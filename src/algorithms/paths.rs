//! Shortest paths over the undirected underlying graph, and the join
//! operation built on top of them.

use std::collections::VecDeque;

use tracing::warn;

use crate::error::GraphError;
use crate::geometry::curve::Curve;
use crate::model::{EdgeId, EdgeProperties, GraphDiff, VertexId, UNREACHED};
use crate::SkeletalGraph;

impl SkeletalGraph {
    fn clear_path_marks(&mut self) {
        for entry in self.vertices.values_mut() {
            entry.props.bfs_cost = UNREACHED;
            entry.props.bfs_parent = None;
        }
    }

    /// Undirected neighbors of `vertex` (in-edge sources, then out-edge
    /// targets), materialized so the caller can keep mutating marks.
    fn neighbors(&self, vertex: VertexId) -> Vec<VertexId> {
        let mut neighbors: Vec<VertexId> = self
            .in_edges(vertex)
            .iter()
            .map(|&edge| self.edges[edge].source)
            .collect();
        neighbors.extend(self.out_edges(vertex).iter().map(|&edge| self.edges[edge].target));
        neighbors
    }

    /// BFS shortest path over the undirected underlying graph, returned as
    /// the list of vertices from `from` to `to` inclusive.
    ///
    /// The search is rooted at `to` so back-tracking the parent chain from
    /// `from` yields the path in the right order. Iterations are capped at
    /// `2 * vertex_count()` as a guard against stale marks; the BFS marks are
    /// cleared on entry and exit either way.
    pub fn shortest_path(
        &mut self,
        from: VertexId,
        to: VertexId,
    ) -> Result<Vec<VertexId>, GraphError> {
        if !self.contains_vertex(from) || !self.contains_vertex(to) {
            return Err(GraphError::InvalidArgument("stale vertex descriptor"));
        }
        if from == to {
            return Ok(vec![from]);
        }

        self.clear_path_marks();

        let cap = 2 * self.vertex_count();
        let mut iterations = 0usize;
        let mut found = false;

        let mut queue = VecDeque::new();
        queue.push_back(to);
        self.vertices[to].props.bfs_cost = 0;

        while let Some(current) = queue.pop_front() {
            if iterations >= cap {
                warn!("shortest-path search hit its iteration cap; marks may have been stale");
                break;
            }
            iterations += 1;
            let current_cost = self.vertices[current].props.bfs_cost;

            for neighbor in self.neighbors(current) {
                if self.vertices[current].props.bfs_parent == Some(neighbor) {
                    continue;
                }
                if self.vertices[neighbor].props.bfs_cost == UNREACHED {
                    queue.push_back(neighbor);
                }
                if self.vertices[neighbor].props.bfs_cost > current_cost + 1 {
                    self.vertices[neighbor].props.bfs_cost = current_cost + 1;
                    self.vertices[neighbor].props.bfs_parent = Some(current);
                    if neighbor == from {
                        found = true;
                    }
                }
            }
        }

        if !found {
            self.clear_path_marks();
            return Err(GraphError::NoPath);
        }

        let mut path = vec![from];
        let mut next_parent = self.vertices[from].props.bfs_parent;
        while let Some(parent) = next_parent {
            path.push(parent);
            next_parent = self.vertices[parent].props.bfs_parent;
        }

        self.clear_path_marks();
        Ok(path)
    }

    /// Shortest path between two edges: the best of the four paths between
    /// their endpoint combinations.
    pub fn shortest_path_between_edges(
        &mut self,
        source_edge: EdgeId,
        target_edge: EdgeId,
    ) -> Result<Vec<VertexId>, GraphError> {
        let (source_a, target_a) = self
            .endpoints(source_edge)
            .ok_or(GraphError::InvalidArgument("stale edge descriptor"))?;
        let (source_b, target_b) = self
            .endpoints(target_edge)
            .ok_or(GraphError::InvalidArgument("stale edge descriptor"))?;

        let mut shortest = self.shortest_path(source_a, source_b)?;
        for (a, b) in [(source_a, target_b), (target_a, source_b), (target_a, target_b)] {
            let candidate = self.shortest_path(a, b)?;
            if candidate.len() < shortest.len() {
                shortest = candidate;
            }
        }
        Ok(shortest)
    }

    /// Concatenates the curves of the edges joined by the successive path
    /// vertices, orienting each hop curve to flow along the path and
    /// skipping the duplicated junction samples. `None` when the path is
    /// shorter than two vertices or some hop has no edge.
    pub fn convert_to_curve(&self, path: &[VertexId]) -> Option<Curve> {
        if path.len() < 2 {
            return None;
        }
        let first_edge = self.first_edge_between(path[0], path[1])?;
        let mut curve = if self.edges[first_edge].target == path[0] {
            self.edges[first_edge].props.curve.reversed()
        } else {
            self.edges[first_edge].props.curve.clone()
        };
        for hop in 1..path.len() - 1 {
            let next_edge = self.first_edge_between(path[hop], path[hop + 1])?;
            if self.edges[next_edge].target == path[hop] {
                curve.append(&self.edges[next_edge].props.curve.reversed(), 1);
            } else {
                curve.append(&self.edges[next_edge].props.curve, 1);
            }
        }
        Some(curve)
    }

    /// Joins `source_edge` and `target_edge` into one composite edge routed
    /// along the shortest path between them.
    ///
    /// The endpoint pair with the shortest connecting path decides the
    /// orientation. Both original curves are trimmed inward by `displacement`
    /// arc length and pseudo-elastically fitted to the trimmed junctions; the
    /// path's own curve forms the middle. The original edges and the path
    /// edges absorbed into the composite are removed, isolated vertices with
    /// them, and remaining path vertices of degree 2 are merged away.
    pub fn split_path(
        &mut self,
        source_edge: EdgeId,
        target_edge: EdgeId,
        displacement: f32,
    ) -> Result<GraphDiff, GraphError> {
        if source_edge == target_edge {
            return Err(GraphError::InvalidArgument("cannot join an edge to itself"));
        }
        let (source_a, target_a) = self
            .endpoints(source_edge)
            .ok_or(GraphError::InvalidArgument("stale edge descriptor"))?;
        let (source_b, target_b) = self
            .endpoints(target_edge)
            .ok_or(GraphError::InvalidArgument("stale edge descriptor"))?;

        let candidates = [
            (source_a, source_b),
            (source_a, target_b),
            (target_a, source_b),
            (target_a, target_b),
        ];
        let mut paths = Vec::with_capacity(4);
        for (a, b) in candidates {
            paths.push(self.shortest_path(a, b)?);
        }
        let mut best = 0;
        for (i, candidate) in paths.iter().enumerate() {
            if candidate.len() < paths[best].len() {
                best = i;
            }
        }
        let path = paths.swap_remove(best);

        // orient the two edge curves to flow source -> path -> target
        let source_curve = &self.edges[source_edge].props.curve;
        let target_curve = &self.edges[target_edge].props.curve;
        let (mut start, mut end, new_source, new_target) = match best {
            0 => (source_curve.reversed(), target_curve.clone(), target_a, target_b),
            1 => (source_curve.reversed(), target_curve.reversed(), target_a, source_b),
            2 => (source_curve.clone(), target_curve.clone(), source_a, target_b),
            _ => (source_curve.clone(), target_curve.reversed(), source_a, source_b),
        };

        // trim the start curve back by `displacement` arc length
        let mut first_junction = start.back().position;
        let mut travelled = 0.0f32;
        while start.len() > 2 && travelled < displacement {
            let segment = start.back().position.distance(start.before_back().position);
            let step = segment.min(displacement - travelled);
            first_junction += (start.before_back().position - start.back().position)
                .normalize_or_zero()
                * step;
            travelled += segment;
            start.pop_back();
        }
        start.pseudo_elastic_deform(false, first_junction, true);

        // and the end curve forward by the same amount
        let mut second_junction = end.front().position;
        travelled = 0.0;
        let mut trimmed = 0usize;
        while trimmed < end.len() - 2 && travelled < displacement {
            let segment = end[trimmed].position.distance(end[trimmed + 1].position);
            let step = segment.min(displacement - travelled);
            second_junction +=
                (end[trimmed + 1].position - end[trimmed].position).normalize_or_zero() * step;
            travelled += segment;
            trimmed += 1;
        }
        end.trim_front(trimmed);
        end.pseudo_elastic_deform(true, second_junction, true);

        // fit the path curve between the junctions; a trivial middle (a
        // two-sample hop or no hop at all) contributes nothing
        let middle = self.convert_to_curve(&path).filter(|curve| curve.len() > 2);
        let absorbed_path = middle.is_some();
        if let Some(mut middle) = middle {
            middle.pseudo_elastic_deform(true, first_junction, true);
            middle.pseudo_elastic_deform(false, second_junction, true);
            start.append(&middle, 1);
            start.pop_back();
        }
        start.append(&end, 0);
        start.update_tangents();

        let new_edge = self
            .add_edge_with(new_source, new_target, EdgeProperties::from(start))
            .ok_or(GraphError::Inconsistency("join produced stale endpoints"))?;

        let mut diff = GraphDiff::default();
        let mut doomed = vec![source_edge, target_edge];
        if absorbed_path {
            // the path geometry now lives inside the composite edge
            for hop in path.windows(2) {
                if let Some(edge) = self.first_edge_between(hop[0], hop[1]) {
                    if !doomed.contains(&edge) {
                        doomed.push(edge);
                    }
                }
            }
        }
        for edge in doomed {
            let (removed_source, removed_target) = self.remove_edge(edge);
            diff.removed_vertices.extend(removed_source);
            diff.removed_vertices.extend(removed_target);
            diff.removed_edges.push(edge);
        }

        let merged = self.remove_vertices_of_degree_2_and_merge_edges(&path)?;
        diff.added_edges = merged.added_edges;
        diff.added_edges.push(new_edge);
        diff.removed_vertices.extend(merged.removed_vertices);
        diff.removed_edges.extend(merged.removed_edges);
        Ok(diff)
    }
}
