//! Geometry-aware rewrite operations.
//!
//! Each operation mutates the topology and reshapes the embedded curves in
//! one step, so that curve endpoints keep coinciding with their vertices
//! after the rewrite. Operations fail fast: once mutation has begun an error
//! return does not roll back.

use glam::Vec3;
use tracing::warn;

use crate::error::GraphError;
use crate::geometry::curve::{Curve, PointTangent};
use crate::geometry::deform::deform_curve;
use crate::model::{
    CollapseOption, CollapseOutcome, EdgeId, EdgeProperties, GraphDiff, VertexId,
    VertexProperties,
};
use crate::SkeletalGraph;

impl SkeletalGraph {
    /// Moves `vertex` to `new_position` and reshapes every incident curve so
    /// its endpoint follows. The fast-path deformer is tried first; edges it
    /// declines fall back to the pseudo-elastic deformation.
    ///
    /// Best effort: a failing edge is reported through the diagnostic sink
    /// and the method returns `false`, but the position update and the other
    /// edges' reshapes stay in place.
    pub fn update_vertex_position(
        &mut self,
        vertex: VertexId,
        new_position: Vec3,
        maintain_shape: bool,
    ) -> bool {
        let Some(props) = self.get_vertex_mut(vertex) else {
            return false;
        };
        props.position = new_position;

        let incident_in: Vec<EdgeId> = self.in_edges(vertex).to_vec();
        let incident_out: Vec<EdgeId> = self.out_edges(vertex).to_vec();
        let mut all_reshaped = true;

        for edge in incident_in {
            let curve = &mut self.edges[edge].props.curve;
            let back = curve.len() - 1;
            if !deform_curve(curve, back, new_position)
                && !curve.pseudo_elastic_deform(false, new_position, maintain_shape)
            {
                warn!("failed to reshape an in-edge after a vertex move; graph may be inconsistent");
                all_reshaped = false;
            }
        }
        for edge in incident_out {
            let curve = &mut self.edges[edge].props.curve;
            if !deform_curve(curve, 0, new_position)
                && !curve.pseudo_elastic_deform(true, new_position, maintain_shape)
            {
                warn!("failed to reshape an out-edge after a vertex move; graph may be inconsistent");
                all_reshaped = false;
            }
        }
        all_reshaped
    }

    /// Splits `edge` at `segment_index`, inserting a new vertex at
    /// `position` whose radius is interpolated from the endpoint radii.
    /// Returns the new vertex and the (left, right) replacement edges; both
    /// inherit the split edge's cycle mark.
    pub fn split_edge_at(
        &mut self,
        edge: EdgeId,
        segment_index: usize,
        position: Vec3,
    ) -> Result<(VertexId, (EdgeId, EdgeId)), GraphError> {
        let (source, target) = self
            .endpoints(edge)
            .ok_or(GraphError::InvalidArgument("stale edge descriptor"))?;
        let curve = self.edges[edge].props.curve.clone();
        if segment_index + 1 >= curve.len() {
            return Err(GraphError::InvalidArgument(
                "cannot split edge at invalid segment index",
            ));
        }

        let radius = self
            .get_edge_radius(edge, segment_index)
            .unwrap_or(crate::model::DEFAULT_VERTEX_RADIUS);
        let mid = self.add_vertex(VertexProperties::with_radius(position, radius));

        let tangent_in = (position - curve[segment_index].position).normalize_or_zero();
        let tangent_out = (curve[segment_index + 1].position - position).normalize_or_zero();

        let mut left = Curve::between(*curve.front(), PointTangent::new(position, tangent_in));
        for i in 1..=segment_index {
            left.add_middle_point(curve[i]);
        }
        if left.len() >= 3 {
            let n = left.len();
            left[n - 2].tangent =
                (left[n - 1].position - left[n - 3].position).normalize_or_zero();
        }

        let mut right = Curve::between(PointTangent::new(position, tangent_out), *curve.back());
        for i in segment_index + 1..curve.len() - 1 {
            right.add_middle_point(curve[i]);
        }
        if right.len() >= 3 {
            right[1].tangent = (right[2].position - right[0].position).normalize_or_zero();
        }

        let in_cycle = self.edges[edge].props.in_cycle;
        let left_edge = self
            .add_edge_with(source, mid, EdgeProperties::from(left))
            .ok_or(GraphError::Inconsistency("split lost the source vertex"))?;
        let right_edge = self
            .add_edge_with(mid, target, EdgeProperties::from(right))
            .ok_or(GraphError::Inconsistency("split lost the target vertex"))?;
        self.edges[left_edge].props.in_cycle = in_cycle;
        self.edges[right_edge].props.in_cycle = in_cycle;

        self.remove_edge(edge);
        Ok((mid, (left_edge, right_edge)))
    }

    /// Like [`split_edge_at`](Self::split_edge_at) but severs the edge:
    /// produces two distinct vertices offset one unit from `position` towards
    /// the previous and next curve sample, with no edge between them.
    /// Returns `((left_vertex, right_vertex), (left_edge, right_edge))`.
    pub fn cut_edge_at(
        &mut self,
        edge: EdgeId,
        segment_index: usize,
        position: Vec3,
    ) -> Result<((VertexId, VertexId), (EdgeId, EdgeId)), GraphError> {
        let entry = self
            .edges
            .get(edge)
            .ok_or(GraphError::InvalidArgument("stale edge descriptor"))?;
        let curve = &entry.props.curve;
        if segment_index + 1 >= curve.len() {
            return Err(GraphError::InvalidArgument(
                "cannot cut edge at invalid segment index",
            ));
        }
        let direction_to_previous =
            (curve[segment_index].position - position).normalize_or_zero();
        let direction_to_next =
            (curve[segment_index + 1].position - position).normalize_or_zero();
        let left_position = position + direction_to_previous;
        let right_position = position + direction_to_next;

        let (right_vertex, (left_temp, right_edge)) =
            self.split_edge_at(edge, segment_index, right_position)?;

        let last_segment = self.edges[left_temp].props.curve.len() - 2;
        let (left_vertex, (left_edge, middle_edge)) =
            self.split_edge_at(left_temp, last_segment, left_position)?;

        self.remove_edge(middle_edge);
        Ok(((left_vertex, right_vertex), (left_edge, right_edge)))
    }

    /// Contracts `edge` into a single vertex. The chosen endpoint survives
    /// (repositioned to the midpoint for [`CollapseOption::Midpoint`]); the
    /// other endpoint's incident edges are reattached to the survivor with
    /// their curve endpoints reseated, and the cleared endpoint is removed
    /// (kept only when it is the last vertex standing).
    ///
    /// Incident edges whose other endpoint is the survivor would become
    /// self-loops; those are dropped silently.
    pub fn collapse_edge(
        &mut self,
        edge: EdgeId,
        option: CollapseOption,
    ) -> Result<CollapseOutcome, GraphError> {
        let (source, target) = self
            .endpoints(edge)
            .ok_or(GraphError::InvalidArgument("edge doesn't exist"))?;
        if source == target {
            return Err(GraphError::InvalidArgument("cannot collapse a self-loop"));
        }

        let (keep, drop) = match option {
            CollapseOption::Source | CollapseOption::Midpoint => (source, target),
            CollapseOption::Target => (target, source),
        };
        let new_position = match option {
            CollapseOption::Midpoint => {
                (self.vertices[source].props.position + self.vertices[target].props.position) * 0.5
            }
            _ => self.vertices[keep].props.position,
        };

        // gather the reattachments before mutating anything
        let mut queued: Vec<(VertexId, VertexId, EdgeProperties)> = Vec::new();
        for &incident in self.in_edges(drop) {
            if incident == edge {
                continue;
            }
            let other = self.edges[incident].source;
            if other == keep || other == drop {
                continue;
            }
            let mut props = self.edges[incident].props.clone();
            let n = props.curve.len();
            props.curve[n - 1] = PointTangent::new(
                new_position,
                (new_position - props.curve[n - 2].position).normalize_or_zero(),
            );
            queued.push((other, keep, props));
        }
        for &incident in self.out_edges(drop) {
            if incident == edge {
                continue;
            }
            let other = self.edges[incident].target;
            if other == keep || other == drop {
                continue;
            }
            let mut props = self.edges[incident].props.clone();
            props.curve[0] = PointTangent::new(
                new_position,
                (props.curve[1].position - new_position).normalize_or_zero(),
            );
            queued.push((keep, other, props));
        }

        let removed_edges = self.clear_vertex(drop);

        let mut added_edges = Vec::new();
        for (from, to, props) in queued {
            if let Some(added) = self.add_edge_with(from, to, props) {
                added_edges.push(added);
            }
        }

        // the cleared endpoint is gone for good, unless removing it would
        // empty the graph
        if self.vertex_count() != 1 {
            self.vertices.remove(drop);
        }

        // reseat the survivor; its pre-existing curves follow along
        if matches!(option, CollapseOption::Midpoint) {
            self.update_vertex_position(keep, new_position, true);
        }

        Ok(CollapseOutcome {
            removed_vertex: drop,
            removed_edges,
            added_edges,
        })
    }

    /// Merges `b` into `a` (or the other way round, per `option`) by adding a
    /// temporary edge between them and collapsing it.
    pub fn merge_vertices(
        &mut self,
        a: VertexId,
        b: VertexId,
        option: CollapseOption,
    ) -> Result<CollapseOutcome, GraphError> {
        if a == b {
            return Err(GraphError::InvalidArgument("cannot merge a vertex with itself"));
        }
        let edge = self
            .add_edge(a, b)
            .ok_or(GraphError::InvalidArgument("could not merge vertices"))?;
        let outcome = self.collapse_edge(edge, option)?;
        // collapse usually removes the cleared vertex already; make sure it
        // is gone even when it survived as the last vertex
        self.remove_vertex(outcome.removed_vertex);
        Ok(outcome)
    }

    /// Replaces `edge` by one composite edge per `(source, target)` pair: the
    /// curve of the edge touching the pair's source, the (possibly reversed,
    /// pseudo-elastically fitted) curve of `edge`, and the curve of the edge
    /// touching the pair's target are spliced into a single new edge. The
    /// consumed edges and `edge` itself are removed afterwards, along with
    /// any endpoint left isolated. Never creates vertices.
    pub fn split_edge_along_curve(
        &mut self,
        edge: EdgeId,
        pairs: &[(VertexId, VertexId)],
    ) -> Result<GraphDiff, GraphError> {
        let (split_source, split_target) = self
            .endpoints(edge)
            .ok_or(GraphError::InvalidArgument("stale edge descriptor"))?;
        let split_curve = self.edges[edge].props.curve.clone();

        let mut consumed: Vec<EdgeId> = Vec::new();
        let mut added_edges: Vec<EdgeId> = Vec::new();

        for &(new_source, new_target) in pairs {
            let mut start: Option<Curve> = None;
            let mut end: Option<Curve> = None;
            let mut reverse_middle = false;

            // scan the four incident rings of the split edge's endpoints for
            // the edges touching the pair
            for &incident in self.in_edges(split_source) {
                let other = self.edges[incident].source;
                if other == new_source {
                    start = Some(self.edges[incident].props.curve.clone());
                    reverse_middle = false;
                    consumed.push(incident);
                } else if other == new_target {
                    end = Some(self.edges[incident].props.curve.reversed());
                    reverse_middle = true;
                    consumed.push(incident);
                }
            }
            for &incident in self.out_edges(split_source) {
                let other = self.edges[incident].target;
                if other == new_source {
                    start = Some(self.edges[incident].props.curve.reversed());
                    reverse_middle = false;
                    consumed.push(incident);
                } else if other == new_target {
                    end = Some(self.edges[incident].props.curve.clone());
                    reverse_middle = true;
                    consumed.push(incident);
                }
            }
            for &incident in self.in_edges(split_target) {
                let other = self.edges[incident].source;
                if other == new_source {
                    start = Some(self.edges[incident].props.curve.clone());
                    reverse_middle = true;
                    consumed.push(incident);
                } else if other == new_target {
                    end = Some(self.edges[incident].props.curve.reversed());
                    reverse_middle = false;
                    consumed.push(incident);
                }
            }
            for &incident in self.out_edges(split_target) {
                let other = self.edges[incident].target;
                if other == new_source {
                    start = Some(self.edges[incident].props.curve.reversed());
                    reverse_middle = true;
                    consumed.push(incident);
                } else if other == new_target {
                    end = Some(self.edges[incident].props.curve.clone());
                    reverse_middle = false;
                    consumed.push(incident);
                }
            }

            let (Some(mut composite), Some(end)) = (start, end) else {
                return Err(GraphError::InvalidArgument(
                    "pair is not adjacent to the split edge",
                ));
            };

            composite.pop_back();
            let mut middle = if reverse_middle {
                split_curve.reversed()
            } else {
                split_curve.clone()
            };
            middle.pseudo_elastic_deform(true, composite.back().position, true);
            middle.pseudo_elastic_deform(false, end[1].position, true);
            middle.pop_back();
            composite.append(&middle, 1);
            composite.append(&end, 1);

            let new_edge = self
                .add_edge_with(new_source, new_target, EdgeProperties::from(composite))
                .ok_or(GraphError::Inconsistency("pair vertex disappeared"))?;
            added_edges.push(new_edge);
        }

        consumed.push(edge);
        let mut seen: Vec<EdgeId> = Vec::new();
        consumed.retain(|&e| {
            if seen.contains(&e) {
                false
            } else {
                seen.push(e);
                true
            }
        });

        let mut removed_vertices = Vec::new();
        for &doomed in &consumed {
            let (removed_source, removed_target) = self.remove_edge(doomed);
            removed_vertices.extend(removed_source);
            removed_vertices.extend(removed_target);
        }

        Ok(GraphDiff {
            added_vertices: Vec::new(),
            added_edges,
            removed_vertices,
            removed_edges: consumed,
        })
    }

    /// Removes a vertex of total degree 2 and fuses its two incident edges
    /// into one, reversing sub-curves and negating tangents as the edge
    /// directions require. Returns the merged edge and the two removed ones.
    pub fn remove_degree_2_vertex_and_merge_edges(
        &mut self,
        vertex: VertexId,
    ) -> Result<(EdgeId, (EdgeId, EdgeId)), GraphError> {
        if self.degree(vertex) != 2 {
            return Err(GraphError::InvalidArgument(
                "trying to merge edges of non degree-2 vertex",
            ));
        }
        let in_edges: Vec<EdgeId> = self.in_edges(vertex).to_vec();
        let out_edges: Vec<EdgeId> = self.out_edges(vertex).to_vec();
        if in_edges.len() == 1 && out_edges.len() == 1 && in_edges[0] == out_edges[0] {
            return Err(GraphError::InvalidArgument(
                "degree-2 vertex carries a self-loop",
            ));
        }

        let (new_source, new_target, merged) = if in_edges.len() == 1 && out_edges.len() == 1 {
            // in -> v -> out: splice the out curve onto the in curve
            let out_curve = self.edges[out_edges[0]].props.curve.clone();
            let mut merged = self.edges[in_edges[0]].props.curve.clone();
            let n = merged.len();
            merged[n - 1].tangent =
                (out_curve[1].position - merged[n - 1].position).normalize_or_zero();
            merged.append(&out_curve, 1);
            (
                self.edges[in_edges[0]].source,
                self.edges[out_edges[0]].target,
                merged,
            )
        } else if in_edges.len() == 2 {
            // both edges point at v: append the second one reversed
            let second = self.edges[in_edges[1]].props.curve.reversed();
            let mut merged = self.edges[in_edges[0]].props.curve.clone();
            let n = merged.len();
            merged[n - 1].tangent =
                (second[1].position - merged[n - 1].position).normalize_or_zero();
            merged.append(&second, 1);
            (
                self.edges[in_edges[0]].source,
                self.edges[in_edges[1]].source,
                merged,
            )
        } else if out_edges.len() == 2 {
            // both edges leave v: reverse the first, then append the second
            let mut merged = self.edges[out_edges[0]].props.curve.reversed();
            let second = self.edges[out_edges[1]].props.curve.clone();
            let n = merged.len();
            merged[n - 1].tangent =
                (second[1].position - merged[n - 1].position).normalize_or_zero();
            merged.append(&second, 1);
            (
                self.edges[out_edges[0]].target,
                self.edges[out_edges[1]].target,
                merged,
            )
        } else {
            return Err(GraphError::Inconsistency(
                "could not pair the edges of a degree-2 vertex",
            ));
        };

        if new_source == new_target {
            return Err(GraphError::InvalidArgument(
                "merging the edges would create a self-loop",
            ));
        }

        let new_edge = self
            .add_edge_with(new_source, new_target, EdgeProperties::from(merged))
            .ok_or(GraphError::Inconsistency("merge produced stale endpoints"))?;
        let removed = self.remove_vertex(vertex);
        if removed.len() != 2 {
            return Err(GraphError::Inconsistency(
                "degree-2 removal cleared an unexpected edge set",
            ));
        }
        Ok((new_edge, (removed[0], removed[1])))
    }

    /// Applies [`remove_degree_2_vertex_and_merge_edges`](Self::remove_degree_2_vertex_and_merge_edges)
    /// to every listed vertex that (still) has degree 2. A merged edge that a
    /// later merge consumes again is reported neither as added nor as
    /// removed.
    pub fn remove_vertices_of_degree_2_and_merge_edges(
        &mut self,
        candidates: &[VertexId],
    ) -> Result<GraphDiff, GraphError> {
        let mut removed_vertices: Vec<VertexId> = Vec::new();
        let mut removed_edges: Vec<EdgeId> = Vec::new();
        // (edge, still live) so chained merges can retract earlier additions
        let mut added: Vec<(EdgeId, bool)> = Vec::new();

        for &candidate in candidates {
            if self.degree(candidate) != 2 {
                continue;
            }
            let (new_edge, (first, second)) =
                match self.remove_degree_2_vertex_and_merge_edges(candidate) {
                    Ok(merged) => merged,
                    Err(GraphError::InvalidArgument(reason)) => {
                        warn!("skipping degree-2 merge: {reason}");
                        continue;
                    }
                    Err(error) => return Err(error),
                };

            let mut first_was_added_here = false;
            let mut second_was_added_here = false;
            for slot in added.iter_mut() {
                if slot.0 == first {
                    slot.1 = false;
                    first_was_added_here = true;
                }
                if slot.0 == second {
                    slot.1 = false;
                    second_was_added_here = true;
                }
            }
            if !first_was_added_here {
                removed_edges.push(first);
            }
            if !second_was_added_here {
                removed_edges.push(second);
            }
            removed_vertices.push(candidate);
            added.push((new_edge, true));
        }

        Ok(GraphDiff {
            added_vertices: Vec::new(),
            added_edges: added
                .into_iter()
                .filter(|&(_, live)| live)
                .map(|(edge, _)| edge)
                .collect(),
            removed_vertices,
            removed_edges,
        })
    }
}
