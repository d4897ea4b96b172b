//! Connected components of the undirected underlying graph.

use std::collections::VecDeque;

use crate::model::VertexId;
use crate::SkeletalGraph;

impl SkeletalGraph {
    /// Number of connected components, counting each vertex once and
    /// traversing edges in both directions. Uses and then clears the
    /// `in_spanning_tree` marks.
    pub fn count_connected_components(&mut self) -> usize {
        if self.vertex_count() == 0 {
            return 0;
        }
        let roots: Vec<VertexId> = self.vertex_ids().collect();
        let mut components = 0;
        for root in &roots {
            if !self.vertices[*root].props.in_spanning_tree {
                self.explore_from_vertex(*root);
                components += 1;
            }
        }
        for root in roots {
            self.vertices[root].props.in_spanning_tree = false;
        }
        components
    }

    /// Marks everything reachable from `start` as in the spanning tree.
    fn explore_from_vertex(&mut self, start: VertexId) {
        let mut queue = VecDeque::new();
        queue.push_back(start);
        self.vertices[start].props.in_spanning_tree = true;
        while let Some(current) = queue.pop_front() {
            let ring: Vec<VertexId> = self
                .in_edges(current)
                .iter()
                .map(|&edge| self.edges[edge].source)
                .chain(
                    self.out_edges(current)
                        .iter()
                        .map(|&edge| self.edges[edge].target),
                )
                .collect();
            for neighbor in ring {
                if !self.vertices[neighbor].props.in_spanning_tree {
                    self.vertices[neighbor].props.in_spanning_tree = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }
}
