//! Cycle detection over a BFS spanning forest.
//!
//! Every connected component is swept by a breadth-first search building a
//! spanning tree in the `cycle_parent` marks. A neighbor that is already in
//! the tree (reached through an edge other than the one that put the current
//! vertex there) closes a cycle: the two parent chains are walked up to their
//! lowest common ancestor and everything between is marked.

use std::collections::{HashMap, VecDeque};

use tracing::warn;

use crate::model::{EdgeId, VertexId};
use crate::SkeletalGraph;

impl SkeletalGraph {
    /// Recomputes the `in_cycle` marks on every vertex and edge.
    ///
    /// The spanning-tree scratch marks (`cycle_parent`, `in_spanning_tree`)
    /// are cleared again before returning.
    pub fn find_cycles(&mut self) {
        for entry in self.vertices.values_mut() {
            entry.props.in_cycle = false;
            entry.props.in_spanning_tree = false;
            entry.props.cycle_parent = None;
        }
        for entry in self.edges.values_mut() {
            entry.props.in_cycle = false;
        }

        let roots: Vec<VertexId> = self.vertex_ids().collect();
        // the tree edge that discovered each vertex, so a parallel edge back
        // to the parent still counts as a cycle
        let mut tree_edge: HashMap<VertexId, EdgeId> = HashMap::new();

        for root in roots {
            if self.vertices[root].props.in_spanning_tree {
                continue;
            }
            let mut queue = VecDeque::new();
            queue.push_back(root);
            self.vertices[root].props.in_spanning_tree = true;

            while let Some(current) = queue.pop_front() {
                let ring: Vec<(EdgeId, VertexId)> = self
                    .in_edges(current)
                    .iter()
                    .map(|&edge| (edge, self.edges[edge].source))
                    .chain(
                        self.out_edges(current)
                            .iter()
                            .map(|&edge| (edge, self.edges[edge].target)),
                    )
                    .collect();
                for (edge, neighbor) in ring {
                    if tree_edge.get(&current) == Some(&edge) {
                        continue;
                    }
                    if self.vertices[neighbor].props.in_spanning_tree {
                        self.find_cycle_in_spanning_tree(current, neighbor);
                    } else {
                        self.vertices[neighbor].props.in_spanning_tree = true;
                        self.vertices[neighbor].props.cycle_parent = Some(current);
                        tree_edge.insert(neighbor, edge);
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        for entry in self.vertices.values_mut() {
            entry.props.cycle_parent = None;
            entry.props.in_spanning_tree = false;
        }
    }

    /// Marks the cycle closed by the back-edge between two vertices of the
    /// current spanning tree: both ancestor paths down from their lowest
    /// common ancestor, every edge along them, and every parallel edge
    /// directly between the two vertices.
    fn find_cycle_in_spanning_tree(&mut self, vertex_one: VertexId, vertex_two: VertexId) {
        let path_one = self.ancestor_path(vertex_one);
        let path_two = self.ancestor_path(vertex_two);

        if path_one.first() != path_two.first() {
            warn!("cycle back-edge endpoints trace to different spanning-tree roots");
            return;
        }

        // drop the shared prefix; the last shared vertex is the bifurcation
        let mut shared = 0;
        while shared < path_one.len()
            && shared < path_two.len()
            && path_one[shared] == path_two[shared]
        {
            shared += 1;
        }
        let bifurcation = path_one[shared - 1];
        self.vertices[bifurcation].props.in_cycle = true;

        for path in [&path_one[shared..], &path_two[shared..]] {
            let mut last = bifurcation;
            for &next in path {
                self.vertices[next].props.in_cycle = true;
                if let Some(edge) = self.first_edge_between(next, last) {
                    self.edges[edge].props.in_cycle = true;
                } else {
                    warn!("spanning-tree edge disappeared while marking a cycle");
                }
                last = next;
            }
        }

        // every parallel edge directly between the two endpoints is on the
        // cycle as well
        let direct: Vec<EdgeId> = self
            .in_edges(vertex_one)
            .iter()
            .filter(|&&edge| self.edges[edge].source == vertex_two)
            .chain(
                self.out_edges(vertex_one)
                    .iter()
                    .filter(|&&edge| self.edges[edge].target == vertex_two),
            )
            .copied()
            .collect();
        for edge in direct {
            self.edges[edge].props.in_cycle = true;
        }
    }

    /// Chain of `cycle_parent` links from the root down to `vertex`.
    fn ancestor_path(&self, vertex: VertexId) -> Vec<VertexId> {
        let limit = self.vertex_count() + 1;
        let mut path = vec![vertex];
        let mut current = vertex;
        let mut steps = 0;
        while let Some(parent) = self.vertices[current].props.cycle_parent {
            if steps >= limit {
                warn!("cycle-parent chain exceeded the vertex count; marks may be stale");
                break;
            }
            path.push(parent);
            current = parent;
            steps += 1;
        }
        path.reverse();
        path
    }
}
