use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::curve::Curve;

slotmap::new_key_type! {
    /// Stable identifier for a vertex. Valid until the vertex is removed.
    pub struct VertexId;

    /// Stable identifier for an edge. Valid until the edge is removed.
    pub struct EdgeId;
}

pub const DEFAULT_VERTEX_RADIUS: f32 = 1.0;
pub const MAX_VERTEX_RADIUS: f32 = 10_000.0;

/// Sentinel cost for vertices not yet reached by a path search.
pub const UNREACHED: u32 = u32::MAX;

/// All the data carried by a vertex.
///
/// Aside from `position` and `radius`, the fields are transient marks owned
/// by the graph algorithms: they are undefined before an algorithm runs and
/// cleared again when it returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VertexProperties {
    pub position: Vec3,
    pub radius: f32,
    /// Set by cycle detection; persisted alongside the geometry.
    pub in_cycle: bool,
    #[serde(skip)]
    pub in_spanning_tree: bool,
    #[serde(skip)]
    pub cycle_parent: Option<VertexId>,
    #[serde(skip)]
    pub bfs_parent: Option<VertexId>,
    #[serde(skip, default = "unreached")]
    pub bfs_cost: u32,
}

fn unreached() -> u32 {
    UNREACHED
}

impl Default for VertexProperties {
    fn default() -> Self {
        VertexProperties {
            position: Vec3::ZERO,
            radius: DEFAULT_VERTEX_RADIUS,
            in_cycle: false,
            in_spanning_tree: false,
            cycle_parent: None,
            bfs_parent: None,
            bfs_cost: UNREACHED,
        }
    }
}

impl VertexProperties {
    pub fn at(position: Vec3) -> Self {
        VertexProperties {
            position,
            ..Default::default()
        }
    }

    pub fn with_radius(position: Vec3, radius: f32) -> Self {
        VertexProperties {
            position,
            radius,
            ..Default::default()
        }
    }
}

/// All the data carried by an edge: the embedded curve and its cycle mark.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeProperties {
    pub curve: Curve,
    pub in_cycle: bool,
}

impl From<Curve> for EdgeProperties {
    fn from(curve: Curve) -> Self {
        EdgeProperties {
            curve,
            in_cycle: false,
        }
    }
}

/// Which endpoint survives an edge collapse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollapseOption {
    /// Keep the source vertex where it is.
    Source,
    /// Keep the target vertex where it is.
    Target,
    /// Keep the source vertex, repositioned halfway between the endpoints.
    Midpoint,
}

/// What a rewrite operation added to and removed from the graph.
///
/// Descriptors listed under `removed_*` are stale by the time the diff is
/// returned; they are reported so callers can drop derived state keyed on
/// them.
#[derive(Clone, Debug, Default)]
pub struct GraphDiff {
    pub added_vertices: Vec<VertexId>,
    pub added_edges: Vec<EdgeId>,
    pub removed_vertices: Vec<VertexId>,
    pub removed_edges: Vec<EdgeId>,
}

/// Outcome of collapsing an edge.
///
/// `removed_vertex` is the endpoint whose incident edges were reattached to
/// the survivor. `collapse_edge` removes it together with them; it is kept
/// (cleared of edges) only when it is the graph's last vertex.
#[derive(Clone, Debug)]
pub struct CollapseOutcome {
    pub removed_vertex: VertexId,
    pub removed_edges: Vec<EdgeId>,
    pub added_edges: Vec<EdgeId>,
}

/// Result of looking up the edges between two vertices.
///
/// `forward` reports whether the source-to-target direction was the last one
/// found.
#[derive(Clone, Debug, Default)]
pub struct EdgeLookup {
    pub edges: Vec<EdgeId>,
    pub forward: bool,
    pub found: bool,
}
