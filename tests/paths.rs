use armature::error::GraphError;
use armature::SkeletalGraph;
use glam::Vec3;

const EPS: f32 = 1e-5;

fn v(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

#[test]
fn shortest_path_follows_a_chain_of_alternating_directions() {
    let mut g = SkeletalGraph::new();
    let ids: Vec<_> = (0..5).map(|i| g.add_vertex_at(v(i as f32, 0.0, 0.0))).collect();
    // alternating edge directions; BFS walks the undirected graph
    g.add_edge(ids[0], ids[1]).expect("edge");
    g.add_edge(ids[2], ids[1]).expect("edge");
    g.add_edge(ids[2], ids[3]).expect("edge");
    g.add_edge(ids[4], ids[3]).expect("edge");

    let path = g.shortest_path(ids[0], ids[4]).expect("path");
    assert_eq!(path, ids);
    let reverse = g.shortest_path(ids[4], ids[0]).expect("path");
    assert_eq!(reverse, ids.iter().rev().copied().collect::<Vec<_>>());
}

#[test]
fn shortest_path_to_self_is_the_single_vertex() {
    let mut g = SkeletalGraph::new();
    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    g.add_edge(a, b).expect("edge");
    assert_eq!(g.shortest_path(a, a).expect("path"), vec![a]);
}

#[test]
fn shortest_path_clears_its_marks() {
    let mut g = SkeletalGraph::new();
    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    g.add_edge(a, b).expect("edge");
    g.shortest_path(a, b).expect("path");
    for (_, props) in g.vertices() {
        assert!(props.bfs_parent.is_none());
        assert_eq!(props.bfs_cost, u32::MAX);
    }
}

#[test]
fn unreachable_target_is_no_path() {
    let mut g = SkeletalGraph::new();
    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let c = g.add_vertex_at(v(5.0, 0.0, 0.0));
    let d = g.add_vertex_at(v(6.0, 0.0, 0.0));
    g.add_edge(a, b).expect("edge");
    g.add_edge(c, d).expect("edge");
    assert!(matches!(g.shortest_path(a, c), Err(GraphError::NoPath)));
}

#[test]
fn shortest_path_between_edges_picks_the_closest_endpoints() {
    let mut g = SkeletalGraph::new();
    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let c = g.add_vertex_at(v(2.0, 0.0, 0.0));
    let d = g.add_vertex_at(v(3.0, 0.0, 0.0));
    let ab = g.add_edge(a, b).expect("edge");
    g.add_edge(b, c).expect("edge");
    let cd = g.add_edge(c, d).expect("edge");

    let path = g.shortest_path_between_edges(ab, cd).expect("path");
    assert_eq!(path, vec![b, c]);
}

#[test]
fn convert_to_curve_orients_every_hop() {
    let mut g = SkeletalGraph::new();
    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let c = g.add_vertex_at(v(2.0, 0.0, 0.0));
    g.add_edge(a, b).expect("edge");
    // second hop points against the path direction
    g.add_edge(c, b).expect("edge");

    let curve = g.convert_to_curve(&[a, b, c]).expect("curve");
    assert_eq!(curve.len(), 3);
    assert!(curve.front().position.distance(v(0.0, 0.0, 0.0)) < EPS);
    assert!(curve[1].position.distance(v(1.0, 0.0, 0.0)) < EPS);
    assert!(curve.back().position.distance(v(2.0, 0.0, 0.0)) < EPS);

    assert!(g.convert_to_curve(&[a]).is_none());
}

#[test]
fn split_path_joins_two_edges_across_a_path() {
    let mut g = SkeletalGraph::new();
    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let x = g.add_vertex_at(v(2.0, 0.0, 0.0));
    let c = g.add_vertex_at(v(3.0, 0.0, 0.0));
    let d = g.add_vertex_at(v(4.0, 0.0, 0.0));
    let e1 = g.add_edge(a, b).expect("edge");
    g.add_edge(b, x).expect("edge");
    g.add_edge(x, c).expect("edge");
    let e2 = g.add_edge(c, d).expect("edge");

    let diff = g.split_path(e1, e2, 0.1).expect("join");

    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.vertex_count(), 2);
    assert!(g.contains_vertex(a));
    assert!(g.contains_vertex(d));
    assert!(!g.contains_vertex(x));

    let composite = *diff.added_edges.last().expect("new edge");
    assert!(g.contains_edge(composite));
    assert_eq!(g.source(composite), Some(a));
    assert_eq!(g.target(composite), Some(d));
    let curve = &g.get_edge(composite).expect("edge").curve;
    assert!(curve.front().position.distance(v(0.0, 0.0, 0.0)) < EPS);
    assert!(curve.back().position.distance(v(4.0, 0.0, 0.0)) < EPS);

    assert!(diff.removed_edges.contains(&e1));
    assert!(diff.removed_edges.contains(&e2));
    assert!(diff.removed_vertices.contains(&x));
}

#[test]
fn split_path_rejects_joining_an_edge_with_itself() {
    let mut g = SkeletalGraph::new();
    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let e = g.add_edge(a, b).expect("edge");
    assert!(matches!(
        g.split_path(e, e, 1.0),
        Err(GraphError::InvalidArgument(_))
    ));
}
