use armature::SkeletalGraph;
use glam::Vec3;

fn v(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z)
}

#[test]
fn triangle_is_one_cycle() {
    let mut g = SkeletalGraph::new();
    let v0 = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let v1 = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let v2 = g.add_vertex_at(v(0.0, 1.0, 0.0));
    g.add_edge(v0, v1).expect("edge");
    g.add_edge(v1, v2).expect("edge");
    g.add_edge(v2, v0).expect("edge");

    g.find_cycles();

    for (_, props) in g.vertices() {
        assert!(props.in_cycle);
    }
    for (_, props) in g.edges() {
        assert!(props.in_cycle);
    }
}

#[test]
fn cycle_scan_clears_its_scratch_marks() {
    let mut g = SkeletalGraph::new();
    let v0 = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let v1 = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let v2 = g.add_vertex_at(v(0.0, 1.0, 0.0));
    g.add_edge(v0, v1).expect("edge");
    g.add_edge(v1, v2).expect("edge");
    g.add_edge(v2, v0).expect("edge");

    g.find_cycles();

    for (_, props) in g.vertices() {
        assert!(!props.in_spanning_tree);
        assert!(props.cycle_parent.is_none());
    }
}

#[test]
fn figure_eight_marks_both_loops_and_the_shared_vertex() {
    let mut g = SkeletalGraph::new();
    let hub = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let a1 = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let a2 = g.add_vertex_at(v(1.0, 1.0, 0.0));
    let b1 = g.add_vertex_at(v(-1.0, 0.0, 0.0));
    let b2 = g.add_vertex_at(v(-1.0, -1.0, 0.0));
    g.add_edge(hub, a1).expect("edge");
    g.add_edge(a1, a2).expect("edge");
    g.add_edge(a2, hub).expect("edge");
    g.add_edge(hub, b1).expect("edge");
    g.add_edge(b1, b2).expect("edge");
    g.add_edge(b2, hub).expect("edge");

    g.find_cycles();

    for (_, props) in g.vertices() {
        assert!(props.in_cycle);
    }
    for (_, props) in g.edges() {
        assert!(props.in_cycle);
    }
}

#[test]
fn pendant_branch_stays_out_of_the_cycle() {
    let mut g = SkeletalGraph::new();
    let v0 = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let v1 = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let v2 = g.add_vertex_at(v(0.0, 1.0, 0.0));
    let tip = g.add_vertex_at(v(2.0, 2.0, 0.0));
    g.add_edge(v0, v1).expect("edge");
    g.add_edge(v1, v2).expect("edge");
    g.add_edge(v2, v0).expect("edge");
    let pendant = g.add_edge(v2, tip).expect("edge");

    g.find_cycles();

    assert!(!g.get_vertex(tip).expect("tip").in_cycle);
    assert!(!g.get_edge(pendant).expect("pendant").in_cycle);
    assert!(g.get_vertex(v2).expect("cycle vertex").in_cycle);
}

#[test]
fn parallel_edges_close_a_cycle() {
    let mut g = SkeletalGraph::new();
    let u = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let w = g.add_vertex_at(v(1.0, 0.0, 0.0));
    g.add_edge(u, w).expect("edge");
    g.add_edge(u, w).expect("edge");

    g.find_cycles();

    assert!(g.get_vertex(u).expect("u").in_cycle);
    assert!(g.get_vertex(w).expect("w").in_cycle);
    for (_, props) in g.edges() {
        assert!(props.in_cycle);
    }
}

#[test]
fn antiparallel_edges_close_a_cycle() {
    let mut g = SkeletalGraph::new();
    let u = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let w = g.add_vertex_at(v(1.0, 0.0, 0.0));
    g.add_edge(u, w).expect("edge");
    g.add_edge(w, u).expect("edge");

    g.find_cycles();

    assert!(g.get_vertex(u).expect("u").in_cycle);
    assert!(g.get_vertex(w).expect("w").in_cycle);
    for (_, props) in g.edges() {
        assert!(props.in_cycle);
    }
}

#[test]
fn new_edge_derives_its_cycle_mark_from_the_endpoints() {
    let mut g = SkeletalGraph::new();
    let v0 = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let v1 = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let v2 = g.add_vertex_at(v(0.0, 1.0, 0.0));
    g.add_edge(v0, v1).expect("edge");
    g.add_edge(v1, v2).expect("edge");
    g.add_edge(v2, v0).expect("edge");
    g.find_cycles();

    let chord = g.add_edge(v0, v1).expect("edge");
    assert!(g.get_edge(chord).expect("chord").in_cycle);

    let outside = g.add_vertex_at(v(5.0, 5.0, 0.0));
    let spoke = g.add_edge(v0, outside).expect("edge");
    assert!(!g.get_edge(spoke).expect("spoke").in_cycle);
}

#[test]
fn component_count_tracks_bridging_edges() {
    let mut g = SkeletalGraph::new();
    assert_eq!(g.count_connected_components(), 0);

    let a = g.add_vertex_at(v(0.0, 0.0, 0.0));
    let b = g.add_vertex_at(v(1.0, 0.0, 0.0));
    let c = g.add_vertex_at(v(5.0, 0.0, 0.0));
    let d = g.add_vertex_at(v(6.0, 0.0, 0.0));
    g.add_edge(a, b).expect("edge");
    g.add_edge(c, d).expect("edge");
    assert_eq!(g.count_connected_components(), 2);

    g.add_edge(b, c).expect("edge");
    assert_eq!(g.count_connected_components(), 1);
}
