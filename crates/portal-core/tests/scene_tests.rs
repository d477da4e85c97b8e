// Integration tests for OBJ loading, material binding and the load channel.

use std::time::{Duration, Instant};

use glam::{Vec3, Vec4Swizzles};
use portal_core::{
    Material, PendingScene, SceneError, SceneGraph, ScenePoll, SceneTransform, LAMP_NODES,
    PORTAL_NODE,
};

const TWO_OBJECTS: &str = "\
o Ground
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
f 1 4 3 2
o PortalLights
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 5/1 6/2 7/3
";

#[test]
fn obj_objects_become_named_nodes() {
    let graph = SceneGraph::from_obj(TWO_OBJECTS).unwrap();
    let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Ground", "PortalLights"]);
    assert_eq!(graph.triangle_count(), 3);
}

#[test]
fn missing_normals_are_generated() {
    let graph = SceneGraph::from_obj(TWO_OBJECTS).unwrap();
    let ground = graph.node("Ground").unwrap();
    for v in &ground.vertices {
        let n = Vec3::from(v.normal);
        assert!((n - Vec3::Y).length() < 1e-5, "normal {n:?}");
    }
}

#[test]
fn texcoords_are_kept() {
    let graph = SceneGraph::from_obj(TWO_OBJECTS).unwrap();
    let portal = graph.node(PORTAL_NODE).unwrap();
    let uvs: Vec<[f32; 2]> = portal.vertices.iter().map(|v| v.uv).collect();
    assert!(uvs.contains(&[1.0, 0.0]));
    assert!(uvs.contains(&[0.0, 1.0]));
}

#[test]
fn empty_obj_is_an_error() {
    assert!(matches!(SceneGraph::from_obj(""), Err(SceneError::Empty)));
    assert!(matches!(
        SceneGraph::from_obj("# only a comment\n"),
        Err(SceneError::Empty)
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = SceneGraph::load_obj_file("/definitely/not/here.obj").unwrap_err();
    assert!(matches!(err, SceneError::Io { .. }));
}

#[test]
fn materials_bind_by_node_name() {
    let mut graph = SceneGraph::portal_diorama();
    graph.bind_materials().unwrap();
    for node in &graph.nodes {
        let expected = if node.name == PORTAL_NODE {
            Material::PortalLights
        } else if LAMP_NODES.contains(&node.name.as_str()) {
            Material::LampLight
        } else {
            Material::Baked
        };
        assert_eq!(node.material, expected, "{}", node.name);
    }
}

#[test]
fn binding_without_portal_fails_and_leaves_graph_alone() {
    let mut graph = SceneGraph::from_obj("o Rock\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    let before = graph.clone();
    let err = graph.bind_materials().unwrap_err();
    assert!(matches!(err, SceneError::MissingNode(ref n) if n == PORTAL_NODE));
    assert_eq!(graph, before);
}

#[test]
fn built_in_portal_disc_spans_the_uv_square() {
    let graph = SceneGraph::portal_diorama();
    let disc = graph.node(PORTAL_NODE).unwrap();
    let (mut lo, mut hi) = ([1.0f32; 2], [0.0f32; 2]);
    for v in &disc.vertices {
        for i in 0..2 {
            lo[i] = lo[i].min(v.uv[i]);
            hi[i] = hi[i].max(v.uv[i]);
        }
    }
    assert!(lo[0] < 0.01 && lo[1] < 0.01);
    assert!(hi[0] > 0.99 && hi[1] > 0.99);
    for v in &disc.vertices {
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
    }
}

#[test]
fn scene_transform_scales_then_turns() {
    let half = SceneTransform {
        scale: 0.5,
        rotation_y: 0.0,
    };
    let p = half.model_matrix() * Vec3::new(2.0, 0.0, 0.0).extend(1.0);
    assert!((p.xyz() - Vec3::X).length() < 1e-6);

    let quarter = SceneTransform {
        scale: 1.0,
        rotation_y: std::f32::consts::FRAC_PI_2,
    };
    let p = quarter.model_matrix().transform_point3(Vec3::X);
    assert!((p - Vec3::NEG_Z).length() < 1e-6);
    assert_eq!(SceneTransform::default(), SceneTransform::IDENTITY);
}

#[test]
fn spawned_loader_delivers_once() {
    let mut pending = PendingScene::spawn(|| Ok(SceneGraph::portal_diorama()));
    let deadline = Instant::now() + Duration::from_secs(5);
    let graph = loop {
        match pending.poll() {
            ScenePoll::Ready(result) => break result.unwrap(),
            ScenePoll::Pending if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(5))
            }
            ScenePoll::Pending => panic!("loader timed out"),
            ScenePoll::Closed => panic!("loader closed early"),
        }
    };
    assert_eq!(graph.nodes.len(), 4);
    assert!(matches!(pending.poll(), ScenePoll::Closed));
}

#[test]
fn dropped_sender_closes_channel() {
    let (tx, mut pending) = PendingScene::channel();
    assert!(matches!(pending.poll(), ScenePoll::Pending));
    drop(tx);
    assert!(matches!(pending.poll(), ScenePoll::Closed));
}
