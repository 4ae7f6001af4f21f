use std::sync::Arc;

use approx::assert_relative_eq;

use crate::assets::StaticMesh;
use crate::config::PaintConfig;
use crate::debug::DebugDrawQueue;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Transform, Vec3};
use crate::input::{InputState, MouseButton};
use crate::paint::{PaintFrame, PaintHits, PaintManager};
use crate::render::{Camera, Viewport};
use crate::scene::SceneTree;

/// A manager driven through full frames, camera on +Z looking at the origin
struct Session {
    tree: SceneTree,
    manager: PaintManager,
    input: InputState,
    draws: DebugDrawQueue,
    camera: Option<Camera>,
    viewport: Viewport,
}

impl Session {
    fn new() -> Self {
        let manager = PaintManager::new(PaintConfig::default()).expect("default config is valid");
        let mut input = InputState::new();
        // Off-centre so the ray misses the cube face diagonal
        input.handle_mouse_move(430.0, 300.0);
        Self {
            tree: SceneTree::new(),
            manager,
            input,
            draws: DebugDrawQueue::new(),
            camera: Some(Camera::perspective(Vec3::new(0.0, 0.0, 10.0), 60.0, 0.1, 100.0)),
            viewport: Viewport::new(800.0, 600.0),
        }
    }

    fn add_cube(&mut self, position: Vec3) -> NodeId {
        let root = self.tree.root();
        self.tree
            .add_mesh_node(
                root,
                "cube",
                Transform::from_position(position),
                Arc::new(StaticMesh::cube("cube")),
            )
            .expect("root exists")
    }

    fn frame(&mut self) -> Option<PaintHits> {
        self.draws.begin_frame();
        let hits = self.manager.update(PaintFrame {
            scene: Some(&self.tree),
            camera: self.camera.as_ref(),
            input: &self.input,
            viewport: self.viewport,
            debug_draw: &mut self.draws,
        });
        self.input.begin_frame();
        hits
    }

    fn press(&mut self) {
        self.input.handle_mouse_button(MouseButton::Left, true);
    }

    fn release(&mut self) {
        self.input.handle_mouse_button(MouseButton::Left, false);
    }
}

#[test]
fn test_rejects_invalid_config() {
    let config = PaintConfig {
        probe_radius: 0.0,
        ..PaintConfig::default()
    };
    assert!(PaintManager::new(config).is_err());
}

#[test]
fn test_no_hits_without_trigger() {
    let mut session = Session::new();
    session.add_cube(Vec3::zeros());

    for _ in 0..3 {
        assert!(session.frame().is_none());
    }
    // One marker per frame
    assert_eq!(session.draws.draws().len(), 1);
}

#[test]
fn test_click_reports_node_under_reticle() {
    let mut session = Session::new();
    let node = session.add_cube(Vec3::zeros());

    assert!(session.frame().is_none());
    let target = session
        .manager
        .synchronizer()
        .probe_target()
        .expect("probe exists");
    // Front face of the cube
    assert_relative_eq!(target.z, 1.0, epsilon = 1e-3);
    assert_relative_eq!(session.draws.draws()[0].translation(), target);

    session.press();
    let hits = session.frame().expect("trigger pressed");
    assert_eq!(hits.nodes, vec![node]);
    assert_relative_eq!(hits.probe_position, target, epsilon = 1e-5);
}

#[test]
fn test_trigger_fires_on_press_edge_only() {
    let mut session = Session::new();
    session.add_cube(Vec3::zeros());
    session.frame();

    session.press();
    assert!(session.frame().is_some());
    // Still held
    assert!(session.frame().is_none());
    assert!(session.frame().is_none());

    session.release();
    assert!(session.frame().is_none());
    session.press();
    assert!(session.frame().is_some());
}

#[test]
fn test_other_buttons_do_not_trigger() {
    let mut session = Session::new();
    session.add_cube(Vec3::zeros());
    session.frame();

    session.input.handle_mouse_button(MouseButton::Right, true);
    assert!(session.frame().is_none());
}

#[test]
fn test_missed_trace_parks_probe_at_trace_distance() {
    let mut session = Session::new();
    session.frame();

    let target = session
        .manager
        .synchronizer()
        .probe_target()
        .expect("probe exists");
    let camera = session.camera.as_ref().expect("camera");
    assert_relative_eq!((target - camera.position).norm(), 1000.0, epsilon = 0.5);

    session.press();
    let hits = session.frame().expect("trigger pressed");
    assert!(hits.nodes.is_empty());
}

#[test]
fn test_no_camera_keeps_probe_and_skips_marker() {
    let mut session = Session::new();
    session.add_cube(Vec3::zeros());
    session.camera = None;

    session.frame();
    assert!(session.draws.draws().is_empty());
    assert_eq!(session.manager.synchronizer().probe_target(), Some(Vec3::zeros()));
    assert_eq!(session.manager.reticle().pointer(), (430.0, 300.0));
}

#[test]
fn test_brush_radius_applies_next_frame() {
    let mut session = Session::new();
    let near = session.add_cube(Vec3::new(2.5, 0.0, 0.0));
    session.camera = None;

    session.press();
    assert_eq!(session.frame().expect("trigger pressed").nodes, Vec::<NodeId>::new());
    session.release();

    session.manager.set_probe_radius(2.0).expect("positive radius");
    assert_relative_eq!(session.manager.config().probe_radius, 2.0);
    session.press();
    assert_eq!(session.frame().expect("trigger pressed").nodes, vec![near]);

    assert!(session.manager.set_probe_radius(-1.0).is_err());
    assert!(session.manager.set_probe_radius(f32::NAN).is_err());
    assert_relative_eq!(session.manager.config().probe_radius, 2.0);
}

#[test]
fn test_manager_hears_node_destruction() {
    let mut session = Session::new();
    let node = session.add_cube(Vec3::zeros());
    session.frame();
    assert!(session.manager.synchronizer().registry().contains(node));

    session.tree.destroy_node(node, &mut session.manager);
    assert!(!session.manager.synchronizer().registry().contains(node));

    session.press();
    let hits = session.frame().expect("trigger pressed");
    assert!(hits.nodes.is_empty());
}

#[test]
fn test_no_scene_still_answers_trigger() {
    let mut session = Session::new();
    let node = session.add_cube(Vec3::zeros());
    session.frame();

    session.press();
    let hits = session.manager.update(PaintFrame {
        scene: None,
        camera: session.camera.as_ref(),
        input: &session.input,
        viewport: session.viewport,
        debug_draw: &mut session.draws,
    });

    // Proxies survive a frame without a scene
    let hits = hits.expect("trigger pressed");
    assert_eq!(hits.nodes, vec![node]);
}
