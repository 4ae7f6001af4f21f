//! Paint tool collision demo
//!
//! Builds a small scene of scattered crates on a floor, sweeps the reticle
//! across the viewport and clicks along the way, logging every node under
//! the paint probe. Halfway through one crate is destroyed to show the
//! proxy going away immediately.
//!
//! Usage: `paint_demo [config.toml|config.ron]`

use std::sync::Arc;

use paint_collision::foundation::logging;
use paint_collision::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

const CRATE_COUNT: usize = 24;
const FRAME_COUNT: usize = 120;
const CLICK_INTERVAL: usize = 15;
const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

struct PaintDemo {
    tree: SceneTree,
    crates: Vec<NodeId>,
    paint: PaintManager,
    camera: Camera,
    input: InputState,
    draws: DebugDrawQueue,
}

impl PaintDemo {
    fn new(config: PaintConfig) -> Result<Self, ConfigError> {
        let mut tree = SceneTree::new();
        let root = tree.root();

        let floor = Arc::new(StaticMesh::quad("SM_Floor"));
        tree.add_mesh_node(
            root,
            "floor",
            Transform::from_position(Vec3::new(0.0, -1.0, 0.0)).with_scale(Vec3::new(20.0, 1.0, 20.0)),
            floor,
        );

        let cube = Arc::new(StaticMesh::cube("SM_Crate"));
        let mut rng = StdRng::seed_from_u64(7);
        let crates = (0..CRATE_COUNT)
            .filter_map(|i| {
                let position = Vec3::new(rng.gen_range(-12.0..12.0), 0.0, rng.gen_range(-12.0..12.0));
                let yaw = rng.gen_range(0.0..std::f32::consts::TAU);
                let size = rng.gen_range(0.5..1.5);
                let transform = Transform::new(
                    position,
                    Quat::from_euler_angles(0.0, yaw, 0.0),
                    Vec3::repeat(size),
                );
                tree.add_mesh_node(root, format!("crate_{i:02}"), transform, Arc::clone(&cube))
            })
            .collect();

        Ok(Self {
            tree,
            crates,
            paint: PaintManager::new(config)?,
            camera: Camera::perspective(Vec3::new(0.0, 18.0, 22.0), 50.0, 0.1, 500.0),
            input: InputState::new(),
            draws: DebugDrawQueue::new(),
        })
    }

    fn run(&mut self) {
        let trigger = self.paint.config().trigger_button;
        let mut total_hits = 0;

        for frame in 0..FRAME_COUNT {
            // Sweep left to right across the middle of the screen
            let t = frame as f32 / (FRAME_COUNT - 1) as f32;
            self.input.handle_mouse_move(t * VIEWPORT.width, VIEWPORT.height * 0.55);
            if frame % CLICK_INTERVAL == CLICK_INTERVAL - 1 {
                self.input.handle_mouse_button(trigger, true);
            }

            if frame == FRAME_COUNT / 2 {
                self.destroy_first_crate();
            }

            self.draws.begin_frame();
            let hits = self.paint.update(PaintFrame {
                scene: Some(&self.tree),
                camera: Some(&self.camera),
                input: &self.input,
                viewport: VIEWPORT,
                debug_draw: &mut self.draws,
            });

            if let Some(hits) = hits {
                total_hits += hits.nodes.len();
                let names: Vec<&str> = hits
                    .nodes
                    .iter()
                    .filter_map(|node| self.tree.node(*node).map(|n| n.name.as_str()))
                    .collect();
                log::info!(
                    "Frame {frame}: probe at ({:.2}, {:.2}, {:.2}) touches {:?}",
                    hits.probe_position.x,
                    hits.probe_position.y,
                    hits.probe_position.z,
                    names
                );
            }
            if let Some(marker) = self.draws.draws().first() {
                log::trace!("Marker at {:?}", marker.translation());
            }

            self.input.begin_frame();
            self.input.handle_mouse_button(trigger, false);
        }

        let sync = self.paint.synchronizer();
        log::info!("Reported {total_hits} overlap(s) over {FRAME_COUNT} frames");
        log::info!("Proxy stats: {:?}", sync.stats());
        log::info!("World stats: {:?}", sync.world().stats());
    }

    fn destroy_first_crate(&mut self) {
        let Some(node) = self.crates.first().copied() else {
            return;
        };
        let removed = self.tree.destroy_node(node, &mut self.paint);
        log::info!(
            "Destroyed {removed} node(s); proxy still tracked: {}",
            self.paint.synchronizer().registry().contains(node)
        );
        self.crates.remove(0);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading paint config from {path}");
            PaintConfig::load_from_file(&path)?
        }
        None => PaintConfig::default(),
    };

    let mut demo = PaintDemo::new(config)?;
    log::info!(
        "Scene ready: {} nodes, {} crates",
        demo.tree.len(),
        demo.crates.len()
    );
    demo.run();
    Ok(())
}
