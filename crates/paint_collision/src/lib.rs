//! # Paint Collision
//!
//! Collision proxies for an editor paint tool.
//!
//! The visible static meshes of a scene are mirrored into a small auxiliary
//! collision world. A sphere probe follows the mouse reticle through that
//! world, and pressing the trigger reports every node the probe overlaps.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use paint_collision::prelude::*;
//!
//! let mut tree = SceneTree::new();
//! let cube = Arc::new(StaticMesh::cube("SM_Cube"));
//! tree.add_mesh_node(tree.root(), "crate", Transform::identity(), cube);
//!
//! let mut paint = PaintManager::new(PaintConfig::default()).expect("valid config");
//! let camera = Camera::default();
//! let mut input = InputState::new();
//! let mut draws = DebugDrawQueue::new();
//!
//! input.handle_mouse_move(400.0, 300.0);
//! let hits = paint.update(PaintFrame {
//!     scene: Some(&tree),
//!     camera: Some(&camera),
//!     input: &input,
//!     viewport: Viewport::new(800.0, 600.0),
//!     debug_draw: &mut draws,
//! });
//! assert!(hits.is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod debug;
pub mod foundation;
pub mod input;
pub mod paint;
pub mod physics;
pub mod render;
pub mod scene;
pub mod spatial;

/// Common imports for paint tool users
pub mod prelude {
    pub use crate::{
        assets::StaticMesh,
        config::{Config, ConfigError, PaintConfig, WorldConfig},
        debug::{DebugDraw, DebugDrawQueue, DebugDrawSink},
        foundation::{
            collections::{NodeId, ObjectId},
            math::{Quat, Transform, Vec3},
        },
        input::{InputState, MouseButton, PaintInput},
        paint::{PaintFrame, PaintHits, PaintManager, ProxySynchronizer},
        physics::{CollisionGroups, DynamicsWorld},
        render::{Camera, Viewport},
        scene::{NodeDestroyListener, PaintScene, SceneTree},
    };
}
