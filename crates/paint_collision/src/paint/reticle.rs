//! Screen-space reticle driving the probe
//!
//! Every frame the pointer is clamped to the viewport, traced into the
//! auxiliary collision world and a marker mesh is drawn where it lands.

use crate::config::PaintConfig;
use crate::debug::{DebugDraw, DebugDrawSink};
use crate::foundation::math::{Vec3, Vec4};
use crate::input::PaintInput;
use crate::physics::{CollisionGroups, DynamicsWorld};
use crate::render::{Camera, Viewport};

/// Pointer tracking and marker submission
#[derive(Debug, Clone)]
pub struct PaintReticle {
    pointer: (f32, f32),
    trace_distance: f32,
    marker_mesh: String,
    marker_material: String,
    marker_color: Vec4,
}

impl PaintReticle {
    /// Create a reticle using the marker and trace settings of `config`
    pub fn new(config: &PaintConfig) -> Self {
        Self {
            pointer: (0.0, 0.0),
            trace_distance: config.trace_distance,
            marker_mesh: config.marker_mesh.clone(),
            marker_material: config.marker_material.clone(),
            marker_color: config.marker_color(),
        }
    }

    /// Last pointer position, already clamped to the viewport
    pub const fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    /// Run one frame of the reticle
    ///
    /// Returns the new probe target, or `None` when there is no camera or no
    /// ray could be formed. Nothing is drawn in that case.
    pub fn update(
        &mut self,
        camera: Option<&Camera>,
        input: &dyn PaintInput,
        viewport: Viewport,
        world: &DynamicsWorld,
        debug_draw: &mut dyn DebugDrawSink,
    ) -> Option<Vec3> {
        let (x, y) = input.pointer_position();
        self.pointer = viewport.clamp(x, y);

        let Some(camera) = camera else {
            log::trace!("No camera, reticle idle");
            return None;
        };

        let (px, py) = self.pointer;
        let trace = camera.trace_screen_to_world(
            px,
            py,
            viewport,
            world,
            CollisionGroups::TRACE_FILTER,
            self.trace_distance,
        )?;

        debug_draw.add_debug_draw(DebugDraw::marker(
            self.marker_mesh.as_str(),
            self.marker_material.as_str(),
            self.marker_color,
            trace.position,
        ));
        Some(trace.position)
    }
}
