//! Frame driver tying the synchronizer and reticle together

use crate::config::{ConfigError, PaintConfig};
use crate::debug::DebugDrawSink;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Vec3;
use crate::input::PaintInput;
use crate::render::{Camera, Viewport};
use crate::scene::{NodeDestroyListener, PaintScene};
use super::reticle::PaintReticle;
use super::synchronizer::ProxySynchronizer;

/// Everything the paint tool reads or writes during one frame
pub struct PaintFrame<'a> {
    /// Scene to mirror; `None` when no scene is loaded
    pub scene: Option<&'a dyn PaintScene>,
    /// Active camera; `None` disables the reticle
    pub camera: Option<&'a Camera>,
    /// Pointer and button state
    pub input: &'a dyn PaintInput,
    /// Viewport the pointer lives in
    pub viewport: Viewport,
    /// Receiver for the reticle marker
    pub debug_draw: &'a mut dyn DebugDrawSink,
}

/// Result of a trigger press
#[derive(Debug, Clone, PartialEq)]
pub struct PaintHits {
    /// Where the probe was when the overlaps were gathered
    pub probe_position: Vec3,
    /// Nodes under the probe, in world order
    pub nodes: Vec<NodeId>,
}

/// The paint tool's collision front end
#[derive(Debug)]
pub struct PaintManager {
    config: PaintConfig,
    synchronizer: ProxySynchronizer,
    reticle: PaintReticle,
}

impl PaintManager {
    /// Create the tool; fails if `config` does not validate
    pub fn new(config: PaintConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Paint tool ready (probe radius {}, trigger {:?})",
            config.probe_radius,
            config.trigger_button
        );
        Ok(Self {
            synchronizer: ProxySynchronizer::new(&config),
            reticle: PaintReticle::new(&config),
            config,
        })
    }

    /// Run one frame
    ///
    /// Order: synchronize the world (probe at last frame's target), update the
    /// reticle (new target, marker), then answer a trigger press with the
    /// overlaps from this frame's step.
    pub fn update(&mut self, frame: PaintFrame<'_>) -> Option<PaintHits> {
        let PaintFrame {
            scene,
            camera,
            input,
            viewport,
            debug_draw,
        } = frame;

        self.synchronizer.update(scene);
        let stepped_at = self.synchronizer.probe_position();

        if let Some(target) = self
            .reticle
            .update(camera, input, viewport, self.synchronizer.world(), debug_draw)
        {
            self.synchronizer.set_probe_target(target);
        }

        if !input.is_button_just_pressed(self.config.trigger_button) {
            return None;
        }

        let nodes = self.synchronizer.query_overlaps();
        log::debug!("Num overlaps: {}", nodes.len());
        for node in &nodes {
            log::debug!("  overlapping node {node:?}");
        }
        Some(PaintHits {
            probe_position: stepped_at.unwrap_or_else(Vec3::zeros),
            nodes,
        })
    }

    /// Change the brush size
    ///
    /// The probe picks up the new radius on the next frame's synchronization.
    pub fn set_probe_radius(&mut self, radius: f32) -> Result<(), ConfigError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ConfigError::Invalid(format!("probe_radius must be positive, got {radius}")));
        }
        self.config.probe_radius = radius;
        self.synchronizer.set_probe_radius(radius);
        log::debug!("Paint probe radius set to {radius}");
        Ok(())
    }

    /// Tear down a destroyed node's proxy immediately
    pub fn handle_node_destroy(&mut self, node: NodeId) {
        self.synchronizer.handle_node_destroy(node);
    }

    /// Proxy synchronizer
    pub const fn synchronizer(&self) -> &ProxySynchronizer {
        &self.synchronizer
    }

    /// Reticle state
    pub const fn reticle(&self) -> &PaintReticle {
        &self.reticle
    }

    /// Active settings
    pub const fn config(&self) -> &PaintConfig {
        &self.config
    }
}

impl NodeDestroyListener for PaintManager {
    fn on_node_destroyed(&mut self, node: NodeId) {
        self.handle_node_destroy(node);
    }
}
