//! Per-frame debug mesh submissions
//!
//! Tools submit [`DebugDraw`] records through a [`DebugDrawSink`]. Records
//! live for exactly one frame: the renderer drains them and the queue is
//! cleared at the start of the next frame.

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// A mesh drawn once with a given material, color and transform
#[derive(Debug, Clone, PartialEq)]
pub struct DebugDraw {
    /// Mesh asset name
    pub mesh: String,
    /// Material asset name
    pub material: String,
    /// RGBA tint
    pub color: Vec4,
    /// Model transform
    pub transform: Mat4,
}

impl DebugDraw {
    /// Marker placed at `position` with no rotation or scale
    pub fn marker(mesh: impl Into<String>, material: impl Into<String>, color: Vec4, position: Vec3) -> Self {
        Self {
            mesh: mesh.into(),
            material: material.into(),
            color,
            transform: Mat4::new_translation(&position),
        }
    }

    /// Translation part of the transform
    pub fn translation(&self) -> Vec3 {
        self.transform.fixed_view::<3, 1>(0, 3).into_owned()
    }
}

/// Receiver of debug draw submissions
pub trait DebugDrawSink {
    /// Queue a draw for the current frame
    fn add_debug_draw(&mut self, draw: DebugDraw);
}

/// Collects submissions for the current frame only
#[derive(Debug, Default)]
pub struct DebugDrawQueue {
    draws: Vec<DebugDraw>,
}

impl DebugDrawQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame, dropping last frame's submissions
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    /// Submissions made this frame
    pub fn draws(&self) -> &[DebugDraw] {
        &self.draws
    }

    /// Hand this frame's submissions to the renderer
    pub fn drain(&mut self) -> std::vec::Drain<'_, DebugDraw> {
        self.draws.drain(..)
    }
}

impl DebugDrawSink for DebugDrawQueue {
    fn add_debug_draw(&mut self, draw: DebugDraw) {
        log::trace!("Debug draw '{}' at {:?}", draw.mesh, draw.translation());
        self.draws.push(draw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_marker_is_translation_only() {
        let draw = DebugDraw::marker("SM_Sphere", "M_PaintSphere", Vec4::repeat(1.0), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(draw.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(draw.transform.fixed_view::<3, 3>(0, 0).into_owned(), nalgebra::Matrix3::identity());
    }

    #[test]
    fn test_queue_keeps_one_frame() {
        let mut queue = DebugDrawQueue::new();
        queue.add_debug_draw(DebugDraw::marker("a", "m", Vec4::repeat(1.0), Vec3::zeros()));
        assert_eq!(queue.draws().len(), 1);

        queue.begin_frame();
        assert!(queue.draws().is_empty());
    }
}
