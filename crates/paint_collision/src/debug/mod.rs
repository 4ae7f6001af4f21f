//! Debug visualization

pub mod draw;

pub use draw::{DebugDraw, DebugDrawQueue, DebugDrawSink};
