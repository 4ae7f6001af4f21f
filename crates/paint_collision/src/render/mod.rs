//! Camera and viewport

pub mod camera;

pub use camera::{Camera, TraceResult, Viewport};
