//! Paint tool collision proxies
//!
//! Mirrors the visible meshes of a live scene into an auxiliary collision
//! world and answers "what is under the brush" with a sphere probe.
//!
//! - [`registry`] - per-node proxy bookkeeping
//! - [`probe`] - the sphere ghost volume
//! - [`synchronizer`] - per-frame reconciliation of scene and world
//! - [`reticle`] - pointer trace and marker
//! - [`manager`] - frame driver and trigger queries

pub mod manager;
pub mod probe;
pub mod registry;
pub mod reticle;
pub mod synchronizer;

#[cfg(test)]
mod tests;

pub use manager::{PaintFrame, PaintHits, PaintManager};
pub use probe::Probe;
pub use registry::{CollisionProxy, ProxyRegistry};
pub use reticle::PaintReticle;
pub use synchronizer::{ProxySynchronizer, SyncStats};
