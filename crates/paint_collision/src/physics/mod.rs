//! Collision world and geometry

pub mod collision;
pub mod collision_groups;
pub mod dynamics_world;

pub use collision_groups::{CollisionFlags, CollisionGroups};
pub use dynamics_world::{CollisionObject, DynamicsWorld, ObjectHandle, ObjectKind, RayTestHit, WorldStats};
