//! Handle types for slot-map backed storage

pub use slotmap::{Key, KeyData, SlotMap};

slotmap::new_key_type! {
    /// Identity of a node in the scene graph
    pub struct NodeId;

    /// Identity of a collision object inside a [`DynamicsWorld`](crate::physics::DynamicsWorld)
    pub struct ObjectId;
}
