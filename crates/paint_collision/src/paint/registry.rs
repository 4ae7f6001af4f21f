//! Per-node collision proxy bookkeeping
//!
//! The registry maps scene nodes to the collision objects that mirror them and
//! keeps the reverse map needed to turn overlap results back into nodes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::StaticMesh;
use crate::foundation::collections::{NodeId, ObjectId};
use crate::foundation::math::{tolerance, Quat, Transform, Vec3};
use crate::physics::ObjectHandle;

/// Collision mirror of one visible mesh-bearing node
#[derive(Debug)]
pub struct CollisionProxy {
    node: NodeId,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
    mesh: Arc<StaticMesh>,
    object: ObjectHandle,
    active: bool,
}

impl CollisionProxy {
    /// Create an active proxy for `node` backed by `object`
    pub fn new(node: NodeId, transform: &Transform, mesh: Arc<StaticMesh>, object: ObjectHandle) -> Self {
        Self {
            node,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
            mesh,
            object,
            active: true,
        }
    }

    /// Owning scene node
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// World position the shape was last built at
    pub const fn position(&self) -> &Vec3 {
        &self.position
    }

    /// World rotation the shape was last built at
    pub const fn rotation(&self) -> &Quat {
        &self.rotation
    }

    /// World scale baked into the shape
    pub const fn scale(&self) -> &Vec3 {
        &self.scale
    }

    /// Mesh asset the shape was built from
    pub const fn mesh(&self) -> &Arc<StaticMesh> {
        &self.mesh
    }

    /// Collision object backing this proxy
    pub const fn object(&self) -> &ObjectHandle {
        &self.object
    }

    /// Seen during the current reconciliation pass
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Flag the proxy as seen this pass
    pub fn mark_active(&mut self) {
        self.active = true;
    }

    /// True if the mesh identity changed or any transform component moved by `epsilon` or more
    pub fn differs_from(&self, mesh: &Arc<StaticMesh>, transform: &Transform, epsilon: f32) -> bool {
        !StaticMesh::same_asset(&self.mesh, mesh)
            || tolerance::vec3_differs(&self.position, &transform.position, epsilon)
            || tolerance::quat_differs(&self.rotation, &transform.rotation, epsilon)
            || tolerance::vec3_differs(&self.scale, &transform.scale, epsilon)
    }

    /// Record the values a rebuilt shape was made from
    pub fn record_rebuild(&mut self, mesh: &Arc<StaticMesh>, transform: &Transform) {
        self.mesh = Arc::clone(mesh);
        self.position = transform.position;
        self.rotation = transform.rotation;
        self.scale = transform.scale;
    }

    /// Give up the proxy, returning the object handle for destruction
    pub fn into_object(self) -> ObjectHandle {
        self.object
    }
}

/// At most one proxy per node, plus an object-to-node back reference
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    proxies: HashMap<NodeId, CollisionProxy>,
    by_object: HashMap<ObjectId, NodeId>,
}

impl ProxyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a proxy; returns the proxy previously held for the same node
    pub fn insert(&mut self, proxy: CollisionProxy) -> Option<CollisionProxy> {
        let previous = self.remove(proxy.node);
        self.by_object.insert(proxy.object.id(), proxy.node);
        self.proxies.insert(proxy.node, proxy);
        previous
    }

    /// Erase and return the proxy of `node`
    pub fn remove(&mut self, node: NodeId) -> Option<CollisionProxy> {
        let proxy = self.proxies.remove(&node)?;
        self.by_object.remove(&proxy.object.id());
        Some(proxy)
    }

    /// Proxy of `node`
    pub fn get(&self, node: NodeId) -> Option<&CollisionProxy> {
        self.proxies.get(&node)
    }

    /// Proxy of `node`, mutably
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut CollisionProxy> {
        self.proxies.get_mut(&node)
    }

    /// True if `node` is tracked
    pub fn contains(&self, node: NodeId) -> bool {
        self.proxies.contains_key(&node)
    }

    /// Node mirrored by a collision object
    pub fn node_for_object(&self, object: ObjectId) -> Option<NodeId> {
        self.by_object.get(&object).copied()
    }

    /// Start a reconciliation pass
    pub fn mark_all_inactive(&mut self) {
        for proxy in self.proxies.values_mut() {
            proxy.active = false;
        }
    }

    /// Erase and return every proxy not seen this pass
    pub fn drain_inactive(&mut self) -> Vec<CollisionProxy> {
        let stale: Vec<NodeId> = self
            .proxies
            .values()
            .filter(|p| !p.active)
            .map(|p| p.node)
            .collect();
        stale.into_iter().filter_map(|node| self.remove(node)).collect()
    }

    /// Erase and return every proxy
    pub fn drain_all(&mut self) -> Vec<CollisionProxy> {
        self.by_object.clear();
        self.proxies.drain().map(|(_, proxy)| proxy).collect()
    }

    /// Tracked nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.proxies.keys().copied()
    }

    /// All proxies, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &CollisionProxy> {
        self.proxies.values()
    }

    /// Number of tracked proxies
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// True when no proxies are tracked
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::SlotMap;
    use crate::physics::collision::Aabb;
    use crate::physics::{CollisionFlags, DynamicsWorld, ObjectKind};
    use crate::spatial::OctreeConfig;

    fn fixture() -> (DynamicsWorld, SlotMap<NodeId, ()>, Arc<StaticMesh>) {
        let world = DynamicsWorld::new(Aabb::new(Vec3::repeat(-10.0), Vec3::repeat(10.0)), OctreeConfig::default());
        (world, SlotMap::with_key(), Arc::new(StaticMesh::cube("cube")))
    }

    #[test]
    fn test_back_reference_follows_insert_and_remove() {
        let (mut world, mut nodes, mesh) = fixture();
        let node = nodes.insert(());
        let object = world.create_object(ObjectKind::Collision, CollisionFlags::STATIC_OBJECT);
        let object_id = object.id();

        let mut registry = ProxyRegistry::new();
        registry.insert(CollisionProxy::new(node, &Transform::identity(), mesh, object));
        assert_eq!(registry.node_for_object(object_id), Some(node));

        let proxy = registry.remove(node).expect("tracked");
        assert_eq!(registry.node_for_object(object_id), None);
        world.destroy_object(proxy.into_object());
    }

    #[test]
    fn test_drain_inactive_only_takes_unseen() {
        let (mut world, mut nodes, mesh) = fixture();
        let mut registry = ProxyRegistry::new();
        let seen = nodes.insert(());
        let unseen = nodes.insert(());
        for node in [seen, unseen] {
            let object = world.create_object(ObjectKind::Collision, CollisionFlags::STATIC_OBJECT);
            registry.insert(CollisionProxy::new(node, &Transform::identity(), Arc::clone(&mesh), object));
        }

        registry.mark_all_inactive();
        registry.get_mut(seen).expect("tracked").mark_active();
        let drained = registry.drain_inactive();

        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].node(), unseen);
        assert!(registry.contains(seen));
        for proxy in drained.into_iter().chain(registry.drain_all()) {
            world.destroy_object(proxy.into_object());
        }
    }

    #[test]
    fn test_differs_from_uses_epsilon_and_mesh_identity() {
        let (mut world, mut nodes, mesh) = fixture();
        let object = world.create_object(ObjectKind::Collision, CollisionFlags::STATIC_OBJECT);
        let proxy = CollisionProxy::new(nodes.insert(()), &Transform::identity(), Arc::clone(&mesh), object);

        let nudged = Transform::from_position(Vec3::new(0.5e-5, 0.0, 0.0));
        let moved = Transform::from_position(Vec3::new(1e-4, 0.0, 0.0));
        assert!(!proxy.differs_from(&mesh, &nudged, 1e-5));
        assert!(proxy.differs_from(&mesh, &moved, 1e-5));

        let twin = Arc::new(StaticMesh::cube("cube"));
        assert!(proxy.differs_from(&twin, &Transform::identity(), 1e-5));

        world.destroy_object(proxy.into_object());
    }
}
