//! Keeps the collision world in step with the live scene
//!
//! Each frame the synchronizer walks the visible mesh nodes, creates proxies
//! for new nodes, rebuilds proxies whose mesh or transform moved, retires
//! proxies whose node was not seen, moves the probe and steps the world.
//!
//! Every object added to the world is removed before its shape is released
//! and before the object itself is destroyed.

use std::sync::Arc;

use crate::assets::StaticMesh;
use crate::config::PaintConfig;
use crate::foundation::collections::{NodeId, ObjectId};
use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision::{build_scaled_mesh_shape, CollisionShape};
use crate::physics::{CollisionFlags, CollisionGroups, DynamicsWorld, ObjectKind};
use crate::scene::{MeshInstance, PaintScene};
use super::probe::Probe;
use super::registry::{CollisionProxy, ProxyRegistry};

/// Lifetime counters of a synchronizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Proxies created for newly seen nodes
    pub proxies_created: u64,
    /// Proxies rebuilt in place after a change
    pub proxies_rebuilt: u64,
    /// Proxies torn down (stale, destroyed or failed rebuild)
    pub proxies_retired: u64,
    /// Mesh shapes built successfully
    pub shapes_built: u64,
    /// Mesh shape conversions that failed
    pub shape_failures: u64,
}

/// Owns the auxiliary collision world, the proxy registry and the probe
#[derive(Debug)]
pub struct ProxySynchronizer {
    world: DynamicsWorld,
    registry: ProxyRegistry,
    /// Only `None` while being dropped
    probe: Option<Probe>,
    change_epsilon: f32,
    step_seconds: f32,
    stats: SyncStats,
}

impl ProxySynchronizer {
    /// Create the world and the probe from `config`
    pub fn new(config: &PaintConfig) -> Self {
        let mut world = DynamicsWorld::new(config.world.bounds(), config.world.octree.clone());
        let probe = Probe::new(&mut world, config.probe_radius);
        Self {
            world,
            registry: ProxyRegistry::new(),
            probe: Some(probe),
            change_epsilon: config.change_epsilon,
            step_seconds: config.step_seconds,
            stats: SyncStats::default(),
        }
    }

    /// Reconcile the world with `scene` and step it
    ///
    /// Without a scene only the inactive marking happens: proxies are kept,
    /// the probe stays put and the world is not stepped.
    pub fn update(&mut self, scene: Option<&dyn PaintScene>) {
        self.registry.mark_all_inactive();

        let Some(scene) = scene else {
            log::trace!("No scene this frame, skipping reconciliation");
            return;
        };

        scene.visit_visible_meshes(&mut |instance| self.reconcile(instance));

        for proxy in self.registry.drain_inactive() {
            log::debug!("Retiring proxy for node {:?} (no longer visible)", proxy.node());
            self.retire(proxy);
        }

        if let Some(probe) = self.probe.as_mut() {
            probe.reposition(&mut self.world);
        }
        self.world.step(self.step_seconds);
    }

    /// Tear down the proxy of a destroyed node right away
    ///
    /// Untracked nodes are ignored, so repeated notifications are harmless.
    pub fn handle_node_destroy(&mut self, node: NodeId) {
        if let Some(proxy) = self.registry.remove(node) {
            log::debug!("Retiring proxy for destroyed node {node:?}");
            self.retire(proxy);
        }
    }

    /// Nodes whose proxies overlapped the probe at the last step, in world order
    pub fn query_overlaps(&self) -> Vec<NodeId> {
        self.resolve(self.probe.as_ref().map(|p| p.query_overlaps(&self.world)))
    }

    /// Overlapping nodes whose geometry actually touches the probe sphere
    pub fn query_contacts(&self) -> Vec<NodeId> {
        self.resolve(self.probe.as_ref().map(|p| p.query_contacts(&self.world)))
    }

    /// Where the probe goes on the next update
    pub fn probe_target(&self) -> Option<Vec3> {
        self.probe.as_ref().map(|p| *p.target())
    }

    /// Cache the probe target for the next update
    pub fn set_probe_target(&mut self, position: Vec3) {
        if let Some(probe) = self.probe.as_mut() {
            probe.set_target(position);
        }
    }

    /// Resize the probe; applied on the next update
    pub fn set_probe_radius(&mut self, radius: f32) {
        if let Some(probe) = self.probe.as_mut() {
            probe.set_radius(radius);
        }
    }

    /// Where the probe currently sits in the world
    pub fn probe_position(&self) -> Option<Vec3> {
        let object = self.world.object(self.probe_id()?)?;
        Some(object.world_transform().translation.vector)
    }

    /// Probe object id
    pub fn probe_id(&self) -> Option<ObjectId> {
        self.probe.as_ref().map(Probe::id)
    }

    /// The auxiliary collision world
    pub const fn world(&self) -> &DynamicsWorld {
        &self.world
    }

    /// Tracked proxies
    pub const fn registry(&self) -> &ProxyRegistry {
        &self.registry
    }

    /// Lifetime counters
    pub const fn stats(&self) -> SyncStats {
        self.stats
    }

    fn resolve(&self, objects: Option<Vec<ObjectId>>) -> Vec<NodeId> {
        objects
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| self.registry.node_for_object(object))
            .collect()
    }

    fn reconcile(&mut self, instance: MeshInstance<'_>) {
        let MeshInstance {
            node,
            mesh,
            world_transform,
        } = instance;

        let needs_rebuild = match self.registry.get_mut(node) {
            None => {
                self.create_proxy(node, mesh, &world_transform);
                return;
            }
            Some(proxy) => {
                proxy.mark_active();
                proxy.differs_from(mesh, &world_transform, self.change_epsilon)
            }
        };

        if needs_rebuild {
            self.rebuild_proxy(node, mesh, &world_transform);
        }
    }

    fn build_shape(&mut self, node: NodeId, mesh: &StaticMesh, scale: Vec3) -> Option<CollisionShape> {
        match build_scaled_mesh_shape(mesh, scale) {
            Ok(shape) => {
                self.stats.shapes_built += 1;
                Some(shape)
            }
            Err(err) => {
                self.stats.shape_failures += 1;
                log::debug!("Skipping node {node:?}: {err}");
                None
            }
        }
    }

    fn create_proxy(&mut self, node: NodeId, mesh: &Arc<StaticMesh>, transform: &Transform) {
        let Some(shape) = self.build_shape(node, mesh, transform.scale) else {
            return;
        };

        let object = self
            .world
            .create_object(ObjectKind::Collision, CollisionFlags::STATIC_OBJECT);
        self.world.set_shape(&object, shape);
        self.world.set_world_transform(&object, transform.to_isometry());
        let (group, mask) = CollisionGroups::PROXY_FILTER;
        self.world.add_object(&object, group, mask);

        log::debug!(
            "Created proxy {:?} for node {node:?} ('{}')",
            object.id(),
            mesh.name()
        );
        if let Some(stale) = self
            .registry
            .insert(CollisionProxy::new(node, transform, Arc::clone(mesh), object))
        {
            self.retire(stale);
        }
        self.stats.proxies_created += 1;
    }

    fn rebuild_proxy(&mut self, node: NodeId, mesh: &Arc<StaticMesh>, transform: &Transform) {
        let shape = self.build_shape(node, mesh, transform.scale);

        let Some(proxy) = self.registry.get_mut(node) else {
            return;
        };
        let object = proxy.object();
        self.world.remove_object(object);
        self.world.release_shape(object);

        match shape {
            Some(shape) => {
                self.world.set_shape(object, shape);
                self.world.set_world_transform(object, transform.to_isometry());
                let (group, mask) = CollisionGroups::PROXY_FILTER;
                self.world.add_object(object, group, mask);
                proxy.record_rebuild(mesh, transform);
                self.stats.proxies_rebuilt += 1;
                log::trace!("Rebuilt proxy for node {node:?}");
            }
            None => {
                // Retried as a new node next frame
                if let Some(proxy) = self.registry.remove(node) {
                    self.retire(proxy);
                }
            }
        }
    }

    fn retire(&mut self, proxy: CollisionProxy) {
        self.world.destroy_object(proxy.into_object());
        self.stats.proxies_retired += 1;
    }
}

impl Drop for ProxySynchronizer {
    fn drop(&mut self) {
        for proxy in self.registry.drain_all() {
            self.retire(proxy);
        }
        if let Some(probe) = self.probe.take() {
            probe.destroy(&mut self.world);
        }
        log::debug!("Paint collision world torn down ({:?})", self.world.stats());
    }
}
