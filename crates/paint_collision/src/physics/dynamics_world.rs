//! Collision world holding mesh proxies and ghost volumes
//!
//! The world owns every collision object in a slot map and hands out
//! move-only [`ObjectHandle`]s. Objects only take part in queries while they
//! are *in* the world, between [`DynamicsWorld::add_object`] and
//! [`DynamicsWorld::remove_object`].
//!
//! Detection is split in two phases:
//! - broad-phase: an [`Octree`] of world bounds plus an overflow list for
//!   objects outside the configured world bounds
//! - narrow-phase: shape-vs-shape tests for rays and explicit contact queries
//!
//! Ghost objects keep a list of the objects whose bounds overlap theirs. The
//! list is rebuilt by [`DynamicsWorld::step`] and pruned immediately when an
//! overlapping object leaves the world. No dynamics are integrated.

use std::fmt;

use crate::foundation::collections::{ObjectId, SlotMap};
use crate::foundation::math::{Isometry3, Vec3};
use crate::physics::collision::{Aabb, CollisionShape, Ray};
use crate::physics::collision_groups::{CollisionFlags, CollisionGroups};
use crate::spatial::{Octree, OctreeConfig};

/// What a collision object is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Regular collision object (mesh proxies)
    Collision,
    /// Ghost volume that tracks its overlaps
    Ghost,
}

/// Owned handle to an object living in a [`DynamicsWorld`]
///
/// Handles cannot be cloned. Give the handle back through
/// [`DynamicsWorld::destroy_object`] to free the object.
#[must_use = "dropping an ObjectHandle leaks the object; pass it to DynamicsWorld::destroy_object"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    id: ObjectId,
}

impl ObjectHandle {
    /// Identifier used in query results
    pub const fn id(&self) -> ObjectId {
        self.id
    }
}

/// A collision object as stored by the world
#[derive(Debug)]
pub struct CollisionObject {
    kind: ObjectKind,
    flags: CollisionFlags,
    shape: Option<CollisionShape>,
    transform: Isometry3,
    membership: Option<Membership>,
    overlaps: Vec<ObjectId>,
}

/// Broadphase state of an object while it is in the world
#[derive(Debug, Clone, Copy)]
struct Membership {
    group: CollisionGroups,
    mask: CollisionGroups,
    bounds: Aabb,
    add_sequence: u64,
    in_tree: bool,
}

impl CollisionObject {
    /// Object kind
    pub const fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Behavior flags
    pub const fn flags(&self) -> CollisionFlags {
        self.flags
    }

    /// Attached shape
    pub const fn shape(&self) -> Option<&CollisionShape> {
        self.shape.as_ref()
    }

    /// Current world transform
    pub const fn world_transform(&self) -> &Isometry3 {
        &self.transform
    }

    /// Group and mask while in the world
    pub fn filter(&self) -> Option<(CollisionGroups, CollisionGroups)> {
        self.membership.map(|m| (m.group, m.mask))
    }

    /// World-space broadphase bounds while in the world
    pub fn world_aabb(&self) -> Option<Aabb> {
        self.membership.map(|m| m.bounds)
    }

    /// True between `add_object` and `remove_object`
    pub const fn is_in_world(&self) -> bool {
        self.membership.is_some()
    }
}

/// Closest narrowphase hit of a ray test
#[derive(Debug, Clone, Copy)]
pub struct RayTestHit {
    /// Object that was hit
    pub object: ObjectId,
    /// Distance along the ray
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
    /// Surface normal at the hit point
    pub normal: Vec3,
}

/// Lifetime counters of a world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Objects created
    pub objects_created: u64,
    /// Objects destroyed
    pub objects_destroyed: u64,
    /// Shapes attached to objects
    pub shapes_attached: u64,
    /// Shapes released from objects
    pub shapes_released: u64,
    /// Successful `add_object` calls
    pub adds: u64,
    /// Successful `remove_object` calls
    pub removes: u64,
    /// Steps taken
    pub steps: u64,
}

/// Collision world: object storage, broadphase and queries
pub struct DynamicsWorld {
    objects: SlotMap<ObjectId, CollisionObject>,
    broadphase: Octree,
    /// Objects whose bounds centre falls outside the octree
    overflow: Vec<ObjectId>,
    next_add_sequence: u64,
    stats: WorldStats,
}

impl fmt::Debug for DynamicsWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicsWorld")
            .field("objects", &self.objects.len())
            .field("in_broadphase", &self.broadphase.entity_count())
            .field("overflow", &self.overflow.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Report a broken usage contract: panic in debug builds, log in release builds
fn invariant_violation(message: fmt::Arguments<'_>) {
    if cfg!(debug_assertions) {
        panic!("{message}");
    }
    log::error!("{message}");
}

impl DynamicsWorld {
    /// Create an empty world covering `bounds`
    pub fn new(bounds: Aabb, octree: OctreeConfig) -> Self {
        log::debug!("Creating collision world with bounds {:?} .. {:?}", bounds.min, bounds.max);
        Self {
            objects: SlotMap::with_key(),
            broadphase: Octree::new(bounds, octree),
            overflow: Vec::new(),
            next_add_sequence: 0,
            stats: WorldStats::default(),
        }
    }

    /// Allocate an object with no shape at the origin, not yet in the world
    pub fn create_object(&mut self, kind: ObjectKind, flags: CollisionFlags) -> ObjectHandle {
        let id = self.objects.insert(CollisionObject {
            kind,
            flags,
            shape: None,
            transform: Isometry3::identity(),
            membership: None,
            overlaps: Vec::new(),
        });
        self.stats.objects_created += 1;
        log::trace!("Created {kind:?} object {id:?}");
        ObjectHandle { id }
    }

    /// Destroy an object: remove it from the world, release its shape, free its slot
    pub fn destroy_object(&mut self, handle: ObjectHandle) {
        if !self.objects.contains_key(handle.id) {
            invariant_violation(format_args!("destroy of stale object {:?}", handle.id));
            return;
        }

        if self.is_in_world(handle.id) {
            self.remove_object(&handle);
        }
        self.release_shape(&handle);

        if self.objects.remove(handle.id).is_some() {
            self.stats.objects_destroyed += 1;
            log::trace!("Destroyed object {:?}", handle.id);
        }
    }

    /// Attach a shape, returning the previously attached one
    pub fn set_shape(&mut self, handle: &ObjectHandle, shape: CollisionShape) -> Option<CollisionShape> {
        let Some(object) = self.objects.get_mut(handle.id) else {
            invariant_violation(format_args!("set_shape on stale object {:?}", handle.id));
            return None;
        };

        let previous = object.shape.replace(shape);
        self.stats.shapes_attached += 1;
        if previous.is_some() {
            self.stats.shapes_released += 1;
        }
        self.refresh_bounds(handle.id);
        previous
    }

    /// Detach and return the object's shape
    pub fn release_shape(&mut self, handle: &ObjectHandle) -> Option<CollisionShape> {
        if self.is_in_world(handle.id) {
            invariant_violation(format_args!(
                "shape of {:?} released while the object is in the world",
                handle.id
            ));
            return None;
        }

        let released = self.objects.get_mut(handle.id)?.shape.take();
        if released.is_some() {
            self.stats.shapes_released += 1;
        }
        released
    }

    /// Edit the attached shape in place; broadphase bounds are refreshed afterwards
    pub fn modify_shape(&mut self, handle: &ObjectHandle, edit: impl FnOnce(&mut CollisionShape)) -> bool {
        let Some(shape) = self.objects.get_mut(handle.id).and_then(|o| o.shape.as_mut()) else {
            return false;
        };
        edit(shape);
        self.refresh_bounds(handle.id);
        true
    }

    /// Move an object
    pub fn set_world_transform(&mut self, handle: &ObjectHandle, transform: Isometry3) {
        let Some(object) = self.objects.get_mut(handle.id) else {
            invariant_violation(format_args!("set_world_transform on stale object {:?}", handle.id));
            return;
        };
        object.transform = transform;
        self.refresh_bounds(handle.id);
    }

    /// Insert an object into the broadphase with the given filter
    pub fn add_object(&mut self, handle: &ObjectHandle, group: CollisionGroups, mask: CollisionGroups) {
        let id = handle.id;
        let Some(object) = self.objects.get_mut(id) else {
            invariant_violation(format_args!("add of stale object {id:?}"));
            return;
        };
        if object.membership.is_some() {
            invariant_violation(format_args!("object {id:?} is already in the world"));
            return;
        }
        let Some(shape) = object.shape.as_ref() else {
            invariant_violation(format_args!("object {id:?} added without a shape"));
            return;
        };

        let bounds = shape.world_aabb(&object.transform);
        let in_tree = self.broadphase.insert(id, bounds);
        if !in_tree {
            log::trace!("Object {id:?} outside world bounds, using overflow list");
            self.overflow.push(id);
        }

        object.membership = Some(Membership {
            group,
            mask,
            bounds,
            add_sequence: self.next_add_sequence,
            in_tree,
        });
        self.next_add_sequence += 1;
        self.stats.adds += 1;
    }

    /// Take an object out of the broadphase
    ///
    /// Ghosts drop their overlap list and the object is pruned from every
    /// other ghost's list straight away.
    pub fn remove_object(&mut self, handle: &ObjectHandle) {
        let id = handle.id;
        let Some(object) = self.objects.get_mut(id) else {
            invariant_violation(format_args!("remove of stale object {id:?}"));
            return;
        };
        let Some(membership) = object.membership.take() else {
            invariant_violation(format_args!("object {id:?} is not in the world"));
            return;
        };
        object.overlaps.clear();

        if membership.in_tree {
            self.broadphase.remove(id);
        } else {
            self.overflow.retain(|other| *other != id);
        }

        for (_, other) in &mut self.objects {
            if other.kind == ObjectKind::Ghost {
                other.overlaps.retain(|overlap| *overlap != id);
            }
        }
        self.stats.removes += 1;
    }

    /// Advance the world by `dt` seconds and refresh ghost overlap lists
    pub fn step(&mut self, dt: f32) {
        let ghosts: Vec<(ObjectId, Membership)> = self
            .objects
            .iter()
            .filter(|(_, o)| o.kind == ObjectKind::Ghost)
            .filter_map(|(id, o)| o.membership.map(|m| (id, m)))
            .collect();

        for (ghost_id, ghost) in ghosts {
            let mut overlaps: Vec<(u64, ObjectId)> = self
                .broadphase_candidates(&ghost.bounds)
                .into_iter()
                .filter(|other_id| *other_id != ghost_id)
                .filter_map(|other_id| {
                    let other = self.objects.get(other_id)?.membership?;
                    CollisionGroups::should_collide(ghost.group, ghost.mask, other.group, other.mask)
                        .then_some((other.add_sequence, other_id))
                })
                .collect();
            overlaps.sort_unstable_by_key(|(sequence, _)| *sequence);

            if let Some(object) = self.objects.get_mut(ghost_id) {
                object.overlaps = overlaps.into_iter().map(|(_, id)| id).collect();
            }
        }

        self.stats.steps += 1;
        log::trace!("Stepped collision world by {dt}s");
    }

    /// Overlap list of a ghost as of the last step; empty for anything else
    pub fn ghost_overlaps(&self, id: ObjectId) -> &[ObjectId] {
        self.objects
            .get(id)
            .map(|o| o.overlaps.as_slice())
            .unwrap_or_default()
    }

    /// Closest narrowphase hit along a ray among objects accepted by the filter
    pub fn ray_test(&self, ray: &Ray, group: CollisionGroups, mask: CollisionGroups) -> Option<RayTestHit> {
        let mut candidates = self.broadphase.query_ray(ray);
        candidates.extend(self.overflow.iter().copied().filter(|id| {
            self.objects
                .get(*id)
                .and_then(CollisionObject::world_aabb)
                .is_some_and(|bounds| bounds.intersect_ray(ray).is_some())
        }));

        candidates
            .into_iter()
            .filter_map(|id| {
                let object = self.objects.get(id)?;
                let (other_group, other_mask) = object.filter()?;
                if !CollisionGroups::should_collide(group, mask, other_group, other_mask) {
                    return None;
                }
                let world_shape = object.shape.as_ref()?.to_world_space(&object.transform);
                let (distance, point, normal) = world_shape.intersect_ray(ray)?;
                Some(RayTestHit {
                    object: id,
                    distance,
                    point,
                    normal,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Narrowphase test of two objects' shapes at their current transforms
    pub fn contact_test(&self, a: ObjectId, b: ObjectId) -> bool {
        let world_shape = |id: ObjectId| {
            let object = self.objects.get(id)?;
            Some(object.shape.as_ref()?.to_world_space(&object.transform))
        };
        match (world_shape(a), world_shape(b)) {
            (Some(shape_a), Some(shape_b)) => shape_a.intersects(&shape_b),
            _ => false,
        }
    }

    /// Look up an object
    pub fn object(&self, id: ObjectId) -> Option<&CollisionObject> {
        self.objects.get(id)
    }

    /// True if the object exists and is in the world
    pub fn is_in_world(&self, id: ObjectId) -> bool {
        self.objects.get(id).is_some_and(CollisionObject::is_in_world)
    }

    /// Number of live objects (in the world or not)
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of objects currently in the world
    pub fn objects_in_world(&self) -> usize {
        self.objects.values().filter(|o| o.is_in_world()).count()
    }

    /// Lifetime counters
    pub const fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Broadphase candidates overlapping `bounds`, tree and overflow combined
    fn broadphase_candidates(&self, bounds: &Aabb) -> Vec<ObjectId> {
        let mut candidates = self.broadphase.query_aabb(bounds);
        candidates.extend(self.overflow.iter().copied().filter(|id| {
            self.objects
                .get(*id)
                .and_then(CollisionObject::world_aabb)
                .is_some_and(|other| other.intersects(bounds))
        }));
        candidates
    }

    /// Recompute bounds and re-file an object that is in the world
    fn refresh_bounds(&mut self, id: ObjectId) {
        let Some(object) = self.objects.get_mut(id) else {
            return;
        };
        let (Some(membership), Some(shape)) = (object.membership.as_mut(), object.shape.as_ref()) else {
            return;
        };

        let bounds = shape.world_aabb(&object.transform);
        if membership.in_tree {
            self.broadphase.remove(id);
        } else {
            self.overflow.retain(|other| *other != id);
        }
        membership.bounds = bounds;
        membership.in_tree = self.broadphase.insert(id, bounds);
        if !membership.in_tree {
            self.overflow.push(id);
        }
    }
}
