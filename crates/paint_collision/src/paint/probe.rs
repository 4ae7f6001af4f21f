//! The paint probe: a sphere ghost volume following the reticle
//!
//! The probe lives in its own reserved collision group so it pairs with mesh
//! proxies but is never picked by the reticle trace. It is pulled out of the
//! world, moved and re-added once per frame.

use crate::foundation::collections::ObjectId;
use crate::foundation::math::{Isometry3, Vec3};
use crate::physics::collision::CollisionShape;
use crate::physics::{CollisionFlags, CollisionGroups, DynamicsWorld, ObjectHandle, ObjectKind};

/// Sphere ghost object used for overlap queries
#[derive(Debug)]
pub struct Probe {
    object: ObjectHandle,
    radius: f32,
    target: Vec3,
}

impl Probe {
    /// Create the probe at the origin and add it to `world`
    pub fn new(world: &mut DynamicsWorld, radius: f32) -> Self {
        let object = world.create_object(ObjectKind::Ghost, CollisionFlags::NO_CONTACT_RESPONSE);
        world.set_shape(&object, CollisionShape::sphere(radius));
        let (group, mask) = CollisionGroups::PROBE_FILTER;
        world.add_object(&object, group, mask);
        log::debug!("Paint probe {:?} created with radius {radius}", object.id());

        Self {
            object,
            radius,
            target: Vec3::zeros(),
        }
    }

    /// Ghost object id
    pub const fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// Position the probe moves to on the next reposition
    pub const fn target(&self) -> &Vec3 {
        &self.target
    }

    /// Cache a new target position
    pub fn set_target(&mut self, position: Vec3) {
        self.target = position;
    }

    /// Probe radius
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Change the radius; applied on the next reposition
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Move the probe to its target with identity rotation
    ///
    /// Removes the ghost, updates transform, radius and margin, then re-adds
    /// it with the probe filter.
    pub fn reposition(&mut self, world: &mut DynamicsWorld) {
        if world.is_in_world(self.object.id()) {
            world.remove_object(&self.object);
        }
        world.set_world_transform(&self.object, Isometry3::translation(self.target.x, self.target.y, self.target.z));

        let radius = self.radius;
        world.modify_shape(&self.object, |shape| {
            shape.set_sphere_radius(radius);
        });

        let (group, mask) = CollisionGroups::PROBE_FILTER;
        world.add_object(&self.object, group, mask);
    }

    /// Objects whose bounds overlapped the probe at the last step
    pub fn query_overlaps(&self, world: &DynamicsWorld) -> Vec<ObjectId> {
        world.ghost_overlaps(self.object.id()).to_vec()
    }

    /// Overlaps confirmed by a narrowphase sphere test
    pub fn query_contacts(&self, world: &DynamicsWorld) -> Vec<ObjectId> {
        world
            .ghost_overlaps(self.object.id())
            .iter()
            .copied()
            .filter(|other| world.contact_test(self.object.id(), *other))
            .collect()
    }

    /// Remove the probe from the world and destroy it
    pub fn destroy(self, world: &mut DynamicsWorld) {
        log::debug!("Paint probe {:?} destroyed", self.object.id());
        world.destroy_object(self.object);
    }
}
