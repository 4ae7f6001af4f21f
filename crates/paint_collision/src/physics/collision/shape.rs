//! Collision shapes attached to world objects
//!
//! Shapes are stored in model space and transformed to world space on demand
//! during collision tests. Mesh shapes share their triangle data with the
//! source asset and only add a per-instance scale.

use std::sync::Arc;

use thiserror::Error;

use crate::assets::StaticMesh;
use crate::foundation::math::{Isometry3, Vec3};
use super::mesh::{TriangleMesh, WorldSpaceCollisionMesh};
use super::primitives::{Aabb, BoundingSphere, Ray};

/// Errors raised while converting assets into collision shapes
#[derive(Error, Debug)]
pub enum ShapeError {
    /// The mesh asset carries no triangle collision representation
    #[error("Mesh '{mesh}' has no triangle collision data")]
    MissingTriangleMesh {
        /// Name of the offending asset
        mesh: String,
    },
}

/// Sphere shape with an explicit collision margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereShape {
    /// Implicit dimension of the sphere
    pub radius: f32,
    /// Collision margin; spheres use their whole radius as margin
    pub margin: f32,
}

/// Shared triangle mesh with a non-uniform per-instance scale
#[derive(Debug, Clone)]
pub struct ScaledMeshShape {
    /// Model-space triangles shared with the asset
    pub mesh: Arc<TriangleMesh>,
    /// Per-axis scale applied before the object transform
    pub scale: Vec3,
}

/// Collision shape types (stored in MODEL SPACE)
#[derive(Debug, Clone)]
pub enum CollisionShape {
    /// A sphere centred on the object origin
    Sphere(SphereShape),
    /// A scaled view of a shared triangle mesh
    ScaledTriangleMesh(ScaledMeshShape),
}

impl CollisionShape {
    /// Creates a sphere whose margin equals its radius
    pub const fn sphere(radius: f32) -> Self {
        Self::Sphere(SphereShape {
            radius,
            margin: radius,
        })
    }

    /// Update radius and margin of a sphere shape in place
    ///
    /// Returns `false` for non-sphere shapes.
    pub fn set_sphere_radius(&mut self, radius: f32) -> bool {
        match self {
            Self::Sphere(sphere) => {
                sphere.radius = radius;
                sphere.margin = radius;
                true
            }
            Self::ScaledTriangleMesh(_) => false,
        }
    }

    /// World-space bounds for the broadphase
    pub fn world_aabb(&self, isometry: &Isometry3) -> Aabb {
        match self {
            Self::Sphere(sphere) => Aabb::from_center_extents(
                isometry.translation.vector,
                Vec3::repeat(sphere.radius.max(sphere.margin)),
            ),
            Self::ScaledTriangleMesh(shape) => shape.mesh.world_aabb(isometry, &shape.scale),
        }
    }

    /// Transform this shape to world space for narrowphase testing
    pub fn to_world_space(&self, isometry: &Isometry3) -> WorldSpaceShape {
        match self {
            Self::Sphere(sphere) => WorldSpaceShape::Sphere(BoundingSphere::new(
                isometry.translation.vector,
                sphere.radius,
            )),
            Self::ScaledTriangleMesh(shape) => {
                WorldSpaceShape::Mesh(shape.mesh.to_world_space(isometry, &shape.scale))
            }
        }
    }
}

/// Wrap a mesh asset's triangle data with a non-uniform scale
///
/// A new shape is produced on every call; the triangle data itself stays
/// shared with the asset. A zero scale axis flattens the mesh but still
/// yields a usable shape.
pub fn build_scaled_mesh_shape(mesh: &StaticMesh, scale: Vec3) -> Result<CollisionShape, ShapeError> {
    let triangles = mesh
        .triangle_mesh()
        .ok_or_else(|| ShapeError::MissingTriangleMesh {
            mesh: mesh.name().to_string(),
        })?;

    Ok(CollisionShape::ScaledTriangleMesh(ScaledMeshShape {
        mesh: Arc::clone(triangles),
        scale,
    }))
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug)]
pub enum WorldSpaceShape {
    /// World-space sphere
    Sphere(BoundingSphere),
    /// World-space mesh
    Mesh(WorldSpaceCollisionMesh),
}

impl WorldSpaceShape {
    /// Test ray intersection with this collision shape
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        match self {
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
            Self::Mesh(mesh) => mesh.intersect_ray(ray),
        }
    }

    /// Test if this shape intersects with another shape
    pub fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => a.intersects(b),
            (Self::Sphere(sphere), Self::Mesh(mesh)) | (Self::Mesh(mesh), Self::Sphere(sphere)) => {
                mesh.intersect_sphere(sphere).is_some()
            }
            // Mesh proxies are filtered out of each other's pairs
            (Self::Mesh(_), Self::Mesh(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_build_shares_triangles_with_asset() {
        let asset = StaticMesh::cube("box");
        let shape = build_scaled_mesh_shape(&asset, Vec3::new(1.0, 2.0, 3.0)).expect("cube has geometry");

        let CollisionShape::ScaledTriangleMesh(scaled) = shape else {
            panic!("expected a mesh shape");
        };
        assert!(Arc::ptr_eq(&scaled.mesh, asset.triangle_mesh().expect("geometry")));
        assert_relative_eq!(scaled.scale, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_build_without_geometry_fails() {
        let asset = StaticMesh::without_collision("decal");
        let err = build_scaled_mesh_shape(&asset, Vec3::repeat(1.0)).unwrap_err();
        assert!(matches!(err, ShapeError::MissingTriangleMesh { ref mesh } if mesh == "decal"));
    }

    #[test]
    fn test_build_accepts_flattened_scale() {
        let asset = StaticMesh::quad("floor");
        let shape = build_scaled_mesh_shape(&asset, Vec3::new(5.0, 0.0, 5.0)).expect("flat floor is valid");

        let bounds = shape.world_aabb(&Isometry3::identity());
        assert_relative_eq!(bounds.min, Vec3::new(-5.0, 0.0, -5.0), epsilon = 1e-5);
        assert_relative_eq!(bounds.max, Vec3::new(5.0, 0.0, 5.0), epsilon = 1e-5);

        let sphere = CollisionShape::sphere(1.0).to_world_space(&Isometry3::translation(4.0, 0.5, 4.0));
        assert!(shape.to_world_space(&Isometry3::identity()).intersects(&sphere));
    }

    #[test]
    fn test_sphere_radius_update_keeps_margin_in_step() {
        let mut shape = CollisionShape::sphere(0.5);
        assert!(shape.set_sphere_radius(2.0));
        let CollisionShape::Sphere(sphere) = shape else {
            panic!("expected a sphere");
        };
        assert_relative_eq!(sphere.radius, 2.0);
        assert_relative_eq!(sphere.margin, 2.0);
    }

    #[test]
    fn test_sphere_against_scaled_cube() {
        let asset = StaticMesh::cube("box");
        let cube = build_scaled_mesh_shape(&asset, Vec3::repeat(2.0)).expect("geometry");
        let probe = CollisionShape::sphere(1.0);

        let cube_world = cube.to_world_space(&Isometry3::identity());
        // Cube face sits at x = 2 after scaling
        let near = probe.to_world_space(&Isometry3::translation(2.5, 0.0, 0.0));
        let far = probe.to_world_space(&Isometry3::translation(3.5, 0.0, 0.0));
        assert!(cube_world.intersects(&near));
        assert!(!cube_world.intersects(&far));
    }

    #[test]
    fn test_meshes_never_report_contact_with_each_other() {
        let asset = StaticMesh::cube("box");
        let cube = build_scaled_mesh_shape(&asset, Vec3::repeat(1.0)).expect("geometry");

        let a = cube.to_world_space(&Isometry3::identity());
        let b = cube.to_world_space(&Isometry3::translation(0.5, 0.0, 0.0));
        assert!(!a.intersects(&b));
    }
}
