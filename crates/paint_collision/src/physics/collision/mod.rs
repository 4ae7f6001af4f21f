//! Collision geometry
//!
//! Shapes are stored in model space and only transformed to world space while
//! a test runs.
//!
//! - [`primitives`] - Basic geometric primitives (rays, spheres, triangles, boxes)
//! - [`mesh`] - Shared triangle meshes and their world-space copies
//! - [`shape`] - Shapes attached to world objects and the mesh conversion step

pub mod mesh;
pub mod primitives;
pub mod shape;

pub use mesh::{TriangleMesh, WorldSpaceCollisionMesh};
pub use primitives::{Aabb, BoundingSphere, Ray, Triangle};
pub use shape::{build_scaled_mesh_shape, CollisionShape, ScaledMeshShape, ShapeError, SphereShape, WorldSpaceShape};
