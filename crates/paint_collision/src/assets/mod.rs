//! Mesh assets referenced by scene nodes
//!
//! Only the part of a static mesh the collision world cares about is modelled
//! here: a name and the shared triangle collision representation.

use std::sync::Arc;

use crate::foundation::math::Vec3;
use crate::physics::collision::TriangleMesh;

/// A static mesh asset shared between scene nodes
///
/// Scene nodes hold `Arc<StaticMesh>`. Two nodes use "the same mesh" when their
/// `Arc`s point at the same allocation, see [`StaticMesh::same_asset`].
#[derive(Debug)]
pub struct StaticMesh {
    name: String,
    collision: Option<Arc<TriangleMesh>>,
}

impl StaticMesh {
    /// Create a mesh asset with a triangle collision representation
    pub fn new(name: impl Into<String>, collision: Arc<TriangleMesh>) -> Self {
        Self {
            name: name.into(),
            collision: Some(collision),
        }
    }

    /// Create a mesh asset that has no collision geometry (render-only)
    pub fn without_collision(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collision: None,
        }
    }

    /// Asset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared triangle collision data, if the asset was cooked with any
    pub const fn triangle_mesh(&self) -> Option<&Arc<TriangleMesh>> {
        self.collision.as_ref()
    }

    /// Pointer identity of two shared assets
    pub fn same_asset(a: &Arc<Self>, b: &Arc<Self>) -> bool {
        Arc::ptr_eq(a, b)
    }

    /// Axis-aligned cube of half-size 1 centred on the origin
    pub fn cube(name: impl Into<String>) -> Self {
        let vertices = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        #[rustfmt::skip]
        let indices = [
            0, 2, 1, 0, 3, 2, // -Z
            4, 5, 6, 4, 6, 7, // +Z
            0, 1, 5, 0, 5, 4, // -Y
            3, 6, 2, 3, 7, 6, // +Y
            0, 4, 7, 0, 7, 3, // -X
            1, 2, 6, 1, 6, 5, // +X
        ];
        Self::new(name, Arc::new(TriangleMesh::from_vertices(&vertices, &indices)))
    }

    /// Unit quad in the XZ plane facing +Y, half-size 1
    pub fn quad(name: impl Into<String>) -> Self {
        let vertices = [
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];
        Self::new(
            name,
            Arc::new(TriangleMesh::from_vertices(&vertices, &[0, 2, 1, 0, 3, 2])),
        )
    }
}
