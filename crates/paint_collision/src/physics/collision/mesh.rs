//! Triangle mesh collision geometry
//!
//! A [`TriangleMesh`] is stored once in MODEL SPACE and shared between every
//! shape that wraps it. World-space copies are produced on demand for
//! narrowphase tests and dropped straight after.

use crate::foundation::math::{Isometry3, Vec3};
use super::primitives::{Aabb, BoundingSphere, Ray, Triangle};

/// Model-space triangle soup used as the collision representation of a mesh asset
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    local_aabb: Aabb,
}

impl TriangleMesh {
    /// Build a mesh from MODEL SPACE vertices and a triangle-list index buffer
    ///
    /// Trailing indices that do not form a full triangle and indices that point
    /// past the vertex buffer are skipped.
    pub fn from_vertices(vertices: &[Vec3], indices: &[u32]) -> Self {
        let triangles: Vec<Triangle> = indices
            .chunks_exact(3)
            .filter_map(|chunk| {
                let v0 = vertices.get(chunk[0] as usize)?;
                let v1 = vertices.get(chunk[1] as usize)?;
                let v2 = vertices.get(chunk[2] as usize)?;
                Some(Triangle::new(*v0, *v1, *v2))
            })
            .collect();

        Self::from_triangles(triangles)
    }

    /// Build a mesh directly from model-space triangles
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let local_aabb = Aabb::from_points(triangles.iter().flat_map(|t| [t.v0, t.v1, t.v2]))
            .unwrap_or_else(|| Aabb::new(Vec3::zeros(), Vec3::zeros()));
        Self {
            triangles,
            local_aabb,
        }
    }

    /// Model-space triangles
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Model-space bounds
    pub const fn local_aabb(&self) -> Aabb {
        self.local_aabb
    }

    /// World-space bounds after scaling and placing the mesh
    ///
    /// Transforms the eight corners of the scaled local box, so the result is
    /// conservative under rotation.
    pub fn world_aabb(&self, isometry: &Isometry3, scale: &Vec3) -> Aabb {
        let Aabb { min, max } = self.local_aabb;
        let corners = (0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            isometry.transform_vector(&corner.component_mul(scale)) + isometry.translation.vector
        });
        Aabb::from_points(corners).unwrap_or(self.local_aabb)
    }

    /// Produce a temporary world-space copy for narrowphase tests
    pub fn to_world_space(&self, isometry: &Isometry3, scale: &Vec3) -> WorldSpaceCollisionMesh {
        WorldSpaceCollisionMesh {
            triangles: self
                .triangles
                .iter()
                .map(|tri| tri.transformed(isometry, scale))
                .collect(),
            bounds: self.world_aabb(isometry, scale),
        }
    }
}

/// World-space collision mesh (temporary, created on demand for collision tests)
#[derive(Debug)]
pub struct WorldSpaceCollisionMesh {
    /// Triangles in world space
    pub triangles: Vec<Triangle>,
    /// Bounds in world space
    pub bounds: Aabb,
}

impl WorldSpaceCollisionMesh {
    /// Test ray intersection against all triangles in the mesh
    /// Returns closest hit (t, hit_point, normal) if any triangle is hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        self.bounds.intersect_ray(ray)?;

        self.triangles
            .iter()
            .filter_map(|tri| tri.intersect_ray(ray).map(|(t, _, _)| (t, tri)))
            .min_by(|(ta, _), (tb, _)| ta.total_cmp(tb))
            .map(|(t, tri)| (t, ray.point_at(t), tri.normal()))
    }

    /// Test sphere intersection against the mesh
    /// Returns (contact_point, normal, penetration) for the first touching triangle
    pub fn intersect_sphere(&self, sphere: &BoundingSphere) -> Option<(Vec3, Vec3, f32)> {
        if !self.bounds.intersects(&sphere.aabb()) {
            return None;
        }

        self.triangles.iter().find_map(|tri| {
            let closest = tri.closest_point(sphere.center);
            let dist_sq = (closest - sphere.center).magnitude_squared();
            (dist_sq <= sphere.radius * sphere.radius)
                .then(|| (closest, tri.normal(), sphere.radius - dist_sq.sqrt()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    fn quad() -> TriangleMesh {
        let vertices = [
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
        ];
        TriangleMesh::from_vertices(&vertices, &[0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_from_vertices_skips_partial_and_out_of_range() {
        let vertices = [Vec3::zeros(), Vec3::x(), Vec3::y()];
        let mesh = TriangleMesh::from_vertices(&vertices, &[0, 1, 2, 0, 1, 9, 2]);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_world_aabb_applies_scale_then_translation() {
        let iso = Isometry3::translation(5.0, 0.0, 0.0);
        let aabb = quad().world_aabb(&iso, &Vec3::new(2.0, 1.0, 3.0));
        assert_relative_eq!(aabb.min, Vec3::new(3.0, 0.0, -3.0), epsilon = 1e-5);
        assert_relative_eq!(aabb.max, Vec3::new(7.0, 0.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_world_space_ray_hits_rotated_quad() {
        // Stand the floor quad up so it faces +Z
        let rotation = Quat::from_axis_angle(&Vec3::x_axis(), std::f32::consts::FRAC_PI_2);
        let iso = Isometry3::from_parts(Vec3::new(0.0, 0.0, -4.0).into(), rotation);
        let world = quad().to_world_space(&iso, &Vec3::new(1.0, 1.0, 1.0));

        let ray = Ray::new(Vec3::new(0.3, 0.5, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let (t, point, _) = world.intersect_ray(&ray).expect("should hit quad");
        assert_relative_eq!(t, 4.0, epsilon = 1e-4);
        assert_relative_eq!(point, Vec3::new(0.3, 0.5, -4.0), epsilon = 1e-4);
    }

    #[test]
    fn test_sphere_against_mesh() {
        let world = quad().to_world_space(&Isometry3::identity(), &Vec3::new(1.0, 1.0, 1.0));
        let touching = BoundingSphere::new(Vec3::new(0.5, 0.5, 0.0), 1.0);
        let hovering = BoundingSphere::new(Vec3::new(0.5, 3.0, 0.0), 1.0);

        let (_, _, depth) = world.intersect_sphere(&touching).expect("sphere touches quad");
        assert_relative_eq!(depth, 0.5, epsilon = 1e-5);
        assert!(world.intersect_sphere(&hovering).is_none());
    }
}
