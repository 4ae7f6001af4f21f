//! Perspective camera and screen-space picking
//!
//! Standard right-handed Y-up view space with an OpenGL style projection.
//! Screen coordinates are pixels with the origin at the top-left corner.

use crate::foundation::collections::ObjectId;
use crate::foundation::math::{Mat4, Point3, Vec3, Vec4};
use crate::physics::collision::Ray;
use crate::physics::{CollisionGroups, DynamicsWorld};

/// Size of the view the pointer lives in, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp a screen position into `[0, width] x [0, height]`
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (x.clamp(0.0, self.width.max(0.0)), y.clamp(0.0, self.height.max(0.0)))
    }

    /// Convert screen coordinates to Normalized Device Coordinates
    ///
    /// X: -1 = left, +1 = right. Y: +1 = top, -1 = bottom.
    pub fn to_ndc(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some((x / self.width * 2.0 - 1.0, 1.0 - y / self.height * 2.0))
    }

    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Result of tracing the pointer into a collision world
#[derive(Debug, Clone, Copy)]
pub struct TraceResult {
    /// Hit point, or the point at the maximum trace distance on a miss
    pub position: Vec3,
    /// Object that was hit, if any
    pub object: Option<ObjectId>,
}

/// Perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians
    pub fov: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    pub fn perspective(position: Vec3, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            target: Vec3::zeros(),
            up: Vec3::y(),
            fov: fov_degrees.to_radians(),
            near,
            far,
        }
    }

    /// Builder: point the camera at `target`
    #[must_use]
    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// World to view transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(self.position), &Point3::from(self.target), &self.up)
    }

    /// View to clip transform for a given aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        nalgebra::Perspective3::new(aspect, self.fov, self.near, self.far).to_homogeneous()
    }

    /// Ray from the camera through a screen position
    ///
    /// `None` when the viewport is empty or the camera matrices are singular.
    pub fn screen_to_world_ray(&self, screen_x: f32, screen_y: f32, viewport: Viewport) -> Option<Ray> {
        let (ndc_x, ndc_y) = viewport.to_ndc(screen_x, screen_y)?;

        let view_proj = self.projection_matrix(viewport.aspect()) * self.view_matrix();
        let inv_view_proj = view_proj.try_inverse()?;

        let unproject = |z: f32| {
            let h = inv_view_proj * Vec4::new(ndc_x, ndc_y, z, 1.0);
            h.xyz() / h.w
        };
        let direction = unproject(1.0) - unproject(-1.0);
        if direction.magnitude_squared() <= f32::EPSILON {
            return None;
        }

        Some(Ray::new(self.position, direction))
    }

    /// Trace a screen position into `world`, limited to `max_distance`
    ///
    /// The world is always passed explicitly; the camera never picks one.
    /// A miss resolves to the point `max_distance` along the ray.
    pub fn trace_screen_to_world(
        &self,
        screen_x: f32,
        screen_y: f32,
        viewport: Viewport,
        world: &DynamicsWorld,
        filter: (CollisionGroups, CollisionGroups),
        max_distance: f32,
    ) -> Option<TraceResult> {
        let ray = self.screen_to_world_ray(screen_x, screen_y, viewport)?;
        let (group, mask) = filter;

        let result = match world.ray_test(&ray, group, mask) {
            Some(hit) if hit.distance <= max_distance => TraceResult {
                position: hit.point,
                object: Some(hit.object),
            },
            _ => TraceResult {
                position: ray.point_at(max_distance),
                object: None,
            },
        };
        Some(result)
    }
}

impl Default for Camera {
    /// Above and behind the origin, looking at it
    fn default() -> Self {
        Self::perspective(Vec3::new(0.0, 3.0, 3.0), 60.0, 0.1, 1000.0)
    }
}
