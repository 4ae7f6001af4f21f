//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the transform and tolerance helpers used
//! by the collision proxies.

pub use nalgebra::{Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = nalgebra::Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Rigid transform (rotation + translation) used for collision objects
pub type Isometry3 = nalgebra::Isometry3<f32>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Builder: replace the scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Builder: replace the rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Rigid part of the transform; scale is carried by collision shapes
    pub fn to_isometry(&self) -> Isometry3 {
        Isometry3::from_parts(self.position.into(), self.rotation)
    }

    /// Combine this (parent) transform with a child transform
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            position: self.position + self.rotation * self.scale.component_mul(&other.position),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

/// Component-wise tolerance checks used for change detection.
///
/// A pair of values is considered different as soon as one component differs
/// by `epsilon` or more. Exact float equality would rebuild proxies on every
/// bit of floating-point noise coming out of the scene's world transforms.
/// A NaN difference always counts as a change.
pub mod tolerance {
    use super::{Quat, Vec3};

    fn component_differs(x: f32, y: f32, epsilon: f32) -> bool {
        let delta = (x - y).abs();
        delta.is_nan() || delta >= epsilon
    }

    /// True if any component of `a` and `b` differs by at least `epsilon`
    pub fn vec3_differs(a: &Vec3, b: &Vec3, epsilon: f32) -> bool {
        a.iter().zip(b.iter()).any(|(x, y)| component_differs(*x, *y, epsilon))
    }

    /// True if any quaternion coordinate of `a` and `b` differs by at least `epsilon`
    ///
    /// Compares raw coordinates, so `q` and `-q` count as different.
    pub fn quat_differs(a: &Quat, b: &Quat, epsilon: f32) -> bool {
        a.coords
            .iter()
            .zip(b.coords.iter())
            .any(|(x, y)| component_differs(*x, *y, epsilon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_combine_applies_parent_scale_and_rotation() {
        let parent = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
            Vec3::new(2.0, 2.0, 2.0),
        );
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let world = parent.combine(&child);

        // (1,0,0) scaled by 2 then rotated 90 degrees about +Y lands on -Z
        assert_relative_eq!(world.position, Vec3::new(10.0, 0.0, -2.0), epsilon = 1e-5);
        assert_relative_eq!(world.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_vec3_differs_threshold_is_inclusive() {
        let a = Vec3::zeros();
        assert!(!tolerance::vec3_differs(&a, &Vec3::new(0.5e-5, 0.0, 0.0), 1e-5));
        assert!(tolerance::vec3_differs(&a, &Vec3::new(0.0, 2e-5, 0.0), 1e-5));
    }

    #[test]
    fn test_quat_differs() {
        let a = Quat::identity();
        let b = Quat::from_axis_angle(&Vec3::z_axis(), 1e-7);
        let c = Quat::from_axis_angle(&Vec3::z_axis(), 0.1);
        assert!(!tolerance::quat_differs(&a, &b, 1e-5));
        assert!(tolerance::quat_differs(&a, &c, 1e-5));
    }

    #[test]
    fn test_non_finite_values_count_as_changed() {
        let a = Vec3::zeros();
        assert!(tolerance::vec3_differs(&a, &Vec3::new(f32::NAN, 0.0, 0.0), 1e-5));
        assert!(tolerance::vec3_differs(&Vec3::repeat(f32::INFINITY), &Vec3::repeat(f32::INFINITY), 1e-5));

        let broken = Quat::new_unchecked(Quaternion::new(f32::NAN, 0.0, 0.0, 0.0));
        assert!(tolerance::quat_differs(&Quat::identity(), &broken, 1e-5));
    }
}
