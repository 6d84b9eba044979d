//! Transform component and heading helpers.
//!
//! Conventions: Y is up and +Z is forward at yaw 0. A yaw of `θ` radians faces
//! `(sin θ, 0, cos θ)`, so `atan2(dir.x, dir.z)` recovers the yaw of a direction.

use glam::{Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform at `position` facing `yaw` radians around Y.
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_rotation_y(yaw),
            ..Default::default()
        }
    }

    /// Forward direction (+Z rotated by the transform).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Current heading around Y in radians.
    pub fn yaw(&self) -> f32 {
        yaw_of(self.forward())
    }

    /// Replace the rotation with a pure heading.
    pub fn set_yaw(&mut self, yaw: f32) {
        self.rotation = Quat::from_rotation_y(yaw);
    }

    /// Face along `direction` projected onto the ground plane. Degenerate
    /// directions leave the rotation untouched.
    pub fn face_flat(&mut self, direction: Vec3) {
        let flat = flatten(direction);
        if flat.length_squared() > 1e-6 {
            self.set_yaw(yaw_of(flat));
        }
    }

    /// Express a world point in this transform's local frame.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        let local = self.rotation.inverse() * (point - self.position);
        local / self.scale
    }
}

/// Heading of a direction around Y, in radians.
pub fn yaw_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

/// Unit direction for a heading around Y.
pub fn direction_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Drop the vertical component and renormalise (zero if degenerate).
pub fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}
