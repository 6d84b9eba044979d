//! Third-person orbit camera: yaw/pitch around a follow target above the player.

use engine_core::{clamp_angle, Quat, Vec2, Vec3};

use crate::config::CameraConfig;

/// Look deltas with a squared length below this are ignored.
const LOOK_THRESHOLD: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct CameraRig {
    /// Yaw in radians; the move input's forward follows it.
    yaw: f32,
    /// Pitch in radians; positive looks down.
    pitch: f32,
    top_clamp: f32,
    bottom_clamp: f32,
    pub target_height: f32,
    pub distance: f32,
    /// Ignore look input (cutscenes, menus).
    pub locked: bool,
}

impl CameraRig {
    pub fn new(config: &CameraConfig, yaw: f32) -> Self {
        Self {
            yaw,
            pitch: 0.0,
            top_clamp: config.top_clamp.to_radians(),
            bottom_clamp: config.bottom_clamp.to_radians(),
            target_height: config.target_height,
            distance: config.distance,
            locked: false,
        }
    }

    /// Apply a look delta in degrees (x = yaw, y = pitch).
    pub fn process_look(&mut self, look: Vec2) {
        if look.length_squared() >= LOOK_THRESHOLD && !self.locked {
            self.yaw += look.x.to_radians();
            self.pitch += look.y.to_radians();
        }
        self.yaw = clamp_angle(self.yaw, f32::MIN, f32::MAX);
        self.pitch = clamp_angle(self.pitch, self.bottom_clamp, self.top_clamp);
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// Point the camera orbits, above the player's feet.
    pub fn target(&self, feet: Vec3) -> Vec3 {
        feet + Vec3::Y * self.target_height
    }

    /// Eye position on the boom behind the target.
    pub fn position(&self, feet: Vec3) -> Vec3 {
        self.target(feet) - self.forward() * self.distance
    }
}
