//! What zombies can see and hear.
//!
//! Sight is a cone + range + line-of-sight ray. Hearing goes through a
//! [`SoundBus`]: sounds published during tick N are delivered to every
//! listener at the start of tick N+1, in publish order.

use engine_core::{Transform, Vec3};
use physics::{ColliderHandle, PhysicsQuery};

use crate::config::ZombieConfig;

/// Cone-shaped field of view anchored at the observer's eyes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionCone {
    pub range: f32,
    /// Half-angle in degrees.
    pub half_angle: f32,
    pub eye_height: f32,
}

impl VisionCone {
    pub fn from_config(config: &ZombieConfig) -> Self {
        Self {
            range: config.vision_range,
            half_angle: config.vision_angle,
            eye_height: config.eye_height,
        }
    }

    /// True if the target is strictly inside the cone, strictly within range
    /// and the first thing a ray from the eyes toward it hits is the target.
    /// Targets without a collider are never seen.
    pub fn can_see(
        &self,
        observer: &Transform,
        observer_collider: Option<ColliderHandle>,
        target_position: Vec3,
        target_collider: Option<ColliderHandle>,
        physics: &dyn PhysicsQuery,
    ) -> bool {
        let Some(target_collider) = target_collider else {
            return false;
        };
        let offset = target_position - observer.position;
        let distance = offset.length();
        if distance >= self.range || distance <= f32::EPSILON {
            return false;
        }
        let direction = offset / distance;
        let angle = observer.forward().angle_between(direction).to_degrees();
        if angle >= self.half_angle {
            return false;
        }

        let eyes = observer.position + Vec3::Y * self.eye_height;
        physics
            .raycast(eyes, direction, self.range, observer_collider)
            .is_some_and(|hit| hit.collider == target_collider)
    }
}

/// A noise that zombies may react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundEvent {
    pub position: Vec3,
    pub radius: f32,
    /// Simulation time the sound was made.
    pub timestamp: f32,
}

impl SoundEvent {
    /// Inclusive: a listener exactly on the radius hears it.
    pub fn audible_from(&self, listener: Vec3) -> bool {
        self.position.distance(listener) <= self.radius
    }
}

/// Buffered broadcast channel for [`SoundEvent`]s.
#[derive(Debug, Default)]
pub struct SoundBus {
    pending: Vec<SoundEvent>,
}

impl SoundBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, position: Vec3, radius: f32, timestamp: f32) {
        log::trace!("Sound at {:?} (radius {})", position, radius);
        self.pending.push(SoundEvent {
            position,
            radius,
            timestamp,
        });
    }

    /// Take everything published since the last flush.
    pub fn flush(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// A listener's memory of the most recent audible sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeardSound {
    pub position: Vec3,
    pub radius: f32,
    pub heard_at: f32,
    /// Cleared once the listener reaches the spot.
    pub active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Hearing {
    pub last: Option<HeardSound>,
}

impl Hearing {
    /// Overwrite the memory if `event` is audible at `listener`.
    pub fn hear(&mut self, event: &SoundEvent, listener: Vec3) -> bool {
        if !event.audible_from(listener) {
            return false;
        }
        self.last = Some(HeardSound {
            position: event.position,
            radius: event.radius,
            heard_at: event.timestamp,
            active: true,
        });
        true
    }

    /// Position of a sound still worth investigating.
    pub fn pending_target(&self) -> Option<Vec3> {
        self.last.filter(|s| s.active).map(|s| s.position)
    }

    pub fn resolve(&mut self) {
        if let Some(s) = &mut self.last {
            s.active = false;
        }
    }
}
