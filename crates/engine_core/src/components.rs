//! Common agent components shared by the player and the zombies.

use glam::Vec3;

/// Velocity component for moving agents.
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec3,
}

impl Velocity {
    /// Magnitude of the velocity projected onto the ground plane.
    pub fn horizontal_speed(&self) -> f32 {
        Vec3::new(self.linear.x, 0.0, self.linear.z).length()
    }
}

/// Health value for damageable agents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Subtract `amount` (negative amounts are ignored), clamping at zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Anything that can be hurt and killed.
///
/// The player and zombies implement this independently; attackers only ever
/// see this capability.
pub trait Damageable {
    fn take_damage(&mut self, amount: f32);
    fn is_dead(&self) -> bool;
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: f32) {
        Health::take_damage(self, amount);
    }

    fn is_dead(&self) -> bool {
        Health::is_dead(self)
    }
}

/// Countdown for transient things (tracer trails, debug markers).
#[derive(Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Tick down; returns true once expired.
    pub fn update(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}
