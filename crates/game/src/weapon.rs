//! Aim-down-sights revolver: crosshair bloom, fire gating, magazine and
//! hit-scan shots.

use engine_core::{lerp, Vec3};
use physics::{ColliderHandle, PhysicsQuery, RaycastHit};
use rand::Rng;

use crate::config::WeaponConfig;

/// Aim timer and crosshair scale. The scale doubles as shot inaccuracy.
#[derive(Debug, Clone)]
pub struct AimState {
    pub aiming: bool,
    /// Seconds spent aiming since the last reset.
    pub aim_time: f32,
    pub crosshair_scale: f32,
}

impl AimState {
    pub fn new(config: &WeaponConfig) -> Self {
        Self {
            aiming: false,
            aim_time: 0.0,
            crosshair_scale: config.initial_crosshair_scale,
        }
    }

    /// The crosshair is only drawn while aiming.
    pub fn crosshair_visible(&self) -> bool {
        self.aiming
    }

    /// Tighten toward the minimum scale while aiming; snap back otherwise.
    pub fn update(&mut self, aim: bool, config: &WeaponConfig, dt: f32) {
        self.aiming = aim;
        if !aim {
            self.reset(config);
            return;
        }
        self.aim_time += dt;
        self.crosshair_scale = lerp(
            self.crosshair_scale,
            config.min_crosshair_scale,
            dt * config.aim_shrink_speed,
        )
        .max(config.min_crosshair_scale)
        .min(config.initial_crosshair_scale);
    }

    pub fn reset(&mut self, config: &WeaponConfig) {
        self.aim_time = 0.0;
        self.crosshair_scale = config.initial_crosshair_scale;
    }
}

/// Six-shooter with a fire delay and instant reload.
#[derive(Debug, Clone)]
pub struct Revolver {
    pub magazine_size: u32,
    current_ammo: u32,
    /// Seconds since the last shot.
    pub since_last_shot: f32,
}

impl Revolver {
    pub fn new(config: &WeaponConfig) -> Self {
        Self {
            magazine_size: config.max_ammo,
            current_ammo: config.max_ammo,
            since_last_shot: config.fire_delay,
        }
    }

    pub fn ammo(&self) -> u32 {
        self.current_ammo
    }

    pub fn is_empty(&self) -> bool {
        self.current_ammo == 0
    }

    pub fn update(&mut self, dt: f32) {
        self.since_last_shot += dt;
    }

    /// Check if the revolver can fire.
    pub fn can_fire(&self, config: &WeaponConfig) -> bool {
        self.current_ammo > 0 && self.since_last_shot >= config.fire_delay
    }

    /// Fire a round, consuming ammo.
    pub fn fire(&mut self, config: &WeaponConfig) -> bool {
        if !self.can_fire(config) {
            return false;
        }
        self.current_ammo -= 1;
        self.since_last_shot = 0.0;
        true
    }

    /// Refill the cylinder. Returns false if it was already full.
    pub fn reload(&mut self) -> bool {
        if self.current_ammo >= self.magazine_size {
            return false;
        }
        self.current_ammo = self.magazine_size;
        true
    }

    pub fn ammo_display(&self) -> String {
        format!("{} / {}", self.current_ammo, self.magazine_size)
    }
}

/// Perturb `forward` by up to `scale * jitter` on each axis.
pub fn jittered_direction<R: Rng>(forward: Vec3, scale: f32, jitter: f32, rng: &mut R) -> Vec3 {
    let spread = scale.abs();
    let mut axis = || rng.gen_range(-spread..=spread) * jitter;
    let offset = Vec3::new(axis(), axis(), axis());
    let direction = (forward + offset).normalize_or_zero();
    if direction == Vec3::ZERO {
        forward
    } else {
        direction
    }
}

/// Outcome of one hit-scan shot.
#[derive(Debug, Clone, Copy)]
pub struct Shot {
    pub origin: Vec3,
    pub direction: Vec3,
    pub hit: Option<RaycastHit>,
    /// Impact point, or the end of the ray on a miss.
    pub end: Vec3,
}

/// Fire a hitscan ray, ignoring the shooter's own collider.
pub fn fire_hitscan(
    physics: &dyn PhysicsQuery,
    origin: Vec3,
    direction: Vec3,
    range: f32,
    shooter: Option<ColliderHandle>,
) -> Shot {
    let hit = physics.raycast(origin, direction, range, shooter);
    let end = hit.map_or(origin + direction * range, |h| h.point);
    Shot {
        origin,
        direction,
        hit,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use physics::{Layer, PhysicsWorld};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn crosshair_shrinks_while_aiming_and_resets() {
        let config = WeaponConfig::default();
        let mut aim = AimState::new(&config);
        let mut previous = aim.crosshair_scale;
        for _ in 0..600 {
            aim.update(true, &config, DT);
            assert!(aim.crosshair_scale <= previous);
            assert!(aim.crosshair_scale >= config.min_crosshair_scale);
            previous = aim.crosshair_scale;
        }
        assert!(aim.crosshair_scale < 0.8);
        assert!(aim.crosshair_visible());

        aim.update(false, &config, DT);
        assert_eq!(aim.crosshair_scale, config.initial_crosshair_scale);
        assert_eq!(aim.aim_time, 0.0);
        assert!(!aim.crosshair_visible());
    }

    #[test]
    fn inverted_crosshair_bounds_do_not_panic() {
        let config = WeaponConfig {
            min_crosshair_scale: 1.2,
            initial_crosshair_scale: 1.0,
            ..WeaponConfig::default()
        };
        let mut aim = AimState::new(&config);
        for _ in 0..10 {
            aim.update(true, &config, DT);
        }
        assert_eq!(aim.crosshair_scale, config.initial_crosshair_scale);
    }

    #[test]
    fn fire_delay_gates_shots() {
        let config = WeaponConfig::default();
        let mut gun = Revolver::new(&config);
        assert!(gun.fire(&config), "ready on spawn");
        assert!(!gun.fire(&config));

        gun.update(0.49);
        assert!(!gun.fire(&config));
        gun.update(0.02);
        assert!(gun.fire(&config));
        assert_eq!(gun.ammo(), 4);
    }

    #[test]
    fn empty_gun_refuses_and_reload_refills() {
        let config = WeaponConfig::default();
        let mut gun = Revolver::new(&config);
        assert!(!gun.reload(), "already full");
        for _ in 0..6 {
            gun.update(1.0);
            assert!(gun.fire(&config));
        }
        assert!(gun.is_empty());
        gun.update(1.0);
        assert!(!gun.fire(&config));
        assert_eq!(gun.ammo_display(), "0 / 6");

        assert!(gun.reload());
        assert_eq!(gun.ammo(), 6);
    }

    #[test]
    fn jitter_stays_within_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let forward = Vec3::Z;
        for _ in 0..500 {
            let d = jittered_direction(forward, 1.25, 0.01, &mut rng);
            assert_relative_eq!(d.length(), 1.0, epsilon = 1e-5);
            // 1.25 * 0.01 per axis before renormalizing
            assert!(d.x.abs() <= 0.013);
            assert!(d.y.abs() <= 0.013);
            assert!(d.z > 0.99);
        }
    }

    #[test]
    fn hitscan_reports_wall_or_range_end() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::new(0.0, 1.0, 10.0), 0.0, Vec3::new(5.0, 5.0, 0.5));
        let shooter = world.add_agent_capsule(Vec3::ZERO, 0.6, 0.3, Layer::Player);

        let origin = Vec3::new(0.0, 1.0, 0.0);
        let shot = fire_hitscan(&world, origin, Vec3::Z, 100.0, Some(shooter));
        let hit = shot.hit.expect("wall in front");
        assert_relative_eq!(hit.distance, 9.5, epsilon = 1e-3);
        assert_eq!(shot.end, hit.point);

        let miss = fire_hitscan(&world, origin, -Vec3::Z, 100.0, Some(shooter));
        assert!(miss.hit.is_none());
        assert_relative_eq!(miss.end.z, -100.0, epsilon = 1e-4);
    }
}
