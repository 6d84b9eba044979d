//! Kinematic motor: speed blending, heading, gravity and the ground probe.
//!
//! Functions here are pure over their inputs so the controller can compose
//! them in tick order. Angles are radians.

use engine_core::{
    direction_from_yaw, flatten, lerp, round3, smooth_damp_angle, yaw_of, Transform, Vec2, Vec3,
};
use physics::{CollisionLayers, Layer, PhysicsQuery};

use crate::config::PlayerConfig;

/// Vertical velocity held while grounded so the character stays glued to slopes.
pub const GROUNDED_BIAS: f32 = -2.0;

/// Speeds within this of the target snap to it instead of easing.
pub const SPEED_OFFSET: f32 = 0.1;

/// Blend values below this read as standing still.
const BLEND_EPSILON: f32 = 0.01;

/// Movement intent for one tick, already resolved against the camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveIntent {
    pub move_input: Vec2,
    pub sprint: bool,
    pub aim: bool,
    pub analog: bool,
    /// Camera heading; input `y` is forward along it.
    pub camera_yaw: f32,
}

impl MoveIntent {
    /// 1 for digital input, the stick deflection for analog input.
    pub fn input_magnitude(&self) -> f32 {
        if self.analog {
            self.move_input.length().min(1.0)
        } else {
            1.0
        }
    }
}

/// Speed the character is trying to reach this tick.
pub fn target_speed(config: &PlayerConfig, intent: &MoveIntent) -> f32 {
    if intent.move_input == Vec2::ZERO {
        return 0.0;
    }
    let speed = if intent.sprint {
        config.sprint_speed
    } else {
        config.move_speed
    };
    if intent.aim {
        speed * 0.5
    } else {
        speed
    }
}

/// Ease `current` toward `target * magnitude`, snapping once within [`SPEED_OFFSET`].
pub fn approach_speed(current: f32, target: f32, magnitude: f32, rate: f32, dt: f32) -> f32 {
    if current < target - SPEED_OFFSET || current > target + SPEED_OFFSET {
        round3(lerp(current, target * magnitude, dt * rate))
    } else {
        target
    }
}

/// Launch speed that peaks at `height` under `gravity`.
pub fn jump_velocity(height: f32, gravity: f32) -> f32 {
    (height * -2.0 * gravity).max(0.0).sqrt()
}

/// Apply gravity for one tick, keeping the magnitude under `terminal`.
pub fn integrate_gravity(vertical: f32, gravity: f32, terminal: f32, dt: f32) -> f32 {
    (vertical + gravity * dt).clamp(-terminal, terminal)
}

/// Center of the ground probe sphere for feet at `position`.
pub fn ground_probe(position: Vec3, config: &PlayerConfig) -> Vec3 {
    Vec3::new(position.x, position.y - config.grounded_offset, position.z)
}

/// Sphere overlap against the environment layer only.
pub fn check_grounded(physics: &dyn PhysicsQuery, position: Vec3, config: &PlayerConfig) -> bool {
    physics.overlap_sphere(
        ground_probe(position, config),
        config.grounded_radius,
        CollisionLayers::from(Layer::Environment),
    )
}

/// Horizontal and vertical motion state carried between ticks.
#[derive(Debug, Clone, Default)]
pub struct MotorState {
    /// Horizontal speed commanded this tick.
    pub speed: f32,
    /// Smoothed speed for the animator.
    pub animation_blend: f32,
    /// Heading of the last non-zero move input.
    pub target_yaw: f32,
    yaw_velocity: f32,
    pub vertical_velocity: f32,
}

impl MotorState {
    pub fn new(yaw: f32) -> Self {
        Self {
            target_yaw: yaw,
            ..Default::default()
        }
    }

    /// Direction the character travels, whatever it faces.
    pub fn move_direction(&self) -> Vec3 {
        direction_from_yaw(self.target_yaw)
    }

    /// One tick of planar movement. Turns `transform` toward the movement
    /// heading unless aiming and returns the world displacement to apply,
    /// vertical velocity included.
    pub fn step(
        &mut self,
        config: &PlayerConfig,
        intent: &MoveIntent,
        current_horizontal_speed: f32,
        transform: &mut Transform,
        dt: f32,
    ) -> Vec3 {
        let target = target_speed(config, intent);
        self.speed = approach_speed(
            current_horizontal_speed,
            target,
            intent.input_magnitude(),
            config.speed_change_rate,
            dt,
        );

        self.animation_blend = lerp(self.animation_blend, target, dt * config.speed_change_rate);
        if self.animation_blend < BLEND_EPSILON {
            self.animation_blend = 0.0;
        }

        if intent.move_input != Vec2::ZERO {
            let input_direction = Vec3::new(intent.move_input.x, 0.0, intent.move_input.y);
            self.target_yaw = yaw_of(input_direction) + intent.camera_yaw;
            let yaw = smooth_damp_angle(
                transform.yaw(),
                self.target_yaw,
                &mut self.yaw_velocity,
                config.rotation_smooth_time,
                dt,
            );
            if !intent.aim {
                transform.set_yaw(yaw);
            }
        }

        self.move_direction() * (self.speed * dt) + Vec3::Y * (self.vertical_velocity * dt)
    }
}

/// Turn toward the camera's flattened forward at `rate` per second.
pub fn face_toward(transform: &mut Transform, camera_forward: Vec3, rate: f32, dt: f32) {
    let target = flatten(camera_forward);
    if target == Vec3::ZERO {
        return;
    }
    let blended = transform.forward().lerp(target, (dt * rate).clamp(0.0, 1.0));
    transform.face_flat(blended);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::f32::consts::FRAC_PI_2;

    const DT: f32 = 1.0 / 60.0;

    fn forward(sprint: bool, aim: bool) -> MoveIntent {
        MoveIntent {
            move_input: Vec2::Y,
            sprint,
            aim,
            ..Default::default()
        }
    }

    #[rstest]
    #[case(false, false, 2.0)]
    #[case(true, false, 5.335)]
    #[case(false, true, 1.0)]
    #[case(true, true, 2.6675)]
    fn target_speed_by_mode(#[case] sprint: bool, #[case] aim: bool, #[case] expected: f32) {
        let config = PlayerConfig::default();
        assert_relative_eq!(target_speed(&config, &forward(sprint, aim)), expected);
    }

    #[test]
    fn no_input_targets_zero() {
        let config = PlayerConfig::default();
        assert_eq!(target_speed(&config, &MoveIntent::default()), 0.0);
    }

    #[test]
    fn speed_snaps_inside_offset() {
        assert_eq!(approach_speed(1.95, 2.0, 1.0, 10.0, DT), 2.0);
        let eased = approach_speed(0.0, 2.0, 1.0, 10.0, DT);
        assert!(eased > 0.0 && eased < 2.0);
        assert_eq!(eased, round3(eased));
    }

    #[test]
    fn speed_converges_monotonically() {
        let mut speed = 0.0;
        for _ in 0..120 {
            let next = approach_speed(speed, 5.335, 1.0, 10.0, DT);
            assert!(next >= speed);
            speed = next;
        }
        assert_eq!(speed, 5.335);
    }

    #[test]
    fn jump_reaches_configured_height() {
        let v = jump_velocity(1.2, -15.0);
        assert_relative_eq!(v, 6.0, epsilon = 1e-5);
        // v² / 2g
        assert_relative_eq!(v * v / 30.0, 1.2, epsilon = 1e-5);
    }

    #[test]
    fn gravity_respects_terminal_velocity() {
        let mut v = 0.0;
        for _ in 0..1000 {
            v = integrate_gravity(v, -15.0, 53.0, DT);
            assert!(v.abs() <= 53.0);
        }
        assert_eq!(v, -53.0);
    }

    #[test]
    fn heading_follows_camera_and_input() {
        let config = PlayerConfig::default();
        let mut state = MotorState::new(0.0);
        let mut transform = Transform::default();
        let intent = MoveIntent {
            move_input: Vec2::X,
            camera_yaw: 0.0,
            ..Default::default()
        };
        for _ in 0..120 {
            state.step(&config, &intent, state.speed, &mut transform, DT);
        }
        assert_relative_eq!(state.target_yaw, FRAC_PI_2, epsilon = 1e-5);
        assert_relative_eq!(transform.yaw(), FRAC_PI_2, epsilon = 1e-2);
        assert_relative_eq!(state.move_direction().x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn aiming_keeps_facing_but_moves() {
        let config = PlayerConfig::default();
        let mut state = MotorState::new(0.0);
        let mut transform = Transform::default();
        let intent = MoveIntent {
            move_input: Vec2::X,
            aim: true,
            ..Default::default()
        };
        let displacement = state.step(&config, &intent, 1.0, &mut transform, DT);
        assert_relative_eq!(transform.yaw(), 0.0);
        assert!(displacement.x > 0.0, "strafes toward the input");
    }

    #[test]
    fn face_toward_ignores_vertical() {
        let mut transform = Transform::default();
        for _ in 0..200 {
            face_toward(&mut transform, Vec3::new(1.0, -0.8, 0.0), 10.0, DT);
        }
        assert_relative_eq!(transform.forward().x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(transform.forward().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn blend_settles_to_zero() {
        let config = PlayerConfig::default();
        let mut state = MotorState::new(0.0);
        state.animation_blend = 2.0;
        let mut transform = Transform::default();
        for _ in 0..200 {
            state.step(&config, &MoveIntent::default(), 0.0, &mut transform, DT);
        }
        assert_eq!(state.animation_blend, 0.0);
        assert_eq!(state.speed, 0.0);
    }
}
