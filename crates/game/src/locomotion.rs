//! Grounded/airborne bookkeeping: jump and fall timeouts, the dodge roll and
//! footstep cadence. Sits on top of [`MotorState`].

use engine_core::Vec3;
use input::PlayerInput;

use crate::config::PlayerConfig;
use crate::motor::{integrate_gravity, jump_velocity, MotorState, GROUNDED_BIAS};

/// Progress of an active roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roll {
    /// Seconds since the roll started.
    pub elapsed: f32,
    /// Distance already applied.
    pub covered: f32,
    /// Distance the full roll travels.
    pub total: f32,
}

impl Roll {
    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self, duration: f32) -> f32 {
        (self.elapsed / duration).clamp(0.0, 1.0)
    }
}

/// Discrete things that happened during a locomotion tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocomotionEvents {
    pub jumped: bool,
    pub landed: bool,
    pub roll_started: bool,
    pub roll_finished: bool,
    pub footstep: bool,
}

#[derive(Debug, Clone)]
pub struct LocomotionState {
    pub motor: MotorState,
    pub grounded: bool,
    /// Animator `Jump` flag.
    pub jumping: bool,
    /// Animator `FreeFall` flag.
    pub free_fall: bool,
    pub jump_timeout: f32,
    pub fall_timeout: f32,
    pub roll: Option<Roll>,
    /// Grounded travel since the last footstep.
    stride: f32,
}

impl LocomotionState {
    pub fn new(config: &PlayerConfig, yaw: f32) -> Self {
        Self {
            motor: MotorState::new(yaw),
            grounded: true,
            jumping: false,
            free_fall: false,
            jump_timeout: config.jump_timeout,
            fall_timeout: config.fall_timeout,
            roll: None,
            stride: 0.0,
        }
    }

    pub fn is_rolling(&self) -> bool {
        self.roll.is_some()
    }

    /// Jump acceptance, timeouts and gravity, using last tick's grounded state.
    ///
    /// A jump request stays latched while grounded until the timeout allows
    /// it, and is dropped as soon as the character is airborne.
    pub fn jump_and_gravity(&mut self, config: &PlayerConfig, jump: &mut bool, dt: f32) -> bool {
        let mut jumped = false;
        let motor = &mut self.motor;

        if self.grounded {
            self.fall_timeout = config.fall_timeout;
            self.jumping = false;
            self.free_fall = false;

            if motor.vertical_velocity < 0.0 {
                motor.vertical_velocity = GROUNDED_BIAS;
            }

            if self.jump_timeout <= 0.0 && PlayerInput::consume(jump) {
                motor.vertical_velocity = jump_velocity(config.jump_height, config.gravity);
                self.jumping = true;
                jumped = true;
            }

            if self.jump_timeout >= 0.0 {
                self.jump_timeout -= dt;
            }
        } else {
            self.jump_timeout = config.jump_timeout;

            if self.fall_timeout >= 0.0 {
                self.fall_timeout -= dt;
            } else {
                self.free_fall = true;
            }

            *jump = false;
        }

        motor.vertical_velocity = integrate_gravity(
            motor.vertical_velocity,
            config.gravity,
            config.terminal_velocity,
            dt,
        );
        jumped
    }

    /// Record this tick's ground probe. Returns true on touchdown.
    pub fn set_grounded(&mut self, grounded: bool) -> bool {
        let landed = grounded && !self.grounded;
        self.grounded = grounded;
        if landed {
            self.stride = 0.0;
        }
        landed
    }

    /// Advance an active roll or start one. Returns the roll displacement for
    /// this tick, applied separately from regular movement.
    pub fn update_roll(
        &mut self,
        config: &PlayerConfig,
        request: &mut bool,
        sprint: bool,
        events: &mut LocomotionEvents,
        dt: f32,
    ) -> Vec3 {
        let mut displacement = Vec3::ZERO;

        if let Some(roll) = &mut self.roll {
            *request = false;

            roll.elapsed += dt;
            let t = roll.progress(config.roll_duration);
            let target = config.roll_profile.evaluate(t) * roll.total;
            let delta = target - roll.covered;
            roll.covered = target;
            displacement = self.motor.move_direction() * delta;

            if t >= 1.0 {
                self.roll = None;
                events.roll_finished = true;
            }
            return displacement;
        }

        if PlayerInput::consume(request) {
            let speed = if sprint {
                config.sprint_speed
            } else {
                config.move_speed
            };
            self.roll = Some(Roll {
                elapsed: 0.0,
                covered: 0.0,
                total: config.roll_distance + speed / 2.0,
            });
            events.roll_started = true;
        }
        displacement
    }

    /// Accumulate grounded travel. Returns true each time a stride completes.
    pub fn advance_stride(&mut self, horizontal_travel: f32, interval: f32) -> bool {
        if !self.grounded || interval <= 0.0 {
            return false;
        }
        self.stride += horizontal_travel;
        if self.stride >= interval {
            self.stride -= interval;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll_curve::RollProfile;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const DT: f32 = 1.0 / 60.0;

    fn ready(config: &PlayerConfig) -> LocomotionState {
        let mut state = LocomotionState::new(config, 0.0);
        state.jump_timeout = 0.0;
        state
    }

    #[test]
    fn jump_needs_ground_and_timeout() {
        let config = PlayerConfig::default();
        let mut state = LocomotionState::new(&config, 0.0);
        let mut jump = true;

        assert!(!state.jump_and_gravity(&config, &mut jump, DT));
        assert!(jump, "request stays latched while the timeout runs");

        for _ in 0..40 {
            if state.jump_and_gravity(&config, &mut jump, DT) {
                break;
            }
        }
        assert!(!jump);
        assert!(state.jumping);
        assert!(state.motor.vertical_velocity > 5.0);
    }

    #[test]
    fn airborne_clears_jump_and_enters_free_fall() {
        let config = PlayerConfig::default();
        let mut state = ready(&config);
        state.set_grounded(false);
        let mut jump = true;
        state.jump_and_gravity(&config, &mut jump, DT);
        assert!(!jump);
        assert!(!state.free_fall);
        assert_eq!(state.jump_timeout, config.jump_timeout);

        for _ in 0..20 {
            state.jump_and_gravity(&config, &mut jump, DT);
        }
        assert!(state.free_fall);
    }

    #[test]
    fn grounded_velocity_is_biased_down() {
        let config = PlayerConfig::default();
        let mut state = ready(&config);
        state.motor.vertical_velocity = -20.0;
        state.jump_and_gravity(&config, &mut false, DT);
        assert_relative_eq!(state.motor.vertical_velocity, GROUNDED_BIAS + config.gravity * DT);
    }

    #[test]
    fn landing_fires_once() {
        let config = PlayerConfig::default();
        let mut state = LocomotionState::new(&config, 0.0);
        assert!(!state.set_grounded(true));
        assert!(!state.set_grounded(false));
        assert!(state.set_grounded(true));
        assert!(!state.set_grounded(true));
    }

    #[rstest]
    #[case(RollProfile::EaseInOut, false, 1.0 / 60.0)]
    #[case(RollProfile::Linear, true, 1.0 / 30.0)]
    #[case(RollProfile::EaseInOut, true, 0.07)]
    fn roll_covers_exact_distance(#[case] profile: RollProfile, #[case] sprint: bool, #[case] dt: f32) {
        let config = PlayerConfig {
            roll_profile: profile,
            ..Default::default()
        };
        let mut state = ready(&config);
        let mut request = true;
        let mut events = LocomotionEvents::default();

        let first = state.update_roll(&config, &mut request, sprint, &mut events, dt);
        assert_eq!(first, Vec3::ZERO);
        assert!(events.roll_started);
        assert!(!request);

        let mut total = Vec3::ZERO;
        let mut ticks = 0;
        while state.is_rolling() {
            request = true;
            total += state.update_roll(&config, &mut request, sprint, &mut events, dt);
            assert!(!request, "requests are swallowed mid-roll");
            ticks += 1;
            assert!(ticks < 1000);
        }
        let speed = if sprint { config.sprint_speed } else { config.move_speed };
        assert_relative_eq!(total.length(), config.roll_distance + speed / 2.0, epsilon = 1e-4);
        assert!(events.roll_finished);
    }

    #[test]
    fn footsteps_every_interval_on_ground() {
        let config = PlayerConfig::default();
        let mut state = LocomotionState::new(&config, 0.0);
        let steps = (0..100).filter(|_| state.advance_stride(0.25, 1.0)).count();
        assert_eq!(steps, 25);

        state.set_grounded(false);
        assert!(!state.advance_stride(5.0, 1.0));
    }
}
