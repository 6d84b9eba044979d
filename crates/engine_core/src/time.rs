//! Fixed-step accumulator for the simulation loop.

use std::time::Duration;

/// Upper bound on fixed steps consumed per frame so a long stall cannot spiral.
const MAX_STEPS_PER_FRAME: u32 = 8;

/// Turns variable frame durations into whole fixed simulation steps.
///
/// Feed each frame's length through [`Time::advance`], then drain
/// [`Time::should_fixed_update`].
#[derive(Debug)]
pub struct Time {
    /// Fixed timestep for simulation ticks (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
    /// Fixed steps consumed during the current frame.
    steps_this_frame: u32,
}

impl Default for Time {
    fn default() -> Self {
        Self::with_fixed_rate(60.0)
    }
}

impl Time {
    /// Create a time manager ticking at `hz` fixed steps per second.
    pub fn with_fixed_rate(hz: f64) -> Self {
        Self {
            fixed_timestep: Duration::from_secs_f64(1.0 / hz.max(1.0)),
            accumulator: Duration::ZERO,
            steps_this_frame: 0,
        }
    }

    /// Advance by one frame's duration.
    pub fn advance(&mut self, delta: Duration) {
        self.accumulator += delta;
        self.steps_this_frame = 0;
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.steps_this_frame >= MAX_STEPS_PER_FRAME {
            if self.accumulator >= self.fixed_timestep {
                log::warn!(
                    "Dropping {:.3}s of simulation time after {} steps this frame",
                    self.accumulator.as_secs_f32(),
                    self.steps_this_frame
                );
            }
            self.accumulator = Duration::ZERO;
            return false;
        }
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}
