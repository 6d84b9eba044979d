//! Scalar interpolation and damping helpers.
//!
//! Angles are radians throughout.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Vector lerp with `t` clamped to `[0, 1]`.
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a.lerp(b, t.clamp(0.0, 1.0))
}

/// Round to three decimal places.
pub fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Shortest signed difference from `current` to `target`, in `(-PI, PI]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = (target - current).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    delta
}

/// Critically damped spring toward `target`.
///
/// `velocity` is carried between calls by the caller. The result never
/// overshoots the target.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = (output - target) / dt;
    }
    output
}

/// [`smooth_damp`] along the shortest arc between two headings.
pub fn smooth_damp_angle(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Clamp an angle to `[min, max]` after folding a single turn out of it.
pub fn clamp_angle(mut angle: f32, min: f32, max: f32) -> f32 {
    if angle < -TAU {
        angle += TAU;
    }
    if angle > TAU {
        angle -= TAU;
    }
    angle.clamp(min, max)
}
