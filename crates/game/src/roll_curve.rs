//! Roll easing: maps normalized roll time to normalized distance covered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("keyframe curve needs at least two keys, got {0}")]
    TooFewKeys(usize),
    #[error("keyframe curve must start at (0, 0) and end at (1, 1)")]
    NotNormalized,
    #[error("keyframe {0} does not advance in time or goes backwards in distance")]
    NotMonotonic(usize),
}

/// Progress → distance curve for a dodge roll.
///
/// Every profile maps 0 to 0 and 1 to 1 and never decreases, so summing the
/// per-tick differences over a whole roll yields exactly the roll distance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum RollProfile {
    /// Smoothstep: slow out of the crouch, slow into the recovery.
    #[default]
    EaseInOut,
    Linear,
    /// Piecewise-linear `(time, distance)` keys.
    Keyframes(Vec<(f32, f32)>),
}

impl RollProfile {
    pub fn validate(&self) -> Result<(), CurveError> {
        let Self::Keyframes(keys) = self else {
            return Ok(());
        };
        if keys.len() < 2 {
            return Err(CurveError::TooFewKeys(keys.len()));
        }
        let (first, last) = (keys[0], keys[keys.len() - 1]);
        if first != (0.0, 0.0) || last != (1.0, 1.0) {
            return Err(CurveError::NotNormalized);
        }
        for (i, pair) in keys.windows(2).enumerate() {
            if pair[1].0 <= pair[0].0 || pair[1].1 < pair[0].1 {
                return Err(CurveError::NotMonotonic(i + 1));
            }
        }
        Ok(())
    }

    /// Distance fraction at time fraction `t` (clamped to `[0, 1]`).
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
            Self::Linear => t,
            Self::Keyframes(keys) => {
                let Some(i) = keys.iter().position(|&(time, _)| time >= t) else {
                    return keys.last().map_or(t, |k| k.1);
                };
                if i == 0 {
                    return keys[0].1;
                }
                let (t0, v0) = keys[i - 1];
                let (t1, v1) = keys[i];
                v0 + (v1 - v0) * (t - t0) / (t1 - t0)
            }
        }
    }
}
