//! Tracer trails for hit-scan shots.
//!
//! A trail lives on its own once spawned: it sweeps from the muzzle to the
//! impact point over its duration, rests at the impact for the same duration,
//! then despawns, whatever happens to the shooter meanwhile.

use engine_core::{lerp_vec3, Lifetime, Vec3};

use crate::presentation::{EffectSink, TrailId};

/// One visual-only trail from muzzle to impact.
#[derive(Debug, Clone)]
pub struct TracerEffect {
    pub id: TrailId,
    pub start: Vec3,
    pub end: Vec3,
    pub duration: f32,
    elapsed: f32,
    /// Counts down once the head reaches `end`.
    linger: Option<Lifetime>,
}

impl TracerEffect {
    /// Current head of the trail.
    pub fn head(&self) -> Vec3 {
        if self.linger.is_some() || self.duration <= 0.0 {
            self.end
        } else {
            lerp_vec3(self.start, self.end, self.elapsed / self.duration)
        }
    }

    pub fn arrived(&self) -> bool {
        self.linger.is_some()
    }

    /// Advance; returns false once the trail should be removed.
    fn update(&mut self, dt: f32) -> bool {
        if let Some(linger) = &mut self.linger {
            return !linger.update(dt);
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.linger = Some(Lifetime::new(self.duration));
        }
        true
    }
}

/// All live trails.
#[derive(Debug, Default)]
pub struct Tracers {
    pub active: Vec<TracerEffect>,
    next_id: u64,
}

impl Tracers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<S: EffectSink + ?Sized>(&mut self, from: Vec3, to: Vec3, duration: f32, sink: &mut S) -> TrailId {
        let id = TrailId(self.next_id);
        self.next_id += 1;
        sink.spawn_trail(id, from);
        self.active.push(TracerEffect {
            id,
            start: from,
            end: to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            linger: None,
        });
        id
    }

    pub fn update<S: EffectSink + ?Sized>(&mut self, dt: f32, sink: &mut S) {
        self.active.retain_mut(|t| {
            let alive = t.update(dt);
            if alive {
                sink.move_trail(t.id, t.head());
            } else {
                sink.despawn_trail(t.id);
            }
            alive
        });
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingPresentation;
    use approx::assert_relative_eq;

    #[test]
    fn trail_sweeps_then_lingers_then_despawns() {
        let mut sink = RecordingPresentation::new();
        let mut tracers = Tracers::new();
        let to = Vec3::new(0.0, 0.0, 10.0);
        let id = tracers.spawn(Vec3::ZERO, to, 0.05, &mut sink);
        assert_eq!(sink.trails.get(&id), Some(&Vec3::ZERO));

        tracers.update(0.025, &mut sink);
        assert_relative_eq!(sink.trails[&id].z, 5.0, epsilon = 1e-4);

        tracers.update(0.025, &mut sink);
        assert_eq!(sink.trails[&id], to);
        assert!(tracers.active[0].arrived());

        tracers.update(0.03, &mut sink);
        assert_eq!(tracers.len(), 1, "rests at the impact point");
        tracers.update(0.03, &mut sink);
        assert!(tracers.is_empty());
        assert!(sink.trails.is_empty());
        assert_eq!(sink.trails_spawned, 1);
    }

    #[test]
    fn ids_are_unique() {
        let mut sink = RecordingPresentation::new();
        let mut tracers = Tracers::new();
        let a = tracers.spawn(Vec3::ZERO, Vec3::X, 0.05, &mut sink);
        let b = tracers.spawn(Vec3::ZERO, Vec3::Y, 0.05, &mut sink);
        assert_ne!(a, b);
        assert_eq!(tracers.len(), 2);
    }
}
