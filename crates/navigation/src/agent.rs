//! Per-agent path following.

use glam::Vec3;

use crate::NavMesh;

/// Destinations closer than this to the current one do not trigger a re-path.
const SAME_DESTINATION_EPSILON: f32 = 0.05;

/// Follows paths produced by a [`NavMesh`].
///
/// `set_destination` only records the request; the path is computed on the
/// next [`NavAgent::step`], so `path_pending` is true in between.
#[derive(Debug, Clone)]
pub struct NavAgent {
    /// Travel speed in m/s.
    pub speed: f32,
    destination: Option<Vec3>,
    pending: bool,
    /// Remaining waypoints, nearest first.
    path: Vec<Vec3>,
    remaining: f32,
    stopped: bool,
}

impl NavAgent {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            destination: None,
            pending: false,
            path: Vec::new(),
            remaining: 0.0,
            stopped: false,
        }
    }

    /// Request a path to `target`. Re-requesting the current destination keeps
    /// the existing path, even once it has been walked or found unreachable.
    pub fn set_destination(&mut self, target: Vec3) {
        if let Some(current) = self.destination {
            if current.distance(target) < SAME_DESTINATION_EPSILON {
                return;
            }
        }
        self.retarget(target);
    }

    /// Request a path to `target` even if it is next to the current
    /// destination. Used for moving targets.
    pub fn retarget(&mut self, target: Vec3) {
        self.destination = Some(target);
        self.pending = true;
    }

    /// Drop the current path and stand still.
    pub fn reset_path(&mut self) {
        self.destination = None;
        self.pending = false;
        self.path.clear();
        self.remaining = 0.0;
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn path_pending(&self) -> bool {
        self.pending
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Distance left along the path as of the last step (0 with no path).
    pub fn remaining_distance(&self) -> f32 {
        self.remaining
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// A stopped agent keeps its path but does not move.
    pub fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    /// Resolve any pending path and advance along it. Returns the new position.
    pub fn step(&mut self, mesh: &dyn NavMesh, position: Vec3, dt: f32) -> Vec3 {
        if self.pending {
            self.pending = false;
            match self.destination.and_then(|dest| mesh.find_path(position, dest)) {
                Some(path) => self.path = path,
                None => {
                    log::debug!("No path from {:?} to {:?}", position, self.destination);
                    self.path.clear();
                }
            }
        }

        let mut position = position;
        if !self.stopped {
            let mut budget = self.speed.max(0.0) * dt.max(0.0);
            while budget > 0.0 {
                let Some(&next) = self.path.first() else {
                    break;
                };
                let to_next = next - position;
                let distance = to_next.length();
                if distance <= budget {
                    position = next;
                    budget -= distance;
                    self.path.remove(0);
                } else {
                    position += to_next / distance * budget;
                    budget = 0.0;
                }
            }
        }

        self.remaining = path_length(position, &self.path);
        position
    }
}

fn path_length(from: Vec3, path: &[Vec3]) -> f32 {
    let mut total = 0.0;
    let mut cursor = from;
    for &p in path {
        total += cursor.distance(p);
        cursor = p;
    }
    total
}
