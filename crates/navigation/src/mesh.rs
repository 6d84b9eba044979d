//! The navigation capability zombies query.

use glam::Vec3;

/// Walkable-surface queries, answered synchronously.
pub trait NavMesh {
    /// Nearest walkable point within `max_distance` of `near`.
    fn sample_valid_point(&self, near: Vec3, max_distance: f32) -> Option<Vec3>;

    /// Waypoints from `from` to `to`, ending on the walkable surface at (or
    /// nearest to) `to`. `None` when no route exists.
    fn find_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>>;
}

/// An unbounded flat plane: every point is walkable and paths are straight.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGround {
    pub height: f32,
}

impl OpenGround {
    pub fn new(height: f32) -> Self {
        Self { height }
    }

    fn project(&self, point: Vec3) -> Vec3 {
        Vec3::new(point.x, self.height, point.z)
    }
}

impl NavMesh for OpenGround {
    fn sample_valid_point(&self, near: Vec3, _max_distance: f32) -> Option<Vec3> {
        Some(self.project(near))
    }

    fn find_path(&self, _from: Vec3, to: Vec3) -> Option<Vec<Vec3>> {
        Some(vec![self.project(to)])
    }
}
