//! The physics capability the simulation core depends on.

use engine_core::Vec3;
use rapier3d::prelude::ColliderHandle;

use crate::{CollisionLayers, RaycastHit};

/// Synchronous world queries issued during a tick.
///
/// Implementations answer within the call; nothing here is deferred.
pub trait PhysicsQuery {
    /// True if any collider on `layers` overlaps the sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: CollisionLayers) -> bool;

    /// First hit along `direction` within `max_distance`, skipping `exclude`.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<ColliderHandle>,
    ) -> Option<RaycastHit>;

    /// Resolve a desired displacement for a character whose feet are at
    /// `position`. Returns the new feet position.
    fn move_character(
        &self,
        collider: Option<ColliderHandle>,
        position: Vec3,
        displacement: Vec3,
        dt: f32,
    ) -> Vec3 {
        let _ = (collider, dt);
        position + displacement
    }

    /// Move an agent's collider so its feet sit at `position`.
    fn sync_collider(&mut self, collider: ColliderHandle, position: Vec3) {
        let _ = (collider, position);
    }
}
