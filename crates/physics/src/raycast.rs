//! Ray, overlap and character queries answered by [`PhysicsWorld`].

use engine_core::Vec3;
use rapier3d::control::KinematicCharacterController;
use rapier3d::prelude::*;

use crate::{CollisionLayers, PhysicsQuery, PhysicsWorld};

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsQuery for PhysicsWorld {
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: CollisionLayers) -> bool {
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(center.x, center.y, center.z);
        let filter = QueryFilter::default().groups(layers.query_groups());

        let mut found = false;
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape,
            filter,
            |_| {
                found = true;
                false // One overlap is enough
            },
        );
        found
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<ColliderHandle>,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let mut filter = QueryFilter::default();
        if let Some(handle) = exclude {
            filter = filter.exclude_collider(handle);
        }

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    fn move_character(
        &self,
        collider: Option<ColliderHandle>,
        position: Vec3,
        displacement: Vec3,
        dt: f32,
    ) -> Vec3 {
        let Some(handle) = collider else {
            return position + displacement;
        };
        let Some(capsule) = self.collider_set.get(handle) else {
            log::warn!("move_character: unknown collider {:?}", handle);
            return position + displacement;
        };

        let center = position + self.agent_offset(handle);
        let controller = KinematicCharacterController {
            snap_to_ground: None,
            ..Default::default()
        };
        let movement = controller.move_shape(
            dt,
            &self.rigid_body_set,
            &self.collider_set,
            &self.query_pipeline,
            capsule.shape(),
            &Isometry::translation(center.x, center.y, center.z),
            vector![displacement.x, displacement.y, displacement.z],
            QueryFilter::default().exclude_collider(handle),
            |_| {},
        );
        position
            + Vec3::new(
                movement.translation.x,
                movement.translation.y,
                movement.translation.z,
            )
    }

    fn sync_collider(&mut self, collider: ColliderHandle, position: Vec3) {
        self.set_agent_position(collider, position);
        self.update_query_pipeline();
    }
}
