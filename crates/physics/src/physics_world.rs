//! Physics world management with Rapier3D.
//!
//! Only collision queries are needed by the simulation: agents are kinematic
//! capsules moved explicitly each tick, the level is static colliders.

use std::collections::HashMap;

use engine_core::Vec3;
use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;

use crate::collision::Layer;

/// Collision world holding the level and agent capsules.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub island_manager: IslandManager,
    pub query_pipeline: QueryPipeline,
    /// Offset from an agent's feet to its capsule center.
    agent_offsets: HashMap<ColliderHandle, Vec3>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create an empty physics world.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            agent_offsets: HashMap::new(),
        }
    }

    /// Update query pipeline after colliders moved or changed.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(Layer::Environment.groups())
            .build();
        let handle = self.collider_set.insert(collider);
        self.update_query_pipeline();
        handle
    }

    /// Add a static cuboid collider (walls, houses). No parent body; collider is fixed in world.
    /// `translation`: world position of center. `rotation_y_rad`: rotation around Y axis in radians.
    /// `half_extents`: half sizes in local X, Y, Z (after rotation).
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
    ) -> ColliderHandle {
        let tra = vector![translation.x, translation.y, translation.z];
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(tra, axisangle);
        let collider = ColliderBuilder::cuboid(
            half_extents.x as Real,
            half_extents.y as Real,
            half_extents.z as Real,
        )
        .position(position)
        .collision_groups(Layer::Environment.groups())
        .build();
        let handle = self.collider_set.insert(collider);
        self.update_query_pipeline();
        handle
    }

    /// Add a standing capsule for an agent whose feet are at `feet`.
    pub fn add_agent_capsule(
        &mut self,
        feet: Vec3,
        half_height: f32,
        radius: f32,
        layer: Layer,
    ) -> ColliderHandle {
        let offset = Vec3::new(0.0, half_height + radius, 0.0);
        let center = feet + offset;
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .translation(vector![center.x, center.y, center.z])
            .collision_groups(layer.groups())
            .build();
        let handle = self.collider_set.insert(collider);
        self.agent_offsets.insert(handle, offset);
        self.update_query_pipeline();
        log::debug!("Added {:?} capsule {:?} at {:?}", layer, handle, feet);
        handle
    }

    /// Place an agent capsule so its feet sit at `feet`.
    pub fn set_agent_position(&mut self, handle: ColliderHandle, feet: Vec3) {
        let offset = self.agent_offset(handle);
        if let Some(collider) = self.collider_set.get_mut(handle) {
            let center = feet + offset;
            collider.set_translation(vector![center.x, center.y, center.z]);
        }
    }

    /// Offset from feet to capsule center (zero for non-agent colliders).
    pub fn agent_offset(&self, handle: ColliderHandle) -> Vec3 {
        self.agent_offsets.get(&handle).copied().unwrap_or(Vec3::ZERO)
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
        self.agent_offsets.remove(&handle);
        self.update_query_pipeline();
    }
}
