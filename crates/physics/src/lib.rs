//! Physics queries for Zombie Village.
//!
//! The simulation core only sees the [`PhysicsQuery`] trait; [`PhysicsWorld`]
//! answers it with Rapier3D.

pub mod collision;
pub mod physics_world;
pub mod query;
pub mod raycast;

pub use collision::*;
pub use physics_world::*;
pub use query::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::ColliderHandle;
