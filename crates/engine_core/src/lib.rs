//! Core engine types and utilities for Zombie Village.
//!
//! This crate provides the foundational types used across all simulation crates:
//! - Transform and heading conventions
//! - Fixed-step time management
//! - Health and the `Damageable` capability shared by every agent
//! - Scalar smoothing helpers used by the motor and aim code

pub mod components;
pub mod math;
pub mod time;
pub mod transform;

pub use components::*;
pub use math::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
