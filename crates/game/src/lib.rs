//! Zombie Village: a third-person gunslinger against a village of zombies.
//!
//! The simulation is headless. Physics, navigation and presentation are
//! collaborators handed to [`sim::Simulation::tick`]; everything else is owned
//! here and advanced in a fixed order each step.

pub mod area;
pub mod camera;
pub mod config;
pub mod effects;
pub mod locomotion;
pub mod motor;
pub mod perception;
pub mod player;
pub mod presentation;
pub mod roll_curve;
pub mod sim;
pub mod spawner;
pub mod weapon;
pub mod zombie;

pub use config::{ConfigError, GameConfig};
pub use sim::{Collaborators, SimStats, Simulation};
