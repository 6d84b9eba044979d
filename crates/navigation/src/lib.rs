//! Navigation for zombie agents: walkable-point sampling, grid path queries and
//! per-agent path following.

pub mod agent;
pub mod grid;
pub mod mesh;

pub use agent::*;
pub use grid::*;
pub use mesh::*;
