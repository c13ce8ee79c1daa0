//! # Particle Physics
//!
//! Particle record and the stateless force laws that drive the swarm: an
//! inverse-power pull toward attractors and a square-law leash back to each
//! particle's home anchor.

pub mod constants;
pub mod forces;
pub mod particle;

pub use constants::*;
pub use forces::*;
pub use particle::*;
