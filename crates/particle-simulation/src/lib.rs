//! # Particle Simulation Engine
//!
//! CPU swarm simulation driven by a fixed pool of worker threads. Each worker
//! owns one contiguous slice of the particle store, integrates it once per
//! frame and scatters the results into a shared, double-buffered density grid.

pub mod clock;
pub mod error;
pub mod grid;
pub mod input;
pub mod integrate;
pub mod params;
pub mod partition;
pub mod render;
pub mod simulation;
pub mod store;
pub mod worker;

pub use clock::*;
pub use error::*;
pub use grid::*;
pub use input::*;
pub use integrate::*;
pub use params::*;
pub use partition::*;
pub use render::*;
pub use simulation::*;
pub use store::*;
pub use worker::*;
