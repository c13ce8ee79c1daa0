//! # Particle Renderer
//!
//! Turns settled density grids into heat-mapped RGBA images.

pub mod heatmap;

pub use heatmap::*;
