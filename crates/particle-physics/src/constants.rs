//! Reference constants for the swarm force model
//!
//! Values are tuned for a viewport measured in device pixels and a time step
//! measured in seconds.

/// Velocity decay rate applied as `v *= 1 / (1 + delta * DECAY_RATE)`
pub const DECAY_RATE: f32 = 1.0;

/// Strength of an attractor's inverse-square pull
pub const ATTRACTOR_STRENGTH: f32 = 2_583_000.0 * 15.0;

/// Multiplier applied to attractor forces before integration
pub const ATTRACTOR_GAIN: f32 = 3.0;

/// Hard clamp on the inverse-square force magnitude
pub const ATTRACTOR_CAP: f32 = 1200.0;

/// Hard clamp on the inverse-cube force magnitude
pub const INVERSE_CUBE_CAP: f32 = 12_000.0;

/// Radius around home inside which no restoring force acts
pub const HOME_DEAD_ZONE: f32 = 0.5;

/// Multiplier applied to the restoring force before integration
pub const HOME_GAIN: f32 = 1.0;

/// Hard clamp on the square-law restoring force magnitude
pub const HOME_CAP: f32 = 12_000.0;

/// Distance floor used when computing force magnitudes.
/// Keeps `strength / d²` finite as a particle passes through an attractor.
pub const MIN_DISTANCE: f32 = 1.0e-3;

/// Largest time step a single frame may integrate, in seconds
pub const MAX_DELTA: f32 = 0.1;

/// Initial velocity components are drawn from `[-SPAWN_SPEED, SPAWN_SPEED]`
pub const SPAWN_SPEED: f32 = 30.0;

/// Upper bound on simultaneous attractors (touch points) per frame
pub const MAX_ATTRACTORS: usize = 10;
