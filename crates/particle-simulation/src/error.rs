//! Simulation error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("particle count must be greater than zero")]
    InvalidParticleCount,

    #[error("worker count must be greater than zero")]
    InvalidWorkerCount,

    #[error("viewport must have positive dimensions, got {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("force parameter `{name}` must be finite and non-negative, got {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("cannot parse {key}={value:?}")]
    Config { key: &'static str, value: String },

    #[error("expected {expected} particles, got {actual}")]
    ParticleCountMismatch { expected: usize, actual: usize },

    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("worker {worker} stopped responding")]
    WorkerDisconnected { worker: usize },

    #[error("particle shard {shard} was poisoned by a panicking worker")]
    PoisonedShard { shard: usize },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
