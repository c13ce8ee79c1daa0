//! Simulation parameters and startup configuration

use crate::error::{Result, SimulationError};
use crate::grid::OverflowPolicy;
use particle_physics::{constants::*, AttractorLaw};
use std::str::FromStr;
use std::time::Duration;

/// Default particle count when nothing overrides it
pub const DEFAULT_PARTICLE_COUNT: usize = 1_000_000;

/// Coefficients of the force model, fixed for the lifetime of a worker pool
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    // Drag
    pub decay_rate: f32,

    // Attractors
    pub attractor_law: AttractorLaw,
    pub attractor_strength: f32,
    pub attractor_gain: f32,
    pub attractor_cap: f32,

    // Home leash
    pub home_dead_zone: f32,
    pub home_gain: f32,
    pub home_cap: f32,

    // Numerical guards
    pub min_distance: f32,
    pub max_delta: f32,

    // Spawn
    pub spawn_speed: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            decay_rate: DECAY_RATE,
            attractor_law: AttractorLaw::InverseSquare,
            attractor_strength: ATTRACTOR_STRENGTH,
            attractor_gain: ATTRACTOR_GAIN,
            attractor_cap: ATTRACTOR_CAP,
            home_dead_zone: HOME_DEAD_ZONE,
            home_gain: HOME_GAIN,
            home_cap: HOME_CAP,
            min_distance: MIN_DISTANCE,
            max_delta: MAX_DELTA,
            spawn_speed: SPAWN_SPEED,
        }
    }
}

impl ForceParams {
    /// Switch to the inverse-cube attractor with its own, higher cap
    pub fn with_inverse_cube(mut self) -> Self {
        self.attractor_law = AttractorLaw::InverseCube;
        self.attractor_cap = INVERSE_CUBE_CAP;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("decay_rate", self.decay_rate),
            ("attractor_strength", self.attractor_strength),
            ("attractor_gain", self.attractor_gain),
            ("attractor_cap", self.attractor_cap),
            ("home_dead_zone", self.home_dead_zone),
            ("home_gain", self.home_gain),
            ("home_cap", self.home_cap),
            ("min_distance", self.min_distance),
            ("max_delta", self.max_delta),
            ("spawn_speed", self.spawn_speed),
        ];

        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }
}

/// Everything needed to start a simulation
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub particle_count: usize,
    pub worker_count: usize,
    pub width: u32,
    pub height: u32,
    pub forces: ForceParams,
    pub overflow: OverflowPolicy,
    /// How long the orchestrator waits on the barrier before reporting a stall
    pub watchdog: Duration,
    /// Fixed RNG seed for reproducible spawns, random when `None`
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            worker_count: default_worker_count(),
            width: 1280,
            height: 720,
            forces: ForceParams::default(),
            overflow: OverflowPolicy::Wrap,
            watchdog: Duration::from_secs(2),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Defaults overlaid with `SWARM_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each `SWARM_*` key
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(count) = parse_var(&lookup, "SWARM_PARTICLES")? {
            config.particle_count = count;
        }
        if let Some(workers) = parse_var(&lookup, "SWARM_WORKERS")? {
            config.worker_count = workers;
        }
        if let Some(width) = parse_var(&lookup, "SWARM_WIDTH")? {
            config.width = width;
        }
        if let Some(height) = parse_var(&lookup, "SWARM_HEIGHT")? {
            config.height = height;
        }
        if let Some(seed) = parse_var(&lookup, "SWARM_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(overflow) = parse_var(&lookup, "SWARM_OVERFLOW")? {
            config.overflow = overflow;
        }

        Ok(config)
    }

    /// Reject configurations the simulation must never start with
    pub fn validate(&self) -> Result<()> {
        if self.particle_count == 0 {
            return Err(SimulationError::InvalidParticleCount);
        }
        if self.worker_count == 0 {
            return Err(SimulationError::InvalidWorkerCount);
        }
        validate_viewport(self.width, self.height)?;
        self.forces.validate()
    }
}

pub(crate) fn validate_viewport(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SimulationError::InvalidViewport { width, height });
    }
    Ok(())
}

/// One `SWARM_*` environment variable, `None` when unset
///
/// Shares the parsing and error reporting of [`SimulationConfig::from_env`],
/// so settings owned by a driver fail the same way.
pub fn env_var<T: FromStr>(key: &'static str) -> Result<Option<T>> {
    parse_var(&|key: &str| std::env::var(key).ok(), key)
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SimulationError::Config { key, value }),
    }
}

/// Worker pool size for this machine
///
/// Apple parts get a small fixed pool, everything else leaves one core for the
/// orchestrating thread.
pub fn default_worker_count() -> usize {
    if cfg!(any(target_os = "macos", target_os = "ios")) {
        4
    } else {
        num_cpus::get().saturating_sub(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, DEFAULT_PARTICLE_COUNT);
        assert!(config.worker_count >= 1);
        assert_eq!(config.forces.attractor_strength, 2_583_000.0 * 15.0);
    }

    #[test]
    fn test_env_overrides() {
        let config = SimulationConfig::from_vars(vars(&[
            ("SWARM_PARTICLES", "5000"),
            ("SWARM_WORKERS", "3"),
            ("SWARM_WIDTH", "640"),
            ("SWARM_HEIGHT", " 480 "),
            ("SWARM_SEED", "42"),
            ("SWARM_OVERFLOW", "saturate"),
        ]))
        .unwrap();

        assert_eq!(config.particle_count, 5000);
        assert_eq!(config.worker_count, 3);
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.overflow, OverflowPolicy::Saturate);
    }

    #[test]
    fn test_single_env_var() {
        assert_eq!(env_var::<u64>("SWARM_TEST_UNSET_KEY").unwrap(), None);

        std::env::set_var("SWARM_TEST_FRAMES", "12");
        assert_eq!(env_var::<u64>("SWARM_TEST_FRAMES").unwrap(), Some(12));

        std::env::set_var("SWARM_TEST_BAD_FRAMES", "twelve");
        let err = env_var::<u64>("SWARM_TEST_BAD_FRAMES").unwrap_err();
        assert!(matches!(err, SimulationError::Config { key: "SWARM_TEST_BAD_FRAMES", .. }));
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let err = SimulationConfig::from_vars(vars(&[("SWARM_PARTICLES", "lots")])).unwrap_err();
        assert!(matches!(err, SimulationError::Config { key: "SWARM_PARTICLES", .. }));
    }

    #[test]
    fn test_degenerate_configs_rejected() {
        let mut config = SimulationConfig::default();
        config.particle_count = 0;
        assert!(matches!(config.validate(), Err(SimulationError::InvalidParticleCount)));

        let mut config = SimulationConfig::default();
        config.worker_count = 0;
        assert!(matches!(config.validate(), Err(SimulationError::InvalidWorkerCount)));

        let mut config = SimulationConfig::default();
        config.height = 0;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidViewport { width: 1280, height: 0 })
        ));

        let mut config = SimulationConfig::default();
        config.forces.min_distance = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidParameter { name: "min_distance", .. })
        ));
    }

    #[test]
    fn test_inverse_cube_preset() {
        let forces = ForceParams::default().with_inverse_cube();
        assert_eq!(forces.attractor_law, AttractorLaw::InverseCube);
        assert_eq!(forces.attractor_cap, INVERSE_CUBE_CAP);
    }
}
