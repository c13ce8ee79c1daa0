//! Fixed-capacity particle store shared by the worker pool
//!
//! The store is one logical array of `len` particles, physically split into
//! one shard per partition. A worker only ever locks its own shard, so the
//! locks are uncontended during a frame; the orchestrator takes them while the
//! pool is idle to reseed or inspect particles.

use crate::error::{Result, SimulationError};
use crate::partition::Partition;
use glam::Vec2;
use particle_physics::Particle;
use rand::Rng;
use std::sync::{Mutex, MutexGuard};

pub struct ParticleStore {
    shards: Vec<Mutex<Vec<Particle>>>,
    partitions: Vec<Partition>,
    len: usize,
}

impl ParticleStore {
    /// Allocate zeroed particles laid out along `partitions`
    pub fn new(partitions: Vec<Partition>) -> Self {
        let len = partitions.last().map_or(0, |p| p.end);
        let shards = partitions
            .iter()
            .map(|p| Mutex::new(vec![Particle::default(); p.len()]))
            .collect();

        Self {
            shards,
            partitions,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Exclusive access to the particles of one partition
    pub fn lock_shard(&self, shard: usize) -> Result<MutexGuard<'_, Vec<Particle>>> {
        self.shards[shard]
            .lock()
            .map_err(|_| SimulationError::PoisonedShard { shard })
    }

    /// Shard holding `index`, and the offset of `index` inside it
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len {
            return None;
        }
        let shard = self.partitions.partition_point(|p| p.end <= index);
        Some((shard, index - self.partitions[shard].start))
    }

    pub fn get(&self, index: usize) -> Result<Option<Particle>> {
        match self.locate(index) {
            Some((shard, offset)) => Ok(Some(self.lock_shard(shard)?[offset])),
            None => Ok(None),
        }
    }

    /// Copy of the whole store in index order
    pub fn snapshot(&self) -> Result<Vec<Particle>> {
        let mut particles = Vec::with_capacity(self.len);
        for shard in 0..self.shards.len() {
            particles.extend_from_slice(&self.lock_shard(shard)?);
        }
        Ok(particles)
    }

    /// Overwrite every particle, in index order
    pub fn load(&self, particles: &[Particle]) -> Result<()> {
        if particles.len() != self.len {
            return Err(SimulationError::ParticleCountMismatch {
                expected: self.len,
                actual: particles.len(),
            });
        }

        for (shard, partition) in self.partitions.iter().enumerate() {
            self.lock_shard(shard)?
                .copy_from_slice(&particles[partition.range()]);
        }
        Ok(())
    }

    /// Respawn every particle uniformly inside the viewport
    ///
    /// Velocities are drawn from `[-spawn_speed, spawn_speed]` per axis and
    /// each home anchor is set to the new position.
    pub fn seed(&self, rng: &mut impl Rng, width: u32, height: u32, spawn_speed: f32) -> Result<()> {
        let (width, height) = (width as f32, height as f32);

        for shard in 0..self.shards.len() {
            for particle in self.lock_shard(shard)?.iter_mut() {
                let position = Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height);
                let velocity = Vec2::new(
                    (rng.random::<f32>() * 2.0 - 1.0) * spawn_speed,
                    (rng.random::<f32>() * 2.0 - 1.0) * spawn_speed,
                );
                *particle = Particle::spawn(position, velocity);
            }
        }
        Ok(())
    }
}
