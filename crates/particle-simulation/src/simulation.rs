//! Frame orchestrator
//!
//! One call to [`ParticleSimulation::step`] is one frame:
//!
//! 1. build a [`FrameUpdate`] around the active grid and send it to every worker
//! 2. while the workers run, hand the settled grid to the renderer, then clear it
//! 3. wait for every worker's report (the barrier)
//! 4. swap grid roles: the freshly filled grid settles, the cleared one goes active
//!
//! `step` only returns once the barrier has released, and reset/resize take
//! `&mut self`, so no frame can be in flight while grids are reallocated. The
//! renderer hears about a new viewport at the start of the next frame.
//!
//! A frame number is consumed as soon as the frame is dispatched, even if the
//! frame then fails, so late reports from it never count toward a later one.

use crate::clock::{clamp_delta, FrameClock};
use crate::error::Result;
use crate::grid::{DensityBuffers, DensityGrid};
use crate::integrate::FrameUpdate;
use crate::params::{validate_viewport, SimulationConfig};
use crate::partition::{partition, Partition};
use crate::render::DensityRenderer;
use crate::store::ParticleStore;
use crate::worker::WorkerPool;
use glam::Vec2;
use particle_physics::{Particle, MAX_ATTRACTORS};
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timings and counts for one completed frame
#[derive(Clone, Copy, Debug)]
pub struct FrameStats {
    pub frame: u64,
    pub delta: f32,
    /// Dispatch to barrier release
    pub simulate_time: Duration,
    /// Time the renderer held the settled grid
    pub render_time: Duration,
    /// Particles that landed inside the viewport this frame
    pub particles_in_view: usize,
}

/// CPU particle swarm driven by a fixed worker pool
pub struct ParticleSimulation {
    config: SimulationConfig,
    store: Arc<ParticleStore>,
    pool: WorkerPool,
    buffers: DensityBuffers,
    attractors: Vec<Vec2>,
    clock: FrameClock,
    rng: StdRng,
    frame: u64,
    /// Viewport the renderer has not been told about yet
    pending_resize: Option<(u32, u32)>,
}

impl ParticleSimulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Initializing ParticleSimulation: {} particles, {} workers, {}x{} viewport",
            config.particle_count,
            config.worker_count,
            config.width,
            config.height
        );

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let store = Arc::new(ParticleStore::new(partition(config.particle_count, config.worker_count)));
        store.seed(&mut rng, config.width, config.height, config.forces.spawn_speed)?;
        log::info!("✓ Spawned {} particles", store.len());

        let pool = WorkerPool::spawn(Arc::clone(&store), config.forces, config.watchdog)?;
        let buffers = DensityBuffers::new(config.width, config.height, config.overflow);
        let viewport = (config.width, config.height);

        Ok(Self {
            clock: FrameClock::new(config.forces.max_delta),
            config,
            store,
            pool,
            buffers,
            attractors: Vec::new(),
            rng,
            frame: 0,
            pending_resize: Some(viewport),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    pub fn worker_count(&self) -> usize {
        self.pool.len()
    }

    pub fn partitions(&self) -> &[Partition] {
        self.store.partitions()
    }

    /// Number of frames dispatched so far, failed ones included
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn attractors(&self) -> &[Vec2] {
        &self.attractors
    }

    /// Grid the next frame's workers will write into
    pub fn active_grid(&self) -> &Arc<DensityGrid> {
        self.buffers.active()
    }

    /// Grid holding the last completed frame's counts
    pub fn settled_grid(&self) -> &Arc<DensityGrid> {
        self.buffers.settled()
    }

    pub fn particle(&self, index: usize) -> Result<Option<Particle>> {
        self.store.get(index)
    }

    pub fn particles(&self) -> Result<Vec<Particle>> {
        self.store.snapshot()
    }

    /// Replace every particle, in index order
    pub fn load_particles(&mut self, particles: &[Particle]) -> Result<()> {
        self.store.load(particles)
    }

    /// Replace the attractor list; takes effect from the next frame
    pub fn set_attractors(&mut self, attractors: impl IntoIterator<Item = Vec2>) {
        self.attractors.clear();
        self.attractors.extend(attractors);

        if self.attractors.len() > MAX_ATTRACTORS {
            log::warn!(
                "Dropping {} attractors beyond the limit of {}",
                self.attractors.len() - MAX_ATTRACTORS,
                MAX_ATTRACTORS
            );
            self.attractors.truncate(MAX_ATTRACTORS);
        }
    }

    /// Run one frame with `delta` taken from the frame clock
    pub fn advance<R: DensityRenderer + ?Sized>(&mut self, now: Instant, renderer: &mut R) -> Result<FrameStats> {
        let delta = self.clock.tick(now);
        self.step(delta, renderer)
    }

    /// Run one frame of `delta` seconds (clamped to `[0, max_delta]`)
    pub fn step<R: DensityRenderer + ?Sized>(&mut self, delta: f32, renderer: &mut R) -> Result<FrameStats> {
        let delta = clamp_delta(delta, self.config.forces.max_delta);
        let frame = self.frame;
        self.frame += 1;

        let update = Arc::new(FrameUpdate {
            frame,
            delta,
            width: self.config.width,
            height: self.config.height,
            attractors: self.attractors.clone(),
            grid: Arc::clone(self.buffers.active()),
        });

        let started = Instant::now();
        self.pool.dispatch(&update)?;
        drop(update);

        if let Some((width, height)) = self.pending_resize.take() {
            renderer.resize(width, height);
        }

        // The settled grid is drained while the workers fill the active one
        let settled = self.buffers.settled();
        renderer.render(settled);
        settled.clear();
        let render_time = started.elapsed();

        let outcome = self.pool.await_barrier(frame)?;
        let simulate_time = started.elapsed();

        self.buffers.swap();

        log::trace!(
            "frame {} delta={:.4}s sim={:.2?} render={:.2?} slowest_worker={:.2?} in_view={}",
            frame,
            delta,
            simulate_time,
            render_time,
            outcome.slowest,
            outcome.deposited
        );

        Ok(FrameStats {
            frame,
            delta,
            simulate_time,
            render_time,
            particles_in_view: outcome.deposited,
        })
    }

    /// Change the viewport without touching particles
    ///
    /// Both grids are reallocated, discarding any counts not yet rendered, and
    /// the attractors are dropped. Particles keep their absolute coordinates,
    /// so a shrinking viewport may leave some of them out of view.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        validate_viewport(width, height)?;

        self.config.width = width;
        self.config.height = height;
        self.buffers = DensityBuffers::new(width, height, self.config.overflow);
        self.attractors.clear();
        self.pending_resize = Some((width, height));

        log::info!("Resized viewport to {}x{}", width, height);
        Ok(())
    }

    /// Full reinitialization: new grids, respawned particles and, when the
    /// particle count changes, a new store and worker pool
    pub fn reset(&mut self, width: u32, height: u32, particle_count: usize) -> Result<()> {
        let mut config = self.config.clone();
        config.width = width;
        config.height = height;
        config.particle_count = particle_count;
        config.validate()?;

        if particle_count != self.store.len() {
            let store = Arc::new(ParticleStore::new(partition(particle_count, config.worker_count)));
            store.seed(&mut self.rng, width, height, config.forces.spawn_speed)?;
            // Replacing the pool joins the old workers
            self.pool = WorkerPool::spawn(Arc::clone(&store), config.forces, config.watchdog)?;
            self.store = store;
        } else {
            self.store.seed(&mut self.rng, width, height, config.forces.spawn_speed)?;
        }

        self.buffers = DensityBuffers::new(width, height, config.overflow);
        self.attractors.clear();
        self.clock.reset();
        self.config = config;
        self.pending_resize = Some((width, height));

        log::info!(
            "Reset simulation: {} particles in a {}x{} viewport",
            particle_count,
            width,
            height
        );
        Ok(())
    }
}
