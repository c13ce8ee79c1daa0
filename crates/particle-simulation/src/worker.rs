//! Fixed worker pool with per-frame fan-out and fan-in
//!
//! ```text
//!              ┌──────────── FrameUpdate ────────────┐
//!              ▼                  ▼                   ▼
//!        ┌──────────┐       ┌──────────┐        ┌──────────┐
//!        │ worker 0 │       │ worker 1 │  ...   │ worker N │
//!        │ [0, c)   │       │ [c, 2c)  │        │ [.., n)  │
//!        └────┬─────┘       └────┬─────┘        └────┬─────┘
//!             └────────── WorkerReport ──────────────┘
//!                                ▼
//!                     barrier (count down to 0)
//! ```
//!
//! Each worker is bound to one partition for its whole life. It blocks only
//! while waiting for the next update, runs its slice to completion and sends
//! exactly one report per update.

use crate::error::{Result, SimulationError};
use crate::integrate::{integrate_range, FrameUpdate};
use crate::params::ForceParams;
use crate::partition::Partition;
use crate::store::ParticleStore;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub(crate) enum WorkerCommand {
    Update(Arc<FrameUpdate>),
    Shutdown,
}

/// Completion signal for one worker's slice of one frame
#[derive(Clone, Copy, Debug)]
pub struct WorkerReport {
    pub worker: usize,
    pub frame: u64,
    /// Particles from this slice that landed inside the viewport
    pub deposited: usize,
    pub elapsed: Duration,
}

/// Aggregate of every report for a frame
#[derive(Clone, Copy, Debug, Default)]
pub struct BarrierOutcome {
    pub deposited: usize,
    /// Time taken by the slowest worker
    pub slowest: Duration,
}

struct WorkerHandle {
    commands: Sender<WorkerCommand>,
    thread: Option<JoinHandle<()>>,
    partition: Partition,
}

pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
    reports: Receiver<WorkerReport>,
    watchdog: Duration,
}

impl WorkerPool {
    /// Start one thread per partition of `store`
    pub fn spawn(store: Arc<ParticleStore>, params: ForceParams, watchdog: Duration) -> Result<Self> {
        let (report_tx, reports) = unbounded::<WorkerReport>();
        let mut pool = Self {
            workers: Vec::with_capacity(store.partitions().len()),
            reports,
            watchdog,
        };

        for (worker, &partition) in store.partitions().iter().enumerate() {
            // Never more than one update in flight per worker
            let (commands, command_rx) = bounded::<WorkerCommand>(1);
            let store = Arc::clone(&store);
            let report_tx = report_tx.clone();

            // On error the partially built pool is dropped, which stops the
            // workers started so far
            let thread = thread::Builder::new()
                .name(format!("swarm-worker-{worker}"))
                .spawn(move || run_worker(worker, store, params, command_rx, report_tx))?;

            pool.workers.push(WorkerHandle {
                commands,
                thread: Some(thread),
                partition,
            });
        }

        log::info!(
            "Worker pool started: {} workers over {} particles",
            pool.workers.len(),
            store.len()
        );
        for (worker, handle) in pool.workers.iter().enumerate() {
            log::debug!("  worker {} owns {:?}", worker, handle.partition.range());
        }

        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Send the same update to every worker
    pub fn dispatch(&self, update: &Arc<FrameUpdate>) -> Result<()> {
        for (worker, handle) in self.workers.iter().enumerate() {
            handle
                .commands
                .send(WorkerCommand::Update(Arc::clone(update)))
                .map_err(|_| SimulationError::WorkerDisconnected { worker })?;
        }
        Ok(())
    }

    /// Block until every worker has reported `frame`
    ///
    /// There is no timeout: a slow frame is waited out. Every `watchdog`
    /// interval without progress is logged along with the workers still owing
    /// a report, and a worker whose thread has exited fails the frame.
    pub fn await_barrier(&self, frame: u64) -> Result<BarrierOutcome> {
        let mut pending = vec![true; self.workers.len()];
        let mut outstanding = self.workers.len();
        let mut outcome = BarrierOutcome::default();
        let waiting_since = Instant::now();

        while outstanding > 0 {
            match self.reports.recv_timeout(self.watchdog) {
                Ok(report) if report.frame != frame || !pending[report.worker] => {
                    log::warn!(
                        "Ignoring stray report from worker {} for frame {} while waiting on frame {}",
                        report.worker,
                        report.frame,
                        frame
                    );
                }
                Ok(report) => {
                    pending[report.worker] = false;
                    outstanding -= 1;
                    outcome.deposited += report.deposited;
                    outcome.slowest = outcome.slowest.max(report.elapsed);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(worker) = self.dead_worker(&pending) {
                        log::error!("Worker {} exited before finishing frame {}", worker, frame);
                        return Err(SimulationError::WorkerDisconnected { worker });
                    }
                    let stalled: Vec<usize> = (0..pending.len()).filter(|&w| pending[w]).collect();
                    log::warn!(
                        "Frame {} stalled for {:.1?}: waiting on workers {:?}",
                        frame,
                        waiting_since.elapsed(),
                        stalled
                    );
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let worker = self.dead_worker(&pending).unwrap_or(0);
                    log::error!("All workers exited before finishing frame {}", frame);
                    return Err(SimulationError::WorkerDisconnected { worker });
                }
            }
        }

        Ok(outcome)
    }

    fn dead_worker(&self, pending: &[bool]) -> Option<usize> {
        self.workers.iter().enumerate().find_map(|(worker, handle)| {
            let finished = handle.thread.as_ref().map_or(true, JoinHandle::is_finished);
            (pending[worker] && finished).then_some(worker)
        })
    }

    /// Stop and join every worker
    pub fn shutdown(&mut self) {
        for handle in &self.workers {
            let _ = handle.commands.send(WorkerCommand::Shutdown);
        }
        for (worker, handle) in self.workers.iter_mut().enumerate() {
            if let Some(thread) = handle.thread.take() {
                if thread.join().is_err() {
                    log::error!("Worker {} panicked", worker);
                }
            }
        }
        if !self.workers.is_empty() {
            log::debug!("Worker pool stopped ({} workers)", self.workers.len());
        }
        self.workers.clear();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    worker: usize,
    store: Arc<ParticleStore>,
    params: ForceParams,
    commands: Receiver<WorkerCommand>,
    reports: Sender<WorkerReport>,
) {
    while let Ok(command) = commands.recv() {
        let update = match command {
            WorkerCommand::Update(update) => update,
            WorkerCommand::Shutdown => break,
        };

        let frame = update.frame;
        let started = Instant::now();
        let deposited = match store.lock_shard(worker) {
            Ok(mut shard) => integrate_range(&mut shard, &update, &params),
            Err(err) => {
                log::error!("Worker {} cannot continue: {}", worker, err);
                break;
            }
        };
        drop(update);

        let report = WorkerReport {
            worker,
            frame,
            deposited,
            elapsed: started.elapsed(),
        };
        if reports.send(report).is_err() {
            break;
        }
    }
}
