//! Batched execution of independent paths.
//!
//! Paths run in fixed-size batches. Every batch owns an [`Lcg`] seeded from
//! one draw of the engine's master generator mixed with the batch index, and
//! its paths advance that generator in order. Master draws are taken in
//! batch order on the calling thread, so a seed reproduces the same paths
//! whether batches run inline or across a worker pool.
//!
//! Batches are grouped into waves of `workers` batches. Between waves the
//! runner checks for cancellation, reports progress, and (when running
//! inline) yields the thread. [`Runner::run`] still blocks its caller until
//! the last wave; see [`crate::simulation::worker`] for a spawned run.

use crate::core::error::{SimulationError, ValidationError};
use crate::core::input::AssetAllocation;
use crate::core::rng::{batch_seed, Lcg};
use crate::market::returns::ReturnModel;
use crate::simulation::path::{PathParams, PathResult, PathSimulator};
use crate::simulation::progress::{CancellationToken, Progress};
use log::{debug, warn};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Batch sizing and parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Paths per batch; also the progress reporting granularity.
    pub batch_size: usize,
    /// 1 runs batches inline on the caller's thread.
    pub workers: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            workers: 1,
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 {
            return Err(ValidationError::BatchSize);
        }
        if self.workers == 0 {
            return Err(ValidationError::WorkerCount);
        }
        Ok(())
    }
}

/// Optional hooks for a run.
#[derive(Default)]
pub struct RunHooks<'a> {
    pub progress: Option<&'a mut dyn FnMut(&Progress)>,
    pub cancel: Option<&'a CancellationToken>,
}

impl<'a> RunHooks<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_progress(mut self, progress: &'a mut dyn FnMut(&Progress)) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(CancellationToken::is_cancelled)
    }
}

/// Runs many paths of one configuration.
pub struct Runner<'a> {
    config: RunnerConfig,
    model: &'a dyn ReturnModel,
}

impl<'a> Runner<'a> {
    pub fn new(config: RunnerConfig, model: &'a dyn ReturnModel) -> Self {
        Self { config, model }
    }

    /// Simulate `count` paths.
    ///
    /// `master` supplies one draw per batch. On cancellation no path results
    /// are returned.
    pub fn run(
        &self,
        params: PathParams,
        allocation: AssetAllocation,
        count: usize,
        master: &mut Lcg,
        mut hooks: RunHooks<'_>,
    ) -> Result<Vec<PathResult>, SimulationError> {
        self.config.validate()?;

        let batch_size = self.config.batch_size;
        let workers = self.config.workers;
        let num_batches = count.div_ceil(batch_size);
        let pool = if workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| SimulationError::WorkerPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        let simulator = PathSimulator::new(params, allocation, self.model);
        let run_batch = |&(index, seed): &(usize, u64)| {
            let size = batch_size.min(count - index * batch_size);
            let mut rng = Lcg::new(seed);
            (0..size)
                .map(|_| simulator.simulate(&mut rng))
                .collect::<Vec<_>>()
        };

        let start = Instant::now();
        let mut results = Vec::with_capacity(count);
        let mut next_batch = 0;

        while next_batch < num_batches {
            if hooks.is_cancelled() {
                warn!(
                    "simulation cancelled after {} of {} paths",
                    results.len(),
                    count
                );
                return Err(SimulationError::Cancelled {
                    completed: results.len(),
                    total: count,
                });
            }

            let wave_end = (next_batch + workers).min(num_batches);
            let jobs: Vec<(usize, u64)> = (next_batch..wave_end)
                .map(|index| (index, batch_seed(master.next_u32(), index as u64)))
                .collect();

            let wave: Vec<Vec<PathResult>> = match &pool {
                Some(pool) => pool.install(|| jobs.par_iter().map(run_batch).collect()),
                None => jobs.iter().map(run_batch).collect(),
            };
            for batch in wave {
                results.extend(batch);
            }
            next_batch = wave_end;

            debug!(
                "completed batches {}/{} ({} paths)",
                next_batch,
                num_batches,
                results.len()
            );

            if let Some(report) = hooks.progress.as_deref_mut() {
                report(&Progress {
                    completed: results.len(),
                    total: count,
                    elapsed: start.elapsed(),
                });
            }
            if pool.is_none() {
                std::thread::yield_now();
            }
        }

        Ok(results)
    }
}
