//! Background execution for callers that must not block.
//!
//! [`BackgroundRun`] moves an engine onto its own thread and streams
//! [`Progress`] snapshots back over a channel. The result is collected with
//! [`BackgroundRun::join`].

use crate::analysis::statistics::MonteCarloResult;
use crate::core::error::SimulationError;
use crate::core::input::SimulationInput;
use crate::simulation::engine::MonteCarloEngine;
use crate::simulation::progress::{CancellationToken, Progress};
use crate::simulation::runner::RunHooks;
use log::debug;
use std::sync::mpsc::{channel, Receiver};
use std::thread::{self, JoinHandle};

/// A simulation running on a spawned thread.
///
/// # Examples
///
/// ```
/// use wealth_montecarlo::core::input::SimulationInput;
/// use wealth_montecarlo::simulation::engine::{MonteCarloEngine, SimulationConfig};
/// use wealth_montecarlo::simulation::worker::BackgroundRun;
///
/// let engine = MonteCarloEngine::new(SimulationConfig::default().with_seed(3));
/// let input = SimulationInput::new(200_000.0, 20, 8_000.0, 5).with_simulation_count(300);
/// let run = BackgroundRun::spawn(engine, input);
/// while let Some(progress) = run.recv_progress() {
///     assert!(progress.completed <= progress.total);
/// }
/// let result = run.join().unwrap();
/// assert_eq!(result.simulation_count, 300);
/// ```
pub struct BackgroundRun {
    progress_rx: Receiver<Progress>,
    cancel: CancellationToken,
    thread: JoinHandle<Result<MonteCarloResult, SimulationError>>,
}

impl BackgroundRun {
    pub fn spawn(mut engine: MonteCarloEngine, input: SimulationInput) -> Self {
        let (progress_tx, progress_rx) = channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let thread = thread::spawn(move || {
            // The receiver may already be gone; progress is advisory.
            let mut on_progress = |p: &Progress| {
                let _ = progress_tx.send(*p);
            };
            let hooks = RunHooks::none()
                .with_progress(&mut on_progress)
                .with_cancel(&token);
            engine.run_with(&input, hooks)
        });

        Self {
            progress_rx,
            cancel,
            thread,
        }
    }

    /// Wait for the next snapshot. `None` once the run has ended.
    pub fn recv_progress(&self) -> Option<Progress> {
        self.progress_rx.recv().ok()
    }

    /// Latest pending snapshot without waiting, if any.
    pub fn try_progress(&self) -> Option<Progress> {
        let mut latest = None;
        loop {
            match self.progress_rx.try_recv() {
                Ok(p) => latest = Some(p),
                Err(_) => return latest,
            }
        }
    }

    /// Stop at the next batch boundary.
    pub fn cancel(&self) {
        debug!("cancellation requested for background run");
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the run ends.
    pub fn join(self) -> Result<MonteCarloResult, SimulationError> {
        self.thread
            .join()
            .map_err(|_| SimulationError::WorkerPool("background run panicked".to_string()))?
    }
}
