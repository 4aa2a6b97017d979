//! Progress reporting and cancellation for long runs.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Snapshot passed to the progress callback after each batch wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Paths finished so far.
    pub completed: usize,
    /// Paths in the run.
    pub total: usize,
    /// Wall-clock time since the run started.
    pub elapsed: Duration,
}

impl Progress {
    /// Completion as a 0-100 value.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Shared flag used to stop a run at the next batch boundary.
///
/// Clones observe the same flag, so a caller can hand one clone to the
/// engine and keep another to cancel from elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let progress = Progress {
            completed: 250,
            total: 1000,
            elapsed: Duration::from_millis(10),
        };
        assert!((progress.percentage() - 25.0).abs() < 1e-9);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_empty_run_is_complete() {
        let progress = Progress {
            completed: 0,
            total: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(progress.percentage(), 100.0);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_token_clones_share_state() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
