//! # wealth-montecarlo
//!
//! Monte Carlo retirement and portfolio projection engine.
//!
//! Given a client's starting wealth, withdrawal schedule and risk profile,
//! this engine simulates thousands of independent wealth trajectories under
//! correlated asset returns and reduces them to outcome statistics: success
//! probability, percentile wealth bands, shortfall risk, drawdown and
//! dispersion of final wealth.
//!
//! ## Architecture
//!
//! - **core** — Random source, simulation input, error taxonomy
//! - **market** — Return assumptions, return models, risk-score allocation
//! - **simulation** — Path state machine, batched runner, engine, background runs
//! - **analysis** — Outcome statistics and per-year percentile bands
//! - **store** — Persistence boundary for results keyed by scenario

pub mod analysis;
pub mod core;
pub mod market;
pub mod simulation;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::bands::{yearly_bands, YearBand};
    pub use crate::analysis::statistics::{aggregate, ConfidenceInterval, MonteCarloResult};
    pub use crate::core::error::{SimulationError, ValidationError};
    pub use crate::core::input::{AssetAllocation, SimulationInput};
    pub use crate::market::allocation::allocation_for_risk_score;
    pub use crate::market::assumptions::{AssetClass, ReturnAssumptions};
    pub use crate::simulation::engine::{MonteCarloEngine, SimulationConfig};
    pub use crate::simulation::progress::{CancellationToken, Progress};
    pub use crate::simulation::runner::RunHooks;
    pub use crate::simulation::worker::BackgroundRun;
}
