//! Monte Carlo engine: validate, resolve the allocation, run, aggregate.

use crate::analysis::statistics::{aggregate, MonteCarloResult};
use crate::core::error::{SimulationError, ValidationError};
use crate::core::input::{AssetAllocation, SimulationInput};
use crate::core::rng::Lcg;
use crate::market::allocation::allocation_for_risk_score;
use crate::market::assumptions::{CorrelationTable, ReturnAssumptions};
use crate::market::returns::{CorrelatedReturns, CorrelationMode, IndependentReturns, ReturnModel};
use crate::simulation::path::PathParams;
use crate::simulation::runner::{RunHooks, Runner, RunnerConfig};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Which return model drives the paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Four asset classes with equity-linked shocks.
    #[default]
    Correlated,
    /// Equity, bonds and cash drawn independently.
    Independent,
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Paths per run when the input does not say.
    pub default_simulation_count: usize,
    /// Inflation applied to withdrawals when the input does not say.
    pub default_inflation_rate: f64,
    pub runner: RunnerConfig,
    /// Fixed seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub model: ModelKind,
    pub correlation: CorrelationMode,
    /// Weight of the equity nudge in damped correlation mode.
    pub damping_factor: f64,
    pub correlations: CorrelationTable,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_simulation_count: 10_000,
            default_inflation_rate: 0.025,
            runner: RunnerConfig::default(),
            seed: None,
            model: ModelKind::Correlated,
            correlation: CorrelationMode::Damped,
            damping_factor: 0.1,
            correlations: CorrelationTable::default(),
        }
    }
}

impl SimulationConfig {
    /// Single-threaded profile for hosts without background execution:
    /// three independent asset classes, progress every 10 paths.
    pub fn fallback() -> Self {
        Self::default().with_fallback_profile()
    }

    /// Switch model and runner to the fallback profile, keeping every other
    /// setting (seed, defaults, correlations).
    pub fn with_fallback_profile(mut self) -> Self {
        self.runner = RunnerConfig {
            batch_size: 10,
            workers: 1,
        };
        self.model = ModelKind::Independent;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.runner.workers = workers;
        self
    }

    /// Check the engine-side defaults and the runner settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_simulation_count == 0 {
            return Err(ValidationError::SimulationCount);
        }
        let rate = self.default_inflation_rate;
        if !rate.is_finite() || rate <= -1.0 {
            return Err(ValidationError::InflationRate(rate));
        }
        if !self.damping_factor.is_finite() {
            return Err(ValidationError::DampingFactor(self.damping_factor));
        }
        self.runner.validate()
    }
}

/// Owns the master random sequence across runs.
///
/// # Examples
///
/// ```
/// use wealth_montecarlo::core::input::SimulationInput;
/// use wealth_montecarlo::simulation::engine::{MonteCarloEngine, SimulationConfig};
///
/// let mut engine = MonteCarloEngine::new(SimulationConfig::default().with_seed(7));
/// let input = SimulationInput::new(400_000.0, 25, 16_000.0, 5).with_simulation_count(500);
/// let result = engine.run(&input).unwrap();
/// assert_eq!(result.simulation_count, 500);
/// assert!(result.confidence_interval.p10 <= result.confidence_interval.p90);
/// ```
#[derive(Debug)]
pub struct MonteCarloEngine {
    config: SimulationConfig,
    rng: Lcg,
}

impl MonteCarloEngine {
    pub fn new(config: SimulationConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            rng: Lcg::new(seed),
            config,
        }
    }

    /// Engine configured with [`SimulationConfig::fallback`].
    pub fn fallback() -> Self {
        Self::new(SimulationConfig::fallback())
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Restart the master sequence.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    pub fn run(&mut self, input: &SimulationInput) -> Result<MonteCarloResult, SimulationError> {
        self.run_with(input, RunHooks::none())
    }

    /// Run with progress reporting and/or cancellation.
    ///
    /// Input and config are validated in full before any path runs. A
    /// cancelled run yields [`SimulationError::Cancelled`] and no statistics.
    ///
    /// Blocks the calling thread until the run ends; hooks fire on that
    /// thread. Use [`BackgroundRun`](crate::simulation::worker::BackgroundRun)
    /// to keep the caller free.
    pub fn run_with(
        &mut self,
        input: &SimulationInput,
        hooks: RunHooks<'_>,
    ) -> Result<MonteCarloResult, SimulationError> {
        input.validate()?;
        self.config.validate()?;

        let allocation = self.resolve_allocation(input);
        let assumptions = input.return_assumptions.clone().unwrap_or_default();
        let model = self.build_model(assumptions)?;
        let count = input
            .simulation_count
            .unwrap_or(self.config.default_simulation_count);
        let params = PathParams {
            initial_wealth: input.initial_wealth,
            time_horizon_years: input.time_horizon_years,
            annual_withdrawal: input.annual_withdrawal,
            inflation_rate: input
                .inflation_rate
                .unwrap_or(self.config.default_inflation_rate),
        };

        info!(
            "starting {} paths over {} years ({:?} model, {} worker(s))",
            count, params.time_horizon_years, self.config.model, self.config.runner.workers
        );
        let start = Instant::now();
        let runner = Runner::new(self.config.runner, &*model);
        let paths = runner.run(params, allocation, count, &mut self.rng, hooks)?;
        let result = aggregate(paths).with_execution_time(start.elapsed());

        info!(
            "finished {} paths in {} ms: success {:.2}%, median {}",
            result.simulation_count,
            result.execution_time_ms,
            result.success_probability,
            result.median_final_wealth
        );
        Ok(result)
    }

    fn resolve_allocation(&self, input: &SimulationInput) -> AssetAllocation {
        let allocation = input
            .allocation
            .unwrap_or_else(|| allocation_for_risk_score(input.risk_score));
        if self.config.model == ModelKind::Independent && allocation.alternatives > 0.0 {
            warn!(
                "independent model has no alternatives class; {:.1}% weight follows equity",
                allocation.alternatives * 100.0
            );
        }
        allocation
    }

    fn build_model(
        &self,
        assumptions: ReturnAssumptions,
    ) -> Result<Box<dyn ReturnModel>, SimulationError> {
        let model: Box<dyn ReturnModel> = match self.config.model {
            ModelKind::Correlated => Box::new(CorrelatedReturns::new(
                self.config.correlation,
                assumptions,
                &self.config.correlations,
                self.config.damping_factor,
            )?),
            ModelKind::Independent => Box::new(IndependentReturns::new(assumptions)),
        };
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::progress::{CancellationToken, Progress};
    use rust_decimal_macros::dec;

    fn seeded(seed: u64) -> MonteCarloEngine {
        MonteCarloEngine::new(SimulationConfig::default().with_seed(seed))
    }

    fn zero_return_input(years: u32, withdrawal: f64, inflation: f64) -> SimulationInput {
        SimulationInput::new(100.0, years, withdrawal, 5)
            .with_allocation(AssetAllocation::all_equity())
            .with_return_assumptions(ReturnAssumptions::fixed(0.0))
            .with_inflation_rate(inflation)
            .with_simulation_count(50)
    }

    #[test]
    fn test_zero_variance_run() {
        let result = seeded(1).run(&zero_return_input(5, 10.0, 0.0)).unwrap();
        assert_eq!(result.success_probability, 100.0);
        assert_eq!(result.average_final_wealth, dec!(50));
        assert_eq!(result.median_final_wealth, dec!(50));
        assert_eq!(result.confidence_interval.p10, dec!(50));
        assert_eq!(result.confidence_interval.p90, dec!(50));
        assert_eq!(result.max_drawdown, 50.0);
        assert_eq!(result.volatility, 0.0);
    }

    #[test]
    fn test_inflation_escalation_run() {
        let result = seeded(1).run(&zero_return_input(2, 10.0, 0.10)).unwrap();
        assert_eq!(result.average_final_wealth, dec!(79));
        assert_eq!(result.median_final_wealth, dec!(79));
        assert_eq!(result.max_drawdown, 21.0);
    }

    #[test]
    fn test_default_count_and_inflation_from_config() {
        let config = SimulationConfig {
            default_simulation_count: 120,
            default_inflation_rate: 0.0,
            ..SimulationConfig::default().with_seed(5)
        };
        let mut engine = MonteCarloEngine::new(config);
        let mut input = zero_return_input(5, 10.0, 0.0);
        input.simulation_count = None;
        input.inflation_rate = None;
        let result = engine.run(&input).unwrap();
        assert_eq!(result.simulation_count, 120);
        assert_eq!(result.average_final_wealth, dec!(50));
    }

    #[test]
    fn test_invalid_input_runs_nothing() {
        let mut engine = seeded(1);
        let before = engine.rng.clone();
        let input = SimulationInput::new(0.0, 10, 1.0, 5);
        let err = engine.run(&input).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Invalid(ValidationError::InitialWealth(_))
        ));
        assert_eq!(engine.rng, before);
    }

    #[test]
    fn test_reseed_reproduces_run() {
        let input = SimulationInput::new(300_000.0, 20, 15_000.0, 7).with_simulation_count(200);
        let mut engine = seeded(11);
        let first = engine.run(&input).unwrap();
        engine.reseed(11);
        let second = engine.run(&input).unwrap();
        assert_eq!(first.paths, second.paths);
        assert_eq!(first.confidence_interval, second.confidence_interval);

        let third = engine.run(&input).unwrap();
        assert_ne!(first.paths, third.paths);
    }

    #[test]
    fn test_fallback_profile() {
        let mut engine = MonteCarloEngine::new(SimulationConfig::fallback().with_seed(3));
        let input = SimulationInput::new(250_000.0, 15, 10_000.0, 4).with_simulation_count(45);
        let mut reports = Vec::new();
        let mut on_progress = |p: &Progress| reports.push(p.completed);
        let result = engine
            .run_with(&input, RunHooks::none().with_progress(&mut on_progress))
            .unwrap();
        assert_eq!(result.simulation_count, 45);
        assert_eq!(reports, vec![10, 20, 30, 40, 45]);
    }

    #[test]
    fn test_fallback_zero_variance_matches_full_engine() {
        let input = zero_return_input(5, 10.0, 0.0);
        let full = seeded(1).run(&input).unwrap();
        let fallback = MonteCarloEngine::new(SimulationConfig::fallback().with_seed(1))
            .run(&input)
            .unwrap();
        assert_eq!(full.confidence_interval, fallback.confidence_interval);
        assert_eq!(full.success_probability, fallback.success_probability);
        assert_eq!(full.max_drawdown, fallback.max_drawdown);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let input = SimulationInput::new(100_000.0, 10, 1_000.0, 5).with_simulation_count(1_000);
        let err = seeded(1)
            .run_with(&input, RunHooks::none().with_cancel(&token))
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Cancelled {
                completed: 0,
                total: 1000
            }
        ));
    }

    #[test]
    fn test_cholesky_mode_runs() {
        let config = SimulationConfig {
            correlation: CorrelationMode::Cholesky,
            ..SimulationConfig::default().with_seed(2)
        };
        let input = SimulationInput::new(500_000.0, 30, 20_000.0, 8).with_simulation_count(300);
        let result = MonteCarloEngine::new(config).run(&input).unwrap();
        assert_eq!(result.paths.len(), 300);
    }

    #[test]
    fn test_zero_default_count_rejected() {
        let config = SimulationConfig {
            default_simulation_count: 0,
            ..SimulationConfig::default().with_seed(1)
        };
        let mut input = zero_return_input(5, 10.0, 0.0);
        input.simulation_count = None;
        let err = MonteCarloEngine::new(config).run(&input).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Invalid(ValidationError::SimulationCount)
        ));
    }

    #[test]
    fn test_non_finite_default_inflation_rejected() {
        for rate in [f64::NAN, f64::INFINITY, -1.0] {
            let config = SimulationConfig {
                default_inflation_rate: rate,
                ..SimulationConfig::default().with_seed(1)
            };
            let mut input = zero_return_input(5, 10.0, 0.0);
            input.inflation_rate = None;
            let err = MonteCarloEngine::new(config).run(&input).unwrap_err();
            assert!(matches!(
                err,
                SimulationError::Invalid(ValidationError::InflationRate(_))
            ));
        }
    }

    #[test]
    fn test_non_finite_damping_rejected() {
        let config = SimulationConfig {
            damping_factor: f64::NAN,
            ..SimulationConfig::default().with_seed(1)
        };
        let err = MonteCarloEngine::new(config)
            .run(&zero_return_input(5, 10.0, 0.0))
            .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Invalid(ValidationError::DampingFactor(_))
        ));
    }

    #[test]
    fn test_config_validate() {
        let config = SimulationConfig {
            default_simulation_count: 0,
            ..SimulationConfig::default().with_seed(1)
        };
        assert_eq!(config.validate(), Err(ValidationError::SimulationCount));
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(SimulationConfig::fallback().validate().is_ok());
    }

    #[test]
    fn test_fallback_profile_keeps_other_settings() {
        let loaded = SimulationConfig {
            default_simulation_count: 250,
            damping_factor: 0.2,
            ..SimulationConfig::default().with_seed(42).with_workers(4)
        };
        let config = loaded.with_fallback_profile();
        assert_eq!(config.model, ModelKind::Independent);
        assert_eq!(config.runner, SimulationConfig::fallback().runner);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.default_simulation_count, 250);
        assert_eq!(config.damping_factor, 0.2);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "seed": 9, "runner": { "batch_size": 50, "workers": 2 } }"#)
                .unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.runner.workers, 2);
        assert_eq!(config.default_simulation_count, 10_000);
        assert_eq!(config.model, ModelKind::Correlated);
    }
}
