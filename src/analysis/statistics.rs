//! Reduction of simulated paths to outcome statistics.
//!
//! Currency figures are carried as [`Decimal`] rounded to whole units;
//! percentages stay `f64`, rounded to two places through [`Decimal`].

use crate::simulation::path::PathResult;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Percentile bands of the final-wealth distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub p10: Decimal,
    pub p25: Decimal,
    pub p50: Decimal,
    pub p75: Decimal,
    pub p90: Decimal,
}

/// Aggregate outcome of a Monte Carlo run.
///
/// Currency fields are whole units; percentage fields are 0-100 values
/// rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub simulation_count: usize,
    /// Share of paths ending with wealth above zero.
    pub success_probability: f64,
    pub average_final_wealth: Decimal,
    pub median_final_wealth: Decimal,
    pub confidence_interval: ConfidenceInterval,
    /// 100 minus the success probability.
    pub shortfall_risk: f64,
    /// Mean shortfall over failed paths only.
    pub average_shortfall: Decimal,
    /// Largest drawdown seen on any path.
    pub max_drawdown: f64,
    /// Coefficient of variation of final wealth across paths.
    pub volatility: f64,
    pub paths: Vec<PathResult>,
    pub execution_time_ms: u64,
}

impl MonteCarloResult {
    pub fn with_execution_time(mut self, elapsed: Duration) -> Self {
        self.execution_time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn failed_paths(&self) -> usize {
        self.paths.iter().filter(|p| !p.success).count()
    }
}

/// Round to whole currency units, half away from zero.
pub fn round_currency(value: f64) -> Decimal {
    to_decimal(value).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a percentage to two decimal places, half away from zero.
pub fn round_percent(value: f64) -> f64 {
    to_decimal(value)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(value)
}

fn to_decimal(value: f64) -> Decimal {
    match Decimal::from_f64(value) {
        Some(d) => d,
        None if value > 0.0 => Decimal::MAX,
        None if value < 0.0 => Decimal::MIN,
        None => Decimal::ZERO,
    }
}

/// Interpolated percentile of an ascending slice.
///
/// `p` is 0-100. The rank `p/100 * (n-1)` is split into floor and ceiling
/// neighbours and linearly interpolated. An empty slice yields zero.
///
/// # Examples
///
/// ```
/// use wealth_montecarlo::analysis::statistics::percentile;
///
/// let sorted = [10.0, 20.0, 30.0, 40.0];
/// assert_eq!(percentile(&sorted, 50.0), 25.0);
/// assert_eq!(percentile(&sorted, 100.0), 40.0);
/// ```
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let index = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = index.floor() as usize;
            let upper = index.ceil() as usize;
            if lower == upper {
                return sorted[lower];
            }
            let weight = index - lower as f64;
            sorted[lower] * (1.0 - weight) + sorted[upper] * weight
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation over mean, or zero when the mean is zero.
fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / m
}

/// Reduce path results to the run's statistics.
///
/// Execution time is left at zero; the runner stamps it afterwards.
pub fn aggregate(paths: Vec<PathResult>) -> MonteCarloResult {
    let n = paths.len();
    let mut finals: Vec<f64> = paths.iter().map(|p| p.final_wealth).collect();
    finals.sort_by(f64::total_cmp);

    let successes = paths.iter().filter(|p| p.success).count();
    let success_probability = if n == 0 {
        0.0
    } else {
        round_percent(successes as f64 / n as f64 * 100.0)
    };
    let shortfall_risk = if n == 0 {
        0.0
    } else {
        round_percent(100.0 - success_probability)
    };

    let shortfalls: Vec<f64> = paths
        .iter()
        .filter(|p| !p.success)
        .map(|p| p.shortfall)
        .collect();

    let max_drawdown = paths
        .iter()
        .map(|p| p.max_drawdown)
        .fold(0.0_f64, f64::max);

    let confidence_interval = ConfidenceInterval {
        p10: round_currency(percentile(&finals, 10.0)),
        p25: round_currency(percentile(&finals, 25.0)),
        p50: round_currency(percentile(&finals, 50.0)),
        p75: round_currency(percentile(&finals, 75.0)),
        p90: round_currency(percentile(&finals, 90.0)),
    };

    MonteCarloResult {
        simulation_count: n,
        success_probability,
        average_final_wealth: round_currency(mean(&finals)),
        median_final_wealth: confidence_interval.p50,
        confidence_interval,
        shortfall_risk,
        average_shortfall: round_currency(mean(&shortfalls)),
        max_drawdown: round_percent(max_drawdown * 100.0),
        volatility: round_percent(coefficient_of_variation(&finals) * 100.0),
        paths,
        execution_time_ms: 0,
    }
}

impl fmt::Display for MonteCarloResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Monte Carlo Result ===")?;
        writeln!(f, "Simulations:          {}", self.simulation_count)?;
        writeln!(f, "Success Probability:  {:.2}%", self.success_probability)?;
        writeln!(f, "Average Final Wealth: {}", self.average_final_wealth)?;
        writeln!(f, "Median Final Wealth:  {}", self.median_final_wealth)?;

        writeln!(f, "\nFinal Wealth Percentiles:")?;
        let ci = &self.confidence_interval;
        writeln!(f, "  P10: {}", ci.p10)?;
        writeln!(f, "  P25: {}", ci.p25)?;
        writeln!(f, "  P50: {}", ci.p50)?;
        writeln!(f, "  P75: {}", ci.p75)?;
        writeln!(f, "  P90: {}", ci.p90)?;

        writeln!(f, "\nRisk:")?;
        writeln!(f, "  Shortfall Risk:    {:.2}%", self.shortfall_risk)?;
        writeln!(f, "  Average Shortfall: {}", self.average_shortfall)?;
        writeln!(f, "  Max Drawdown:      {:.2}%", self.max_drawdown)?;
        writeln!(f, "  Volatility (CV):   {:.2}%", self.volatility)?;
        writeln!(f, "\nExecution Time: {} ms", self.execution_time_ms)?;
        Ok(())
    }
}
