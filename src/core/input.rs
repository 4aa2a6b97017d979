use crate::core::error::ValidationError;
use crate::market::assumptions::{AssetClass, ReturnAssumptions};
use serde::{Deserialize, Serialize};

pub const MIN_TIME_HORIZON: u32 = 1;
pub const MAX_TIME_HORIZON: u32 = 100;
pub const MIN_RISK_SCORE: u8 = 1;
pub const MAX_RISK_SCORE: u8 = 10;

/// Portfolio weights over the asset classes.
///
/// Weights are not forced to sum to one; the portfolio return is the plain
/// weighted sum of asset returns. Allocations derived from a risk score are
/// always normalised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetAllocation {
    pub equity: f64,
    pub bonds: f64,
    pub cash: f64,
    #[serde(default)]
    pub alternatives: f64,
}

impl AssetAllocation {
    pub fn new(equity: f64, bonds: f64, cash: f64) -> Self {
        Self {
            equity,
            bonds,
            cash,
            alternatives: 0.0,
        }
    }

    pub fn with_alternatives(mut self, alternatives: f64) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// A portfolio entirely in equity.
    pub fn all_equity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn weight(&self, asset: AssetClass) -> f64 {
        match asset {
            AssetClass::Equity => self.equity,
            AssetClass::Bonds => self.bonds,
            AssetClass::Cash => self.cash,
            AssetClass::Alternatives => self.alternatives,
        }
    }

    /// Weights in `AssetClass::ALL` order.
    pub fn weights(&self) -> [f64; 4] {
        [self.equity, self.bonds, self.cash, self.alternatives]
    }

    pub fn total(&self) -> f64 {
        self.weights().iter().sum()
    }

    /// Scale the weights so they sum to one. A zero allocation is returned
    /// unchanged.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total <= 0.0 {
            return *self;
        }
        Self {
            equity: self.equity / total,
            bonds: self.bonds / total,
            cash: self.cash / total,
            alternatives: self.alternatives / total,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for asset in AssetClass::ALL {
            let weight = self.weight(asset);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValidationError::AllocationWeight {
                    asset: asset.as_str(),
                    weight,
                });
            }
        }
        if self.total() <= 0.0 {
            return Err(ValidationError::EmptyAllocation);
        }
        Ok(())
    }
}

/// Per-run configuration for a wealth projection.
///
/// # Examples
///
/// ```
/// use wealth_montecarlo::core::input::SimulationInput;
///
/// let input = SimulationInput::new(500_000.0, 30, 20_000.0, 6)
///     .with_inflation_rate(0.02)
///     .with_simulation_count(1_000);
/// assert!(input.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub initial_wealth: f64,
    pub time_horizon_years: u32,
    pub annual_withdrawal: f64,
    /// 1 (most cautious) to 10 (most adventurous). Only used to derive an
    /// allocation when none is given.
    pub risk_score: u8,
    #[serde(default)]
    pub inflation_rate: Option<f64>,
    #[serde(default)]
    pub simulation_count: Option<usize>,
    #[serde(default)]
    pub allocation: Option<AssetAllocation>,
    #[serde(default)]
    pub return_assumptions: Option<ReturnAssumptions>,
}

impl SimulationInput {
    pub fn new(
        initial_wealth: f64,
        time_horizon_years: u32,
        annual_withdrawal: f64,
        risk_score: u8,
    ) -> Self {
        Self {
            initial_wealth,
            time_horizon_years,
            annual_withdrawal,
            risk_score,
            inflation_rate: None,
            simulation_count: None,
            allocation: None,
            return_assumptions: None,
        }
    }

    pub fn with_inflation_rate(mut self, rate: f64) -> Self {
        self.inflation_rate = Some(rate);
        self
    }

    pub fn with_simulation_count(mut self, count: usize) -> Self {
        self.simulation_count = Some(count);
        self
    }

    pub fn with_allocation(mut self, allocation: AssetAllocation) -> Self {
        self.allocation = Some(allocation);
        self
    }

    pub fn with_return_assumptions(mut self, assumptions: ReturnAssumptions) -> Self {
        self.return_assumptions = Some(assumptions);
        self
    }

    /// Check every field before any path runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.initial_wealth.is_finite() || self.initial_wealth <= 0.0 {
            return Err(ValidationError::InitialWealth(self.initial_wealth));
        }
        if !(MIN_TIME_HORIZON..=MAX_TIME_HORIZON).contains(&self.time_horizon_years) {
            return Err(ValidationError::TimeHorizon(self.time_horizon_years));
        }
        if !self.annual_withdrawal.is_finite() || self.annual_withdrawal < 0.0 {
            return Err(ValidationError::Withdrawal(self.annual_withdrawal));
        }
        if !(MIN_RISK_SCORE..=MAX_RISK_SCORE).contains(&self.risk_score) {
            return Err(ValidationError::RiskScore(self.risk_score));
        }
        if let Some(rate) = self.inflation_rate {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(ValidationError::InflationRate(rate));
            }
        }
        if self.simulation_count == Some(0) {
            return Err(ValidationError::SimulationCount);
        }
        if let Some(allocation) = &self.allocation {
            allocation.validate()?;
        }
        if let Some(assumptions) = &self.return_assumptions {
            assumptions.validate()?;
        }
        Ok(())
    }
}
