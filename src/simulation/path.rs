use crate::core::input::AssetAllocation;
use crate::core::rng::Lcg;
use crate::market::returns::ReturnModel;
use serde::{Deserialize, Serialize};

/// Outcome of one simulated wealth trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Wealth at the end of the horizon, floored at zero.
    pub final_wealth: f64,
    /// True when final wealth is above zero.
    pub success: bool,
    /// How far below zero wealth fell in the depletion year. Zero on success.
    pub shortfall: f64,
    /// Largest peak-to-trough decline, as a fraction of the peak.
    pub max_drawdown: f64,
    /// 1-based year in which wealth ran out, if it did.
    pub depleted_in_year: Option<u32>,
    /// End-of-year wealth, one entry per year of the horizon.
    pub yearly_wealth: Vec<f64>,
    /// Portfolio return applied in each year.
    pub yearly_returns: Vec<f64>,
}

/// Per-path state between years.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PathState {
    Continuing,
    Depleted { shortfall: f64 },
}

/// Parameters shared by every path of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathParams {
    pub initial_wealth: f64,
    pub time_horizon_years: u32,
    pub annual_withdrawal: f64,
    pub inflation_rate: f64,
}

/// Evolves single wealth trajectories year by year.
pub struct PathSimulator<'a> {
    params: PathParams,
    allocation: AssetAllocation,
    model: &'a dyn ReturnModel,
}

impl<'a> PathSimulator<'a> {
    pub fn new(params: PathParams, allocation: AssetAllocation, model: &'a dyn ReturnModel) -> Self {
        Self {
            params,
            allocation,
            model,
        }
    }

    /// Simulate one path, advancing `rng` once per year until depletion.
    ///
    /// Each year: apply the portfolio return, subtract the withdrawal (grown
    /// by inflation after the first year), then track peak and drawdown.
    /// Once wealth reaches zero no further draws are taken and the remaining
    /// years are recorded as zero.
    pub fn simulate(&self, rng: &mut Lcg) -> PathResult {
        let horizon = self.params.time_horizon_years as usize;
        let mut yearly_wealth = Vec::with_capacity(horizon);
        let mut yearly_returns = Vec::with_capacity(horizon);

        let mut wealth = self.params.initial_wealth;
        let mut peak = wealth;
        let mut max_drawdown: f64 = 0.0;
        let mut withdrawal = self.params.annual_withdrawal;
        let mut state = PathState::Continuing;
        let mut depleted_in_year = None;

        for year in 0..horizon {
            let portfolio_return = self.model.draw(rng).portfolio_return(&self.allocation);
            wealth *= 1.0 + portfolio_return;
            if year > 0 {
                withdrawal *= 1.0 + self.params.inflation_rate;
            }
            wealth -= withdrawal;

            if wealth <= 0.0 {
                state = PathState::Depleted { shortfall: -wealth };
                depleted_in_year = Some(year as u32 + 1);
                wealth = 0.0;
            }

            if wealth > peak {
                peak = wealth;
            }
            let drawdown = if wealth < peak {
                (peak - wealth) / peak
            } else {
                0.0
            };
            max_drawdown = max_drawdown.max(drawdown);

            yearly_wealth.push(wealth);
            yearly_returns.push(portfolio_return);

            if let PathState::Depleted { .. } = state {
                yearly_wealth.resize(horizon, 0.0);
                yearly_returns.resize(horizon, 0.0);
                break;
            }
        }

        let shortfall = match state {
            PathState::Continuing => 0.0,
            PathState::Depleted { shortfall } => shortfall,
        };

        PathResult {
            final_wealth: wealth,
            success: wealth > 0.0,
            shortfall,
            max_drawdown,
            depleted_in_year,
            yearly_wealth,
            yearly_returns,
        }
    }
}
