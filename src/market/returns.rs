//! Annual asset return models.
//!
//! Two models share one interface:
//!
//! - [`CorrelatedReturns`] draws all four asset classes and links them to
//!   equity, either through a damped nudge toward the equity shock (the
//!   default, an approximation) or through a Cholesky factor of the full
//!   correlation table.
//! - [`IndependentReturns`] draws equity, bonds and cash independently and is
//!   used by the fallback profile.

use crate::core::error::SimulationError;
use crate::core::input::AssetAllocation;
use crate::core::rng::Lcg;
use crate::market::assumptions::{AssetClass, CorrelationTable, ReturnAssumptions};
use serde::{Deserialize, Serialize};

/// How correlated shocks are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMode {
    /// Each non-equity shock is nudged by `rho * z_equity * damping`.
    #[default]
    Damped,
    /// Exact multivariate-normal shocks via a Cholesky factor.
    Cholesky,
}

/// One year's return per asset class, in `AssetClass::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetReturns([f64; 4]);

impl AssetReturns {
    pub fn new(returns: [f64; 4]) -> Self {
        Self(returns)
    }

    pub fn get(&self, asset: AssetClass) -> f64 {
        self.0[asset.index()]
    }

    /// Weighted sum of asset returns.
    pub fn portfolio_return(&self, allocation: &AssetAllocation) -> f64 {
        allocation
            .weights()
            .iter()
            .zip(self.0.iter())
            .map(|(w, r)| w * r)
            .sum()
    }
}

/// Source of one year of asset returns.
pub trait ReturnModel: Send + Sync {
    fn draw(&self, rng: &mut Lcg) -> AssetReturns;
}

#[derive(Debug, Clone)]
enum Linkage {
    Damped { equity_rho: [f64; 4], damping: f64 },
    Cholesky { factor: [[f64; 4]; 4] },
}

/// Four-asset model with equity-linked shocks.
#[derive(Debug, Clone)]
pub struct CorrelatedReturns {
    assumptions: ReturnAssumptions,
    linkage: Linkage,
}

impl CorrelatedReturns {
    /// Damped approximation: cheap, but not exact multivariate sampling.
    pub fn damped(
        assumptions: ReturnAssumptions,
        correlations: &CorrelationTable,
        damping: f64,
    ) -> Self {
        let mut equity_rho = [0.0; 4];
        for asset in AssetClass::ALL {
            if asset != AssetClass::Equity {
                equity_rho[asset.index()] = correlations.get(asset, AssetClass::Equity);
            }
        }
        Self {
            assumptions,
            linkage: Linkage::Damped {
                equity_rho,
                damping,
            },
        }
    }

    pub fn cholesky(
        assumptions: ReturnAssumptions,
        correlations: &CorrelationTable,
    ) -> Result<Self, SimulationError> {
        let factor = cholesky_factor(correlations.matrix())
            .ok_or(SimulationError::CorrelationNotPositiveDefinite)?;
        Ok(Self {
            assumptions,
            linkage: Linkage::Cholesky { factor },
        })
    }

    pub fn new(
        mode: CorrelationMode,
        assumptions: ReturnAssumptions,
        correlations: &CorrelationTable,
        damping: f64,
    ) -> Result<Self, SimulationError> {
        match mode {
            CorrelationMode::Damped => Ok(Self::damped(assumptions, correlations, damping)),
            CorrelationMode::Cholesky => Self::cholesky(assumptions, correlations),
        }
    }
}

impl ReturnModel for CorrelatedReturns {
    fn draw(&self, rng: &mut Lcg) -> AssetReturns {
        let mut z = [0.0; 4];
        for shock in z.iter_mut() {
            *shock = rng.standard_normal();
        }

        let linked = match &self.linkage {
            Linkage::Damped {
                equity_rho,
                damping,
            } => {
                let equity = z[AssetClass::Equity.index()];
                let mut out = z;
                for (i, shock) in out.iter_mut().enumerate() {
                    *shock += equity_rho[i] * equity * damping;
                }
                out
            }
            Linkage::Cholesky { factor } => {
                let mut out = [0.0; 4];
                for (i, row) in factor.iter().enumerate() {
                    out[i] = row.iter().zip(z.iter()).map(|(l, s)| l * s).sum();
                }
                out
            }
        };

        let mut returns = [0.0; 4];
        for asset in AssetClass::ALL {
            let p = self.assumptions.get(asset);
            returns[asset.index()] = p.expected_return + p.volatility * linked[asset.index()];
        }
        AssetReturns(returns)
    }
}

/// Three-asset model with no correlation. Alternatives track equity.
#[derive(Debug, Clone)]
pub struct IndependentReturns {
    assumptions: ReturnAssumptions,
}

impl IndependentReturns {
    pub fn new(assumptions: ReturnAssumptions) -> Self {
        Self { assumptions }
    }
}

impl ReturnModel for IndependentReturns {
    fn draw(&self, rng: &mut Lcg) -> AssetReturns {
        let a = &self.assumptions;
        let equity = rng.normal(a.equity.expected_return, a.equity.volatility);
        let bonds = rng.normal(a.bonds.expected_return, a.bonds.volatility);
        let cash = rng.normal(a.cash.expected_return, a.cash.volatility);
        AssetReturns([equity, bonds, cash, equity])
    }
}

/// Lower-triangular `L` with `L * L^T = m`, or `None` if `m` is not
/// positive definite.
fn cholesky_factor(m: &[[f64; 4]; 4]) -> Option<[[f64; 4]; 4]> {
    let mut l = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let d = m[i][i] - sum;
                if d <= 0.0 || !d.is_finite() {
                    return None;
                }
                l[i][j] = d.sqrt();
            } else {
                l[i][j] = (m[i][j] - sum) / l[j][j];
            }
        }
    }
    Some(l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_correlation(model: &dyn ReturnModel, a: AssetClass, b: AssetClass) -> f64 {
        let mut rng = Lcg::new(31337);
        let n = 40_000;
        let draws: Vec<AssetReturns> = (0..n).map(|_| model.draw(&mut rng)).collect();
        let mean = |asset: AssetClass| draws.iter().map(|d| d.get(asset)).sum::<f64>() / n as f64;
        let (ma, mb) = (mean(a), mean(b));
        let cov = draws
            .iter()
            .map(|d| (d.get(a) - ma) * (d.get(b) - mb))
            .sum::<f64>();
        let va = draws.iter().map(|d| (d.get(a) - ma).powi(2)).sum::<f64>();
        let vb = draws.iter().map(|d| (d.get(b) - mb).powi(2)).sum::<f64>();
        cov / (va.sqrt() * vb.sqrt())
    }

    #[test]
    fn test_fixed_assumptions_yield_fixed_returns() {
        let model = CorrelatedReturns::damped(
            ReturnAssumptions::fixed(0.04),
            &CorrelationTable::default(),
            0.1,
        );
        let mut rng = Lcg::new(1);
        for _ in 0..10 {
            let r = model.draw(&mut rng);
            for asset in AssetClass::ALL {
                assert_relative_eq!(r.get(asset), 0.04);
            }
        }
    }

    #[test]
    fn test_portfolio_return_is_weighted_sum() {
        let returns = AssetReturns::new([0.10, 0.04, 0.02, -0.05]);
        let allocation = AssetAllocation::new(0.5, 0.3, 0.1).with_alternatives(0.1);
        assert_relative_eq!(
            returns.portfolio_return(&allocation),
            0.05 + 0.012 + 0.002 - 0.005,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_damped_linkage_is_positive_and_weak() {
        let model = CorrelatedReturns::damped(
            ReturnAssumptions::default(),
            &CorrelationTable::default(),
            0.1,
        );
        let rho = sample_correlation(&model, AssetClass::Equity, AssetClass::Alternatives);
        // Damping 0.1 with rho 0.6 gives roughly 0.06.
        assert!(rho > 0.02 && rho < 0.12, "sample correlation {rho}");
    }

    #[test]
    fn test_cholesky_reproduces_table() {
        let model =
            CorrelatedReturns::cholesky(ReturnAssumptions::default(), &CorrelationTable::default())
                .unwrap();
        let rho = sample_correlation(&model, AssetClass::Equity, AssetClass::Alternatives);
        assert!((rho - 0.6).abs() < 0.03, "sample correlation {rho}");
    }

    #[test]
    fn test_cholesky_rejects_inconsistent_table() {
        let mut table = CorrelationTable::identity();
        table.set(AssetClass::Equity, AssetClass::Bonds, 0.95);
        table.set(AssetClass::Equity, AssetClass::Cash, 0.95);
        table.set(AssetClass::Bonds, AssetClass::Cash, -0.95);
        let result = CorrelatedReturns::cholesky(ReturnAssumptions::default(), &table);
        assert!(matches!(
            result,
            Err(SimulationError::CorrelationNotPositiveDefinite)
        ));
    }

    #[test]
    fn test_cholesky_of_identity_is_identity() {
        let factor = cholesky_factor(CorrelationTable::identity().matrix()).unwrap();
        for (i, row) in factor.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                assert_eq!(*value, if i == j { 1.0 } else { 0.0 });
            }
        }
    }

    #[test]
    fn test_independent_model_folds_alternatives_into_equity() {
        let model = IndependentReturns::new(ReturnAssumptions::default());
        let mut rng = Lcg::new(8);
        let r = model.draw(&mut rng);
        assert_eq!(r.get(AssetClass::Alternatives), r.get(AssetClass::Equity));
    }
}
