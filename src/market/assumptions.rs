use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset classes a portfolio can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Bonds,
    Cash,
    Alternatives,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Equity,
        AssetClass::Bonds,
        AssetClass::Cash,
        AssetClass::Alternatives,
    ];

    /// Position of this class in per-asset arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Bonds => "bonds",
            AssetClass::Cash => "cash",
            AssetClass::Alternatives => "alternatives",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected annual return and volatility, as decimal fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnParams {
    pub expected_return: f64,
    pub volatility: f64,
}

impl ReturnParams {
    pub const fn new(expected_return: f64, volatility: f64) -> Self {
        Self {
            expected_return,
            volatility,
        }
    }
}

/// Per-asset-class return parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnAssumptions {
    pub equity: ReturnParams,
    pub bonds: ReturnParams,
    pub cash: ReturnParams,
    pub alternatives: ReturnParams,
}

impl Default for ReturnAssumptions {
    fn default() -> Self {
        Self {
            equity: ReturnParams::new(0.07, 0.16),
            bonds: ReturnParams::new(0.035, 0.06),
            cash: ReturnParams::new(0.02, 0.01),
            alternatives: ReturnParams::new(0.06, 0.12),
        }
    }
}

impl ReturnAssumptions {
    /// Every asset class returns exactly `rate` each year.
    pub fn fixed(rate: f64) -> Self {
        let params = ReturnParams::new(rate, 0.0);
        Self {
            equity: params,
            bonds: params,
            cash: params,
            alternatives: params,
        }
    }

    pub fn get(&self, asset: AssetClass) -> ReturnParams {
        match asset {
            AssetClass::Equity => self.equity,
            AssetClass::Bonds => self.bonds,
            AssetClass::Cash => self.cash,
            AssetClass::Alternatives => self.alternatives,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for asset in AssetClass::ALL {
            let p = self.get(asset);
            if !p.expected_return.is_finite() || !p.volatility.is_finite() || p.volatility < 0.0 {
                return Err(ValidationError::ReturnAssumption {
                    asset: asset.as_str(),
                    mean: p.expected_return,
                    volatility: p.volatility,
                });
            }
        }
        Ok(())
    }
}

/// Symmetric pairwise correlation table with a unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTable {
    matrix: [[f64; 4]; 4],
}

impl Default for CorrelationTable {
    fn default() -> Self {
        use AssetClass::*;
        let mut table = Self::identity();
        table.set(Equity, Bonds, 0.2);
        table.set(Equity, Cash, 0.0);
        table.set(Equity, Alternatives, 0.6);
        table.set(Bonds, Cash, 0.1);
        table.set(Bonds, Alternatives, 0.2);
        table.set(Cash, Alternatives, 0.0);
        table
    }
}

impl CorrelationTable {
    pub fn identity() -> Self {
        let mut matrix = [[0.0; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { matrix }
    }

    /// Set the correlation for a pair. Both orderings are updated.
    pub fn set(&mut self, a: AssetClass, b: AssetClass, rho: f64) {
        if a == b {
            return;
        }
        self.matrix[a.index()][b.index()] = rho;
        self.matrix[b.index()][a.index()] = rho;
    }

    pub fn get(&self, a: AssetClass, b: AssetClass) -> f64 {
        self.matrix[a.index()][b.index()]
    }

    pub fn matrix(&self) -> &[[f64; 4]; 4] {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_symmetric() {
        let table = CorrelationTable::default();
        for a in AssetClass::ALL {
            assert_eq!(table.get(a, a), 1.0);
            for b in AssetClass::ALL {
                assert_eq!(table.get(a, b), table.get(b, a));
            }
        }
        assert_eq!(table.get(AssetClass::Alternatives, AssetClass::Equity), 0.6);
    }

    #[test]
    fn test_diagonal_cannot_be_overwritten() {
        let mut table = CorrelationTable::identity();
        table.set(AssetClass::Cash, AssetClass::Cash, 0.3);
        assert_eq!(table.get(AssetClass::Cash, AssetClass::Cash), 1.0);
    }

    #[test]
    fn test_negative_volatility_rejected() {
        let mut assumptions = ReturnAssumptions::default();
        assumptions.bonds.volatility = -0.01;
        assert!(matches!(
            assumptions.validate(),
            Err(ValidationError::ReturnAssumption { asset: "bonds", .. })
        ));
    }

    #[test]
    fn test_fixed_assumptions_have_no_volatility() {
        let assumptions = ReturnAssumptions::fixed(0.0);
        assert!(assumptions.validate().is_ok());
        for asset in AssetClass::ALL {
            assert_eq!(assumptions.get(asset).volatility, 0.0);
        }
    }
}
