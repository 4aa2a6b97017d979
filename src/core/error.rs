use thiserror::Error;

/// Rejections raised before any path is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("initial wealth must be a positive amount, got {0}")]
    InitialWealth(f64),
    #[error("time horizon must be between 1 and 100 years, got {0}")]
    TimeHorizon(u32),
    #[error("annual withdrawal must not be negative, got {0}")]
    Withdrawal(f64),
    #[error("risk score must be between 1 and 10, got {0}")]
    RiskScore(u8),
    #[error("inflation rate must be finite and above -100%, got {0}")]
    InflationRate(f64),
    #[error("simulation count must be at least 1")]
    SimulationCount,
    #[error("allocation weight for {asset} must be finite and non-negative, got {weight}")]
    AllocationWeight { asset: &'static str, weight: f64 },
    #[error("allocation weights must not all be zero")]
    EmptyAllocation,
    #[error("return assumption for {asset} is invalid: mean {mean}, volatility {volatility}")]
    ReturnAssumption {
        asset: &'static str,
        mean: f64,
        volatility: f64,
    },
    #[error("batch size must be at least 1")]
    BatchSize,
    #[error("worker count must be at least 1")]
    WorkerCount,
    #[error("correlation damping factor must be finite, got {0}")]
    DampingFactor(f64),
}

/// Every way a simulation call can end without a result.
///
/// A completed run where some (or all) paths deplete is not an error; it is
/// reported through the success and shortfall fields of the result.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid simulation input: {0}")]
    Invalid(#[from] ValidationError),
    #[error("simulation cancelled after {completed} of {total} paths")]
    Cancelled { completed: usize, total: usize },
    #[error("correlation table is not positive definite")]
    CorrelationNotPositiveDefinite,
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
}

impl SimulationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SimulationError::Cancelled { .. })
    }
}
