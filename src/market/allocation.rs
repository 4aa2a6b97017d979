//! Risk-score allocation policy.
//!
//! Maps a 1-10 attitude-to-risk score onto a continuous equity/bond/cash
//! split by linear interpolation between the two ends of the range.

use crate::core::input::{AssetAllocation, MAX_RISK_SCORE, MIN_RISK_SCORE};

/// (equity, bonds, cash) at risk score 1.
const MOST_CAUTIOUS: (f64, f64, f64) = (0.10, 0.80, 0.10);
/// (equity, bonds, cash) at risk score 10.
const MOST_ADVENTUROUS: (f64, f64, f64) = (0.82, 0.17, 0.01);

/// Derive a normalised allocation for a risk score.
///
/// Scores outside 1-10 are clamped.
///
/// # Examples
///
/// ```
/// use wealth_montecarlo::market::allocation::allocation_for_risk_score;
///
/// let cautious = allocation_for_risk_score(1);
/// let adventurous = allocation_for_risk_score(10);
/// assert!(cautious.equity < adventurous.equity);
/// assert!((adventurous.total() - 1.0).abs() < 1e-12);
/// ```
pub fn allocation_for_risk_score(score: u8) -> AssetAllocation {
    let score = score.clamp(MIN_RISK_SCORE, MAX_RISK_SCORE);
    let t = f64::from(score - MIN_RISK_SCORE) / f64::from(MAX_RISK_SCORE - MIN_RISK_SCORE);

    let lerp = |from: f64, to: f64| from + (to - from) * t;
    AssetAllocation::new(
        lerp(MOST_CAUTIOUS.0, MOST_ADVENTUROUS.0),
        lerp(MOST_CAUTIOUS.1, MOST_ADVENTUROUS.1),
        lerp(MOST_CAUTIOUS.2, MOST_ADVENTUROUS.2),
    )
    .normalized()
}
