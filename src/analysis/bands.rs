//! Year-by-year wealth percentiles for fan charts.

use crate::analysis::statistics::{percentile, round_currency};
use crate::simulation::path::PathResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wealth percentiles across all paths at the end of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearBand {
    /// 1-based year of the horizon.
    pub year: u32,
    pub p10: Decimal,
    pub p25: Decimal,
    pub p50: Decimal,
    pub p75: Decimal,
    pub p90: Decimal,
}

/// Compute one band per year from the paths' yearly wealth series.
///
/// Paths are expected to share the same horizon; the shortest series
/// bounds the number of bands.
pub fn yearly_bands(paths: &[PathResult]) -> Vec<YearBand> {
    let years = paths
        .iter()
        .map(|p| p.yearly_wealth.len())
        .min()
        .unwrap_or(0);

    let mut column = Vec::with_capacity(paths.len());
    (0..years)
        .map(|year| {
            column.clear();
            column.extend(paths.iter().map(|p| p.yearly_wealth[year]));
            column.sort_by(f64::total_cmp);
            YearBand {
                year: year as u32 + 1,
                p10: round_currency(percentile(&column, 10.0)),
                p25: round_currency(percentile(&column, 25.0)),
                p50: round_currency(percentile(&column, 50.0)),
                p75: round_currency(percentile(&column, 75.0)),
                p90: round_currency(percentile(&column, 90.0)),
            }
        })
        .collect()
}
