use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Account value at one candle's close, open trades marked to that close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: Timestamp,
    pub equity: f64,
}

/// Equity values without timestamps, for the metric functions.
pub fn equity_values(curve: &[EquityPoint]) -> Vec<f64> {
    curve.iter().map(|p| p.equity).collect()
}
