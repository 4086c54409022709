//! Run result and signal diagnostics.

use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, ExitReason, Trade};
use crate::metrics::PerformanceMetrics;

/// What happened to every signal handed to the engine.
///
/// `received == accepted + below_confidence + rejected_capacity
///  + rejected_no_capital + unmatched`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub received: usize,
    pub accepted: usize,
    pub below_confidence: usize,
    /// Arrived while every position slot was taken. Not queued.
    pub rejected_capacity: usize,
    /// Arrived while realized capital was <= 0.
    pub rejected_no_capital: usize,
    /// No candle shares the signal's timestamp.
    pub unmatched: usize,
}

impl SignalSummary {
    pub fn rejected(&self) -> usize {
        self.below_confidence + self.rejected_capacity + self.rejected_no_capital
    }
}

/// Complete output of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Every trade opened, in opening order. All closed.
    pub trades: Vec<Trade>,
    /// One point per candle.
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: PerformanceMetrics,
    pub signals: SignalSummary,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub candle_count: usize,
    /// Highest number of simultaneously open trades seen at any candle.
    pub peak_open_positions: usize,
}

impl BacktestResult {
    /// BLAKE3 hex digest of the serialized result.
    ///
    /// Two runs over identical inputs produce identical fingerprints.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    /// Open trades count at the close of candle `index`, reconstructed from the
    /// trade list. Trades force-closed at end of data count as open on the last
    /// candle up to the moment of closure.
    pub fn open_positions_at(&self, index: usize) -> usize {
        self.trades
            .iter()
            .filter(|t| {
                t.entry_index <= index
                    && t.exit_index.map_or(true, |exit| {
                        exit > index
                            || (exit == index && t.exit_reason == Some(ExitReason::EndOfData))
                    })
            })
            .count()
    }
}
