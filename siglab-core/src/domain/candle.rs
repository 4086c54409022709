//! Candle: the fundamental market data unit.

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// One OHLCV record. Position in the candle sequence is the discrete time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: Timestamp, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, open and close inside the range, positive prices.
    pub fn is_sane(&self) -> bool {
        if self.has_non_finite() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.low > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle() -> Candle {
        Candle::new(60_000, 100.0, 105.0, 98.0, 103.0, 5_000.0)
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_nan() {
        let mut candle = sample_candle();
        candle.close = f64::NAN;
        assert!(candle.has_non_finite());
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_infinite_volume() {
        let mut candle = sample_candle();
        candle.volume = f64::INFINITY;
        assert!(candle.has_non_finite());
    }

    #[test]
    fn candle_detects_inverted_range() {
        let mut candle = sample_candle();
        candle.high = 97.0; // below low
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_rejects_close_outside_range() {
        let mut candle = sample_candle();
        candle.close = 106.0;
        assert!(!candle.is_sane());
    }
}
