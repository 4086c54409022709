use thiserror::Error;

use crate::domain::{Candle, PredictionSignal, Timestamp};

/// Malformed candle or signal data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("candle {index} (timestamp {timestamp}): {reason}")]
    InvalidCandle {
        index: usize,
        timestamp: Timestamp,
        reason: &'static str,
    },

    #[error("candle {index}: timestamp {timestamp} is not after previous timestamp {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        timestamp: Timestamp,
        previous: Timestamp,
    },

    #[error("signal {index} (timestamp {timestamp}): {reason}")]
    InvalidSignal {
        index: usize,
        timestamp: Timestamp,
        reason: &'static str,
    },

    #[error("signal {index} (timestamp {timestamp}): price {price} outside aligned candle range [{low}, {high}]")]
    SignalOutsideCandle {
        index: usize,
        timestamp: Timestamp,
        price: f64,
        low: f64,
        high: f64,
    },
}

/// Candles must be finite, internally consistent, and strictly increasing in time.
pub fn validate_candles(candles: &[Candle]) -> Result<(), DataError> {
    let mut previous: Option<Timestamp> = None;

    for (index, candle) in candles.iter().enumerate() {
        let reject = |reason| DataError::InvalidCandle {
            index,
            timestamp: candle.timestamp,
            reason,
        };

        if candle.has_non_finite() {
            return Err(reject("non-finite OHLCV value"));
        }
        if candle.low <= 0.0 {
            return Err(reject("prices must be > 0"));
        }
        if candle.high < candle.low {
            return Err(reject("high is below low"));
        }
        if !candle.is_sane() {
            return Err(reject("open/close outside [low, high]"));
        }
        if candle.volume < 0.0 {
            return Err(reject("negative volume"));
        }

        if let Some(prev) = previous {
            if candle.timestamp <= prev {
                return Err(DataError::NonIncreasingTimestamp {
                    index,
                    timestamp: candle.timestamp,
                    previous: prev,
                });
            }
        }
        previous = Some(candle.timestamp);
    }

    Ok(())
}

/// Signals must carry a finite confidence in [0, 100] and a positive finite price.
///
/// Signal order is not checked. Signals without a matching candle are simply
/// never actionable; see `validate_alignment` for the ones that match.
pub fn validate_signals(signals: &[PredictionSignal]) -> Result<(), DataError> {
    for (index, signal) in signals.iter().enumerate() {
        let reject = |reason| DataError::InvalidSignal {
            index,
            timestamp: signal.timestamp,
            reason,
        };

        if !signal.confidence.is_finite() || !(0.0..=100.0).contains(&signal.confidence) {
            return Err(reject("confidence must be finite and in [0, 100]"));
        }
        if !signal.price.is_finite() || signal.price <= 0.0 {
            return Err(reject("price must be finite and > 0"));
        }
    }
    Ok(())
}

/// Signals aligned to a candle must be fillable inside that candle's range.
///
/// Expects candles already validated, so timestamps are sorted.
pub fn validate_alignment(candles: &[Candle], signals: &[PredictionSignal]) -> Result<(), DataError> {
    for (index, signal) in signals.iter().enumerate() {
        let Ok(pos) = candles.binary_search_by_key(&signal.timestamp, |c| c.timestamp) else {
            continue;
        };
        let candle = &candles[pos];
        if signal.price < candle.low || signal.price > candle.high {
            return Err(DataError::SignalOutsideCandle {
                index,
                timestamp: signal.timestamp,
                price: signal.price,
                low: candle.low,
                high: candle.high,
            });
        }
    }
    Ok(())
}

pub fn validate_inputs(candles: &[Candle], signals: &[PredictionSignal]) -> Result<(), DataError> {
    validate_candles(candles)?;
    validate_signals(signals)?;
    validate_alignment(candles, signals)
}
