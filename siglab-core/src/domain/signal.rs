//! Prediction signals produced by an external model.

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Direction of a prediction (and of the trade it opens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

/// A directional recommendation with a confidence score in [0, 100].
///
/// `price` is the reference price the signal was issued at; entries fill there,
/// not at the candle close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionSignal {
    pub timestamp: Timestamp,
    pub direction: Direction,
    pub confidence: f64,
    pub price: f64,
}

impl PredictionSignal {
    pub fn new(timestamp: Timestamp, direction: Direction, confidence: f64, price: f64) -> Self {
        Self {
            timestamp,
            direction,
            confidence,
            price,
        }
    }

    pub fn long(timestamp: Timestamp, confidence: f64, price: f64) -> Self {
        Self::new(timestamp, Direction::Long, confidence, price)
    }

    pub fn short(timestamp: Timestamp, confidence: f64, price: f64) -> Self {
        Self::new(timestamp, Direction::Short, confidence, price)
    }

    pub fn passes_threshold(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence
    }
}
