//! Signals indexed by candle timestamp.
//!
//! Within one timestamp, signals are ordered by descending confidence; ties
//! keep their input order. When slots are scarce the strongest signal wins.

use std::collections::{HashMap, HashSet};

use crate::domain::{Candle, PredictionSignal, Timestamp};

pub struct SignalBook<'a> {
    by_timestamp: HashMap<Timestamp, Vec<&'a PredictionSignal>>,
    unmatched: usize,
}

impl<'a> SignalBook<'a> {
    pub fn new(signals: &'a [PredictionSignal], candles: &[Candle]) -> Self {
        let candle_times: HashSet<Timestamp> = candles.iter().map(|c| c.timestamp).collect();
        let mut by_timestamp: HashMap<Timestamp, Vec<&'a PredictionSignal>> = HashMap::new();
        let mut unmatched = 0;

        for signal in signals {
            if candle_times.contains(&signal.timestamp) {
                by_timestamp.entry(signal.timestamp).or_default().push(signal);
            } else {
                unmatched += 1;
            }
        }

        for bucket in by_timestamp.values_mut() {
            // Stable sort: equal confidences stay in input order.
            bucket.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        }

        Self {
            by_timestamp,
            unmatched,
        }
    }

    /// Signals aligned to `timestamp`, strongest first.
    pub fn at(&self, timestamp: Timestamp) -> &[&'a PredictionSignal] {
        self.by_timestamp
            .get(&timestamp)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Signals whose timestamp matches no candle.
    pub fn unmatched(&self) -> usize {
        self.unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles() -> Vec<Candle> {
        (0..3)
            .map(|i| Candle::new(i * 60_000, 100.0, 101.0, 99.0, 100.0, 1.0))
            .collect()
    }

    #[test]
    fn groups_by_timestamp_strongest_first() {
        let signals = vec![
            PredictionSignal::long(60_000, 75.0, 100.0),
            PredictionSignal::short(60_000, 90.0, 100.0),
            PredictionSignal::long(60_000, 75.0, 101.0),
        ];
        let candles = candles();
        let book = SignalBook::new(&signals, &candles);
        let at = book.at(60_000);
        assert_eq!(at.len(), 3);
        assert_eq!(at[0].confidence, 90.0);
        // tie keeps input order
        assert_eq!(at[1].price, 100.0);
        assert_eq!(at[2].price, 101.0);
    }

    #[test]
    fn counts_unaligned_signals() {
        let signals = vec![
            PredictionSignal::long(30_000, 80.0, 100.0),
            PredictionSignal::long(120_000, 80.0, 100.0),
            PredictionSignal::long(999_999, 80.0, 100.0),
        ];
        let candles = candles();
        let book = SignalBook::new(&signals, &candles);
        assert_eq!(book.unmatched(), 2);
        assert_eq!(book.at(120_000).len(), 1);
        assert!(book.at(30_000).is_empty());
    }
}
