//! Input validation. Runs once, before the bar loop.
//!
//! Policy: reject. A single malformed candle or signal fails the whole run with
//! the index of the offending record; nothing is skipped silently.

pub mod validate;

pub use validate::{validate_alignment, validate_candles, validate_inputs, validate_signals, DataError};
