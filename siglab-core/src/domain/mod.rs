//! Domain types for SignalLab

pub mod candle;
pub mod equity;
pub mod ids;
pub mod signal;
pub mod trade;

pub use candle::Candle;
pub use equity::{equity_values, EquityPoint};
pub use ids::{TradeId, TradeIdGen};
pub use signal::{Direction, PredictionSignal};
pub use trade::{ExitReason, Trade, TradeStatus};

/// Millisecond epoch timestamp.
pub type Timestamp = i64;
