//! SignalLab Core: a deterministic, signal-driven backtesting engine.
//!
//! Feeds directional prediction signals through a candle-by-candle simulation
//! and reports the executed trades, an equity curve, and performance metrics.
//!
//! - Domain types (candles, signals, trades, equity points)
//! - Input validation that rejects malformed data up front
//! - Four-phase candle loop with worst-case intrabar exit ordering
//! - Position sizing and per-leg transaction costs
//! - Pure metric functions with no NaN outputs
//!
//! ```
//! use siglab_core::{run_backtest, BacktestConfig, Candle, PredictionSignal};
//!
//! let candles: Vec<Candle> = (0..10)
//!     .map(|i| Candle::new(i * 60_000, 100.0, 101.0, 99.0, 100.0, 1_000.0))
//!     .collect();
//! let signals = vec![PredictionSignal::long(120_000, 85.0, 100.0)];
//!
//! let result = run_backtest(&BacktestConfig::default(), &candles, &signals).unwrap();
//! assert_eq!(result.trades.len(), 1);
//! assert_eq!(result.equity_curve.len(), candles.len());
//! ```

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod result;

pub use data::DataError;
pub use domain::{Candle, Direction, EquityPoint, ExitReason, PredictionSignal, Trade, TradeId, TradeStatus};
pub use engine::{run_backtest, BacktestConfig, BacktestEngine, ConfigError, SizingMode};
pub use error::BacktestError;
pub use metrics::PerformanceMetrics;
pub use result::{BacktestResult, SignalSummary};
