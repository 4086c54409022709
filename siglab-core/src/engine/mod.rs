//! Engine: configuration, the candle loop, and the rules it applies.
//!
//! - `config`: run parameters and their validation
//! - `loop_runner`: the four-phase loop and the public entry points
//! - `exits` / `sizing` / `costs`: the per-trade rules
//! - `signal_book` / `state`: per-run bookkeeping

pub mod config;
pub mod costs;
pub mod exits;
pub mod loop_runner;
pub mod signal_book;
pub mod sizing;
pub mod state;

pub use config::{BacktestConfig, ConfigError, SizingMode, DEFAULT_MIN_CONFIDENCE, DEFAULT_PERIODS_PER_YEAR};
pub use costs::CostModel;
pub use exits::{evaluate_exit, ExitTrigger};
pub use loop_runner::{run_backtest, BacktestEngine};
pub use signal_book::SignalBook;
pub use sizing::position_size;
