//! SignalLab Runner: everything around the engine.
//!
//! This crate builds on `siglab-core` to provide:
//! - TOML run configuration with an optional parameter grid
//! - CSV loading for candles and prediction signals
//! - Parallel parameter sweeps ranked by Sharpe ratio
//! - JSON and CSV artifact export
//! - Tracing subscriber setup

pub mod config;
pub mod data_loader;
pub mod export;
pub mod logging;
pub mod runner;
pub mod sweep;

pub use config::{load_config, DataConfig, RunConfig};
pub use data_loader::{load_candles, load_signals, read_candles, read_signals, LoadError};
pub use export::{
    export_equity_csv, export_json, export_sweep_csv, export_trades_csv, import_json,
    load_artifacts, save_artifacts, ResultManifest, EQUITY_FILE, MANIFEST_FILE, SCHEMA_VERSION,
    TRADES_FILE,
};
pub use logging::init_logging;
pub use runner::{load_data, run_from_config, run_with_data, LoadedData, RunOutput};
pub use sweep::{ParamGrid, ParamSweep, SweepFailure, SweepOutcome, SweepReport};
