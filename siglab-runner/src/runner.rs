//! Config-driven orchestration: load inputs, run, optionally sweep.

use std::path::Path;

use anyhow::{Context, Result};
use siglab_core::{BacktestEngine, BacktestResult, Candle, PredictionSignal};
use tracing::info;

use crate::config::{load_config, RunConfig};
use crate::data_loader::{load_candles, load_signals};
use crate::sweep::{ParamSweep, SweepReport};

/// Inputs named by a `RunConfig`'s `[data]` table.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub candles: Vec<Candle>,
    pub signals: Vec<PredictionSignal>,
}

/// Result of a config-driven run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub config: RunConfig,
    /// The `[backtest]` config run as-is.
    pub result: BacktestResult,
    /// Present when the config carries a `[sweep]` table.
    pub sweep: Option<SweepReport>,
}

pub fn load_data(config: &RunConfig) -> Result<LoadedData> {
    let candles = load_candles(&config.data.candles)
        .with_context(|| format!("loading candles from {}", config.data.candles.display()))?;
    let signals = load_signals(&config.data.signals)
        .with_context(|| format!("loading signals from {}", config.data.signals.display()))?;
    Ok(LoadedData { candles, signals })
}

/// Run an already-loaded config against already-loaded data.
pub fn run_with_data(config: RunConfig, data: &LoadedData) -> Result<RunOutput> {
    let engine = BacktestEngine::new(config.backtest.clone()).context("invalid [backtest] config")?;
    let result = engine
        .run_backtest(&data.candles, &data.signals)
        .context("backtest rejected its inputs")?;

    let sweep = match &config.sweep {
        Some(grid) => Some(
            ParamSweep::new()
                .run(grid, &config.backtest, &data.candles, &data.signals)
                .context("parameter sweep rejected its inputs")?,
        ),
        None => None,
    };

    Ok(RunOutput { config, result, sweep })
}

/// Load a TOML config and everything it points at, then run it.
pub fn run_from_config(path: &Path) -> Result<RunOutput> {
    let config = load_config(path).with_context(|| format!("loading config {}", path.display()))?;
    let data = load_data(&config)?;
    info!(
        config = %path.display(),
        candles = data.candles.len(),
        signals = data.signals.len(),
        sweep = config.sweep.is_some(),
        "Loaded run"
    );
    run_with_data(config, &data)
}
