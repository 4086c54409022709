//! TOML run configuration.
//!
//! ```toml
//! [backtest]
//! initial_capital = 25000.0
//! stop_loss_percent = 2.0
//! max_concurrent_positions = 3
//!
//! [data]
//! candles = "candles.csv"
//! signals = "signals.csv"
//!
//! [sweep]
//! stop_loss_percent = [1.0, 2.0, 3.0]
//! take_profit_percent = [2.0, 4.0]
//! ```
//!
//! Omitted `[backtest]` fields take their defaults. Relative data paths are
//! resolved against the directory holding the config file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use siglab_core::BacktestConfig;

use crate::data_loader::LoadError;
use crate::sweep::ParamGrid;

/// Everything needed to reproduce a run: engine parameters, inputs, and an
/// optional parameter grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub backtest: BacktestConfig,
    pub data: DataConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<ParamGrid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub candles: PathBuf,
    pub signals: PathBuf,
}

impl RunConfig {
    /// Parse a config from TOML text. `origin` labels errors.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self, LoadError> {
        let config: RunConfig = toml::from_str(content).map_err(|source| LoadError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        config.backtest.validate()?;
        Ok(config)
    }

    /// Rebase relative data paths onto `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.data.candles.is_relative() {
            self.data.candles = base.join(&self.data.candles);
        }
        if self.data.signals.is_relative() {
            self.data.signals = base.join(&self.data.signals);
        }
        self
    }
}

/// Read, parse, and validate a run config file.
pub fn load_config(path: &Path) -> Result<RunConfig, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = RunConfig::from_toml(&content, path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_paths(base))
}
