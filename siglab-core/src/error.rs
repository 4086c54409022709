use thiserror::Error;

use crate::data::DataError;
use crate::engine::ConfigError;

/// Any failure of a backtest run. Both variants are raised before the first candle
/// is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BacktestError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}
