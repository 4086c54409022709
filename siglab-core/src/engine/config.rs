//! Backtest configuration and construction-time validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Direction;

/// Candles per year assumed when annualising Sharpe and Sortino: one candle per
/// trading day.
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Default minimum signal confidence for a signal to be actionable.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 70.0;

/// Configuration errors. Raised by `BacktestEngine::new`, never mid-run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid `{field}` = {value}: {reason}")]
    InvalidField {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("sizing mode `{mode}` requires `{field}` to be set")]
    MissingField {
        mode: &'static str,
        field: &'static str,
    },
}

/// How many units a new trade buys or sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// `position_size_percent` of realized capital at entry time.
    #[default]
    PercentOfEquity,
    /// `position_size_percent` of the initial capital, regardless of P&L so far.
    PercentOfInitialCapital,
    /// Risk `risk_per_trade_percent` of realized capital between entry and stop,
    /// capped at the `PercentOfEquity` size.
    RiskBased,
}

impl SizingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SizingMode::PercentOfEquity => "percent_of_equity",
            SizingMode::PercentOfInitialCapital => "percent_of_initial_capital",
            SizingMode::RiskBased => "risk_based",
        }
    }
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Percent in (0, 100].
    pub position_size_percent: f64,
    /// Absent disables stop-loss exits.
    pub stop_loss_percent: Option<f64>,
    /// Absent disables take-profit exits.
    pub take_profit_percent: Option<f64>,
    /// Charged on the notional of each leg.
    pub transaction_cost_percent: f64,
    pub max_concurrent_positions: usize,
    pub risk_per_trade_percent: f64,
    pub min_confidence: f64,
    pub sizing: SizingMode,
    /// Absent disables signal-expiry exits.
    pub max_holding_candles: Option<usize>,
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            position_size_percent: 10.0,
            stop_loss_percent: None,
            take_profit_percent: None,
            transaction_cost_percent: 0.1,
            max_concurrent_positions: 3,
            risk_per_trade_percent: 1.0,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            sizing: SizingMode::PercentOfEquity,
            max_holding_candles: None,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
        }
    }
}

fn invalid(field: &'static str, value: f64, reason: &'static str) -> ConfigError {
    ConfigError::InvalidField {
        field,
        value,
        reason,
    }
}

impl BacktestConfig {
    /// Check every field. The first failing field is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(invalid(
                "initial_capital",
                self.initial_capital,
                "must be finite and > 0",
            ));
        }
        if !self.position_size_percent.is_finite()
            || self.position_size_percent <= 0.0
            || self.position_size_percent > 100.0
        {
            return Err(invalid(
                "position_size_percent",
                self.position_size_percent,
                "must be in (0, 100]",
            ));
        }
        if let Some(sl) = self.stop_loss_percent {
            // A long stop at or below zero could never trigger.
            if !sl.is_finite() || sl <= 0.0 || sl >= 100.0 {
                return Err(invalid("stop_loss_percent", sl, "must be in (0, 100)"));
            }
        }
        if let Some(tp) = self.take_profit_percent {
            // A short target at or below zero could never trigger.
            if !tp.is_finite() || tp <= 0.0 || tp >= 100.0 {
                return Err(invalid("take_profit_percent", tp, "must be in (0, 100)"));
            }
        }
        if !self.transaction_cost_percent.is_finite()
            || self.transaction_cost_percent < 0.0
            || self.transaction_cost_percent >= 100.0
        {
            return Err(invalid(
                "transaction_cost_percent",
                self.transaction_cost_percent,
                "must be in [0, 100)",
            ));
        }
        if self.max_concurrent_positions == 0 {
            return Err(invalid("max_concurrent_positions", 0.0, "must be >= 1"));
        }
        if !self.risk_per_trade_percent.is_finite()
            || self.risk_per_trade_percent < 0.0
            || self.risk_per_trade_percent > 100.0
        {
            return Err(invalid(
                "risk_per_trade_percent",
                self.risk_per_trade_percent,
                "must be in [0, 100]",
            ));
        }
        if !self.min_confidence.is_finite() || !(0.0..=100.0).contains(&self.min_confidence) {
            return Err(invalid(
                "min_confidence",
                self.min_confidence,
                "must be in [0, 100]",
            ));
        }
        if self.max_holding_candles == Some(0) {
            return Err(invalid("max_holding_candles", 0.0, "must be >= 1 when set"));
        }
        if !self.periods_per_year.is_finite() || self.periods_per_year <= 0.0 {
            return Err(invalid(
                "periods_per_year",
                self.periods_per_year,
                "must be finite and > 0",
            ));
        }
        if self.sizing == SizingMode::RiskBased {
            if self.stop_loss_percent.is_none() {
                return Err(ConfigError::MissingField {
                    mode: self.sizing.as_str(),
                    field: "stop_loss_percent",
                });
            }
            if self.risk_per_trade_percent <= 0.0 {
                return Err(invalid(
                    "risk_per_trade_percent",
                    self.risk_per_trade_percent,
                    "must be > 0 for risk_based sizing",
                ));
            }
        }
        Ok(())
    }

    /// Stop level for a new trade: below entry for longs, above for shorts.
    pub fn stop_loss_price(&self, entry_price: f64, direction: Direction) -> Option<f64> {
        self.stop_loss_percent
            .map(|pct| entry_price - direction.sign() * entry_price * pct / 100.0)
    }

    /// Target level for a new trade: above entry for longs, below for shorts.
    pub fn take_profit_price(&self, entry_price: f64, direction: Direction) -> Option<f64> {
        self.take_profit_percent
            .map(|pct| entry_price + direction.sign() * entry_price * pct / 100.0)
    }
}
