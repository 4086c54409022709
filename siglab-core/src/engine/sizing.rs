//! Position sizing: converts capital and an entry price into a unit count.
//!
//! Sizing is portfolio-aware (uses realized capital) but signal-agnostic:
//! confidence never scales the size.

use super::config::{BacktestConfig, SizingMode};

/// Units to trade for a new position entered at `entry_price`.
///
/// `realized_capital` is initial capital plus closed-trade P&L minus entry costs
/// already paid on open trades. Returns 0.0 when there is no capital to size
/// from; callers reject the signal in that case.
///
/// # Formula
/// ```text
/// percent_of_equity          = realized_capital * position_pct / 100 / entry
/// percent_of_initial_capital = initial_capital  * position_pct / 100 / entry
/// risk_based                 = min(realized_capital * risk_pct / 100 / (entry * stop_pct / 100),
///                                  percent_of_equity)
/// ```
pub fn position_size(config: &BacktestConfig, realized_capital: f64, entry_price: f64) -> f64 {
    if realized_capital <= 0.0 || entry_price <= 0.0 {
        return 0.0;
    }

    let equity_size = realized_capital * config.position_size_percent / 100.0 / entry_price;

    match config.sizing {
        SizingMode::PercentOfEquity => equity_size,
        SizingMode::PercentOfInitialCapital => {
            config.initial_capital * config.position_size_percent / 100.0 / entry_price
        }
        SizingMode::RiskBased => {
            let Some(stop_pct) = config.stop_loss_percent else {
                // Validation guarantees a stop for risk-based sizing.
                return equity_size;
            };
            let risk_dollars = realized_capital * config.risk_per_trade_percent / 100.0;
            let stop_distance = entry_price * stop_pct / 100.0;
            (risk_dollars / stop_distance).min(equity_size)
        }
    }
}
