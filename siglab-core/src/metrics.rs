//! Performance metrics computed from an equity curve and a trade list.
//!
//! Every metric is a pure function: equity values and/or closed trades in,
//! scalar out. No metric ever returns NaN; each degenerate case resolves to a
//! documented sentinel.

use serde::{Deserialize, Serialize};

use crate::domain::{equity_values, EquityPoint, Trade};

/// Profit factor reported when there are winners but no losers.
pub const PROFIT_FACTOR_CAP: f64 = 100.0;

/// Standard deviations below this are treated as zero variance.
const VARIANCE_EPSILON: f64 = 1e-15;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Fraction in [0, 1].
    pub win_rate: f64,
    /// Mean per-trade net return as a fraction of entry notional.
    pub average_return: f64,
    pub total_pnl: f64,
    pub total_return_percent: f64,
    pub final_equity: f64,
    pub gross_profit: f64,
    /// Positive magnitude.
    pub gross_loss: f64,
    pub average_win: f64,
    /// Negative or zero.
    pub average_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    pub profit_factor: f64,
    pub transaction_costs: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl PerformanceMetrics {
    /// Compute all metrics from the equity curve and the trade list.
    ///
    /// Only closed trades count; after a full run every trade is closed.
    pub fn compute(
        equity_curve: &[EquityPoint],
        trades: &[Trade],
        initial_capital: f64,
        periods_per_year: f64,
    ) -> Self {
        let closed: Vec<&Trade> = trades.iter().filter(|t| !t.is_open()).collect();
        let equity = equity_values(equity_curve);
        let final_equity = equity.last().copied().unwrap_or(initial_capital);
        let returns = step_returns(&equity, initial_capital);
        let (max_dd, max_dd_pct) = max_drawdown(&equity, initial_capital);
        let total_pnl: f64 = closed.iter().filter_map(|t| t.pnl).sum();

        Self {
            total_trades: closed.len(),
            winning_trades: closed.iter().filter(|t| t.is_winner()).count(),
            losing_trades: closed.iter().filter(|t| t.is_loser()).count(),
            win_rate: win_rate(&closed),
            average_return: average_return(&closed),
            total_pnl,
            total_return_percent: (final_equity - initial_capital) / initial_capital * 100.0,
            final_equity,
            gross_profit: gross_profit(&closed),
            gross_loss: gross_loss(&closed),
            average_win: average_win(&closed),
            average_loss: average_loss(&closed),
            largest_win: closed
                .iter()
                .filter_map(|t| t.pnl)
                .filter(|p| *p > 0.0)
                .fold(0.0, f64::max),
            largest_loss: closed
                .iter()
                .filter_map(|t| t.pnl)
                .filter(|p| *p < 0.0)
                .fold(0.0, f64::min),
            sharpe_ratio: sharpe_ratio(&returns, periods_per_year),
            sortino_ratio: sortino_ratio(&returns, periods_per_year),
            max_drawdown: max_dd,
            max_drawdown_percent: max_dd_pct,
            profit_factor: profit_factor(&closed),
            transaction_costs: closed.iter().map(|t| t.total_cost()).sum(),
            max_consecutive_wins: max_consecutive(&closed, true),
            max_consecutive_losses: max_consecutive(&closed, false),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Per-step simple returns. The first step is measured against `initial_capital`.
///
/// A step from non-positive equity contributes a 0.0 return.
pub fn step_returns(equity: &[f64], initial_capital: f64) -> Vec<f64> {
    let mut prev = initial_capital;
    equity
        .iter()
        .map(|&eq| {
            let r = if prev > 0.0 { (eq - prev) / prev } else { 0.0 };
            prev = eq;
            r
        })
        .collect()
}

/// Annualized Sharpe ratio (zero risk-free rate).
///
/// Sharpe = mean(returns) / sample_std(returns) * sqrt(periods_per_year).
/// Returns 0.0 with fewer than 2 returns, zero variance, or an overflowed
/// (non-finite) result.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(returns);
    if std < VARIANCE_EPSILON {
        return 0.0;
    }
    finite_or_zero(mean_f64(returns) / std * periods_per_year.sqrt())
}

/// Annualized Sortino ratio (downside deviation only).
///
/// Returns 0.0 when there is no downside or fewer than 2 returns.
pub fn sortino_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let downside_sq: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    let downside_std = (downside_sq / returns.len() as f64).sqrt();
    if downside_std < VARIANCE_EPSILON {
        return 0.0;
    }
    finite_or_zero(mean_f64(returns) / downside_std * periods_per_year.sqrt())
}

/// Maximum drawdown as `(absolute, percent)`, both >= 0.
///
/// The running peak starts at `initial_capital`, so a curve that only ever
/// sits below the starting capital still reports its drawdown. Each component
/// is maximized independently.
pub fn max_drawdown(equity: &[f64], initial_capital: f64) -> (f64, f64) {
    let mut peak = initial_capital;
    let mut max_dd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;

    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        let dd = peak - eq;
        if dd > max_dd {
            max_dd = dd;
        }
        if peak > 0.0 {
            max_dd_pct = max_dd_pct.max(dd / peak * 100.0);
        }
    }
    (max_dd, max_dd_pct)
}

/// Fraction of closed trades with positive P&L. 0.0 with no trades.
pub fn win_rate(trades: &[&Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn average_return(trades: &[&Trade]) -> f64 {
    let returns: Vec<f64> = trades.iter().map(|t| t.return_pct()).collect();
    mean_f64(&returns)
}

pub fn gross_profit(trades: &[&Trade]) -> f64 {
    trades
        .iter()
        .filter_map(|t| t.pnl)
        .filter(|p| *p > 0.0)
        .sum()
}

pub fn gross_loss(trades: &[&Trade]) -> f64 {
    trades
        .iter()
        .filter_map(|t| t.pnl)
        .filter(|p| *p < 0.0)
        .map(f64::abs)
        .sum()
}

fn average_win(trades: &[&Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().filter_map(|t| t.pnl).filter(|p| *p > 0.0).collect();
    mean_f64(&wins)
}

fn average_loss(trades: &[&Trade]) -> f64 {
    let losses: Vec<f64> = trades.iter().filter_map(|t| t.pnl).filter(|p| *p < 0.0).collect();
    mean_f64(&losses)
}

/// Profit factor: gross profit / gross loss.
///
/// [`PROFIT_FACTOR_CAP`] when there are winners but no losers, 0.0 when there
/// are no winners. Finite values are also capped.
pub fn profit_factor(trades: &[&Trade]) -> f64 {
    let profit = gross_profit(trades);
    let loss = gross_loss(trades);
    if loss < 1e-10 {
        return if profit > 0.0 { PROFIT_FACTOR_CAP } else { 0.0 };
    }
    (profit / loss).min(PROFIT_FACTOR_CAP)
}

// ─── Helpers ────────────────────────────────────────────────────────

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[&Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        let matches = if winners {
            trade.is_winner()
        } else {
            trade.is_loser()
        };
        if matches {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, ExitReason, TradeId, TradeStatus};

    fn closed_trade(id: u64, pnl: f64) -> Trade {
        Trade {
            id: TradeId(id),
            direction: Direction::Long,
            confidence: 80.0,
            entry_index: 0,
            entry_timestamp: 0,
            entry_price: 100.0,
            entry_cost: 0.5,
            stop_loss_price: None,
            take_profit_price: None,
            position_size: 10.0,
            status: TradeStatus::Closed,
            exit_index: Some(5),
            exit_timestamp: Some(300_000),
            exit_price: Some(100.0 + pnl / 10.0),
            exit_cost: Some(0.5),
            exit_reason: Some(ExitReason::EndOfData),
            pnl: Some(pnl),
        }
    }

    fn curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                timestamp: i as i64 * 60_000,
                equity,
            })
            .collect()
    }

    #[test]
    fn step_returns_start_from_initial_capital() {
        let r = step_returns(&[110.0, 99.0], 100.0);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] - (-0.10)).abs() < 1e-12);
    }

    #[test]
    fn sharpe_zero_for_constant_equity() {
        let returns = step_returns(&[100.0; 50], 100.0);
        assert_eq!(sharpe_ratio(&returns, 252.0), 0.0);
    }

    #[test]
    fn sharpe_positive_for_noisy_growth() {
        let eq = [101.0, 101.5, 103.0, 103.2, 105.0, 104.8, 107.0];
        let returns = step_returns(&eq, 100.0);
        let s = sharpe_ratio(&returns, 252.0);
        assert!(s > 0.0 && s.is_finite());
    }

    #[test]
    fn sharpe_scales_with_sqrt_periods() {
        let returns = step_returns(&[101.0, 100.5, 102.0, 101.0], 100.0);
        let daily = sharpe_ratio(&returns, 1.0);
        let annual = sharpe_ratio(&returns, 252.0);
        assert!((annual - daily * 252.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn sortino_zero_without_downside() {
        let returns = step_returns(&[101.0, 102.0, 103.0], 100.0);
        assert_eq!(sortino_ratio(&returns, 252.0), 0.0);
    }

    #[test]
    fn max_drawdown_zero_for_rising_curve() {
        assert_eq!(max_drawdown(&[100.0, 101.0, 105.0], 100.0), (0.0, 0.0));
    }

    #[test]
    fn max_drawdown_known_value() {
        // Peak 120, trough 90: 30 absolute, 25%
        let (abs, pct) = max_drawdown(&[110.0, 120.0, 90.0, 115.0], 100.0);
        assert!((abs - 30.0).abs() < 1e-12);
        assert!((pct - 25.0).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_counts_dip_below_initial() {
        let (abs, _) = max_drawdown(&[95.0, 97.0], 100.0);
        assert!((abs - 5.0).abs() < 1e-12);
    }

    #[test]
    fn win_rate_counts_only_positive_pnl() {
        let trades = [closed_trade(1, 50.0), closed_trade(2, -20.0), closed_trade(3, 0.0)];
        let refs: Vec<&Trade> = trades.iter().collect();
        assert!((win_rate(&refs) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn profit_factor_sentinels() {
        let winners = [closed_trade(1, 50.0)];
        let refs: Vec<&Trade> = winners.iter().collect();
        assert_eq!(profit_factor(&refs), PROFIT_FACTOR_CAP);

        let losers = [closed_trade(1, -50.0)];
        let refs: Vec<&Trade> = losers.iter().collect();
        assert_eq!(profit_factor(&refs), 0.0);

        assert_eq!(profit_factor(&[]), 0.0);
    }

    #[test]
    fn profit_factor_ratio() {
        let trades = [closed_trade(1, 60.0), closed_trade(2, -20.0), closed_trade(3, -10.0)];
        let refs: Vec<&Trade> = trades.iter().collect();
        assert!((profit_factor(&refs) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn compute_aggregates_trades() {
        let trades = vec![
            closed_trade(1, 60.0),
            closed_trade(2, -20.0),
            closed_trade(3, -10.0),
            closed_trade(4, 30.0),
        ];
        let eq = curve(&[10_060.0, 10_040.0, 10_030.0, 10_060.0]);
        let m = PerformanceMetrics::compute(&eq, &trades, 10_000.0, 252.0);
        assert_eq!(m.total_trades, 4);
        assert_eq!(m.winning_trades, 2);
        assert_eq!(m.losing_trades, 2);
        assert!((m.win_rate - 0.5).abs() < 1e-12);
        assert!((m.total_pnl - 60.0).abs() < 1e-9);
        assert!((m.final_equity - 10_060.0).abs() < 1e-9);
        assert!((m.transaction_costs - 4.0).abs() < 1e-12);
        assert!((m.largest_loss - (-20.0)).abs() < 1e-12);
        assert!((m.average_win - 45.0).abs() < 1e-12);
        assert_eq!(m.max_consecutive_losses, 2);
        assert_eq!(m.max_consecutive_wins, 1);
    }

    #[test]
    fn empty_run_metrics_are_zeroed() {
        let m = PerformanceMetrics::compute(&[], &[], 10_000.0, 252.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.final_equity, 10_000.0);
        assert_eq!(m.total_return_percent, 0.0);
    }

    #[test]
    fn overflowed_returns_do_not_leak_nan() {
        let returns = [f64::INFINITY, -1.0, 0.5];
        assert_eq!(sharpe_ratio(&returns, 252.0), 0.0);
        assert_eq!(sortino_ratio(&returns, 252.0), 0.0);
    }
}
