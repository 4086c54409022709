//! Candle-by-candle event loop of the backtesting engine.
//!
//! Four phases per candle:
//! 1. Exits: stop-loss, take-profit, signal expiry for trades opened earlier
//! 2. Entries: aligned signals above the confidence threshold, while slots remain
//! 3. End of data: on the final candle, force-close whatever is still open
//! 4. Equity: realized capital plus open trades marked to the close

use tracing::{debug, info};

use crate::data::{validate_inputs, DataError};
use crate::domain::{Candle, ExitReason, PredictionSignal};
use crate::error::BacktestError;
use crate::metrics::PerformanceMetrics;
use crate::result::BacktestResult;

use super::config::{BacktestConfig, ConfigError};
use super::exits::evaluate_exit;
use super::signal_book::SignalBook;
use super::sizing::position_size;
use super::state::RunState;

/// A validated configuration, ready to run any number of independent backtests.
///
/// The engine holds no run state: every call to `run_backtest` builds its own,
/// so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Validate the inputs, then simulate.
    ///
    /// Deterministic: identical inputs give identical results.
    pub fn run_backtest(
        &self,
        candles: &[Candle],
        signals: &[PredictionSignal],
    ) -> Result<BacktestResult, DataError> {
        validate_inputs(candles, signals)?;
        Ok(simulate(&self.config, candles, signals))
    }
}

/// Build an engine from `config` and run it once.
pub fn run_backtest(
    config: &BacktestConfig,
    candles: &[Candle],
    signals: &[PredictionSignal],
) -> Result<BacktestResult, BacktestError> {
    let engine = BacktestEngine::new(config.clone())?;
    Ok(engine.run_backtest(candles, signals)?)
}

fn simulate(
    config: &BacktestConfig,
    candles: &[Candle],
    signals: &[PredictionSignal],
) -> BacktestResult {
    let book = SignalBook::new(signals, candles);
    let mut state = RunState::new(config, candles.len());
    state.signals.received = signals.len();
    state.signals.unmatched = book.unmatched();

    info!(
        candles = candles.len(),
        signals = signals.len(),
        capital = config.initial_capital,
        max_positions = config.max_concurrent_positions,
        sizing = config.sizing.as_str(),
        "Starting backtest"
    );

    let last_index = candles.len().checked_sub(1);

    for (t, candle) in candles.iter().enumerate() {
        // ─── Phase 1: Exits ───
        process_exits(&mut state, config, candle, t);

        // ─── Phase 2: Entries ───
        for &signal in book.at(candle.timestamp) {
            process_entry(&mut state, config, signal, t);
        }

        // ─── Phase 3: End of data ───
        if Some(t) == last_index {
            for i in state.open_indices() {
                let pnl = state.close_trade(i, candle.close, candle.timestamp, t, ExitReason::EndOfData);
                debug!(trade = %state.trades[i].id, price = candle.close, pnl, "Closed at end of data");
            }
        }

        // ─── Phase 4: Equity ───
        let equity = state.mark_to_market(candle.close);
        state.record_equity(candle.timestamp, equity);

        assert!(
            state.open_count() <= config.max_concurrent_positions,
            "concurrency cap violated at candle {t}"
        );
    }

    debug_assert!(state.trades.iter().all(|t| !t.is_open()));

    let metrics = PerformanceMetrics::compute(
        &state.equity_curve,
        &state.trades,
        config.initial_capital,
        config.periods_per_year,
    );
    let final_equity = state
        .equity_curve
        .last()
        .map_or(config.initial_capital, |p| p.equity);

    info!(
        trades = metrics.total_trades,
        winning = metrics.winning_trades,
        win_rate = metrics.win_rate,
        total_pnl = metrics.total_pnl,
        sharpe = metrics.sharpe_ratio,
        max_drawdown = metrics.max_drawdown,
        rejected = state.signals.rejected(),
        "Backtest complete"
    );

    BacktestResult {
        trades: state.trades,
        equity_curve: state.equity_curve,
        metrics,
        signals: state.signals,
        initial_capital: config.initial_capital,
        final_equity,
        candle_count: candles.len(),
        peak_open_positions: state.peak_open,
    }
}

fn process_exits(state: &mut RunState, config: &BacktestConfig, candle: &Candle, t: usize) {
    for i in state.open_indices() {
        let Some(exit) = evaluate_exit(&state.trades[i], candle, t, config.max_holding_candles) else {
            continue;
        };
        let pnl = state.close_trade(i, exit.price, candle.timestamp, t, exit.reason);
        debug!(
            trade = %state.trades[i].id,
            reason = exit.reason.as_str(),
            price = exit.price,
            pnl,
            "Closed position"
        );
    }
}

fn process_entry(state: &mut RunState, config: &BacktestConfig, signal: &PredictionSignal, t: usize) {
    if !signal.passes_threshold(config.min_confidence) {
        state.signals.below_confidence += 1;
        debug!(
            timestamp = signal.timestamp,
            confidence = signal.confidence,
            "Signal below confidence threshold"
        );
        return;
    }
    if !state.has_free_slot() {
        state.signals.rejected_capacity += 1;
        debug!(
            timestamp = signal.timestamp,
            open = state.open_count(),
            "Signal rejected: all position slots taken"
        );
        return;
    }

    let size = position_size(config, state.capital, signal.price);
    if !(size.is_finite() && size > 0.0) {
        state.signals.rejected_no_capital += 1;
        debug!(
            timestamp = signal.timestamp,
            capital = state.capital,
            "Signal rejected: no capital to size from"
        );
        return;
    }

    let id = state.open_trade(signal, config, size, t);
    state.signals.accepted += 1;
    debug!(
        trade = %id,
        direction = signal.direction.as_str(),
        price = signal.price,
        size,
        time = signal.timestamp,
        "Opened position"
    );
}
