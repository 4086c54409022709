//! Mutable per-run state. Built fresh for every run, dropped when it ends.

use crate::domain::{EquityPoint, ExitReason, PredictionSignal, Trade, TradeId, TradeIdGen, TradeStatus};
use crate::result::SignalSummary;

use super::config::BacktestConfig;
use super::costs::CostModel;

pub struct RunState {
    /// Realized capital: initial capital plus closed-trade P&L minus entry
    /// costs already paid on open trades.
    pub capital: f64,
    pub trades: Vec<Trade>,
    /// Indices into `trades` of the currently open trades, in opening order.
    open: Vec<usize>,
    ids: TradeIdGen,
    costs: CostModel,
    max_open: usize,
    pub equity_curve: Vec<EquityPoint>,
    pub signals: SignalSummary,
    pub peak_open: usize,
}

impl RunState {
    pub fn new(config: &BacktestConfig, candle_count: usize) -> Self {
        Self {
            capital: config.initial_capital,
            trades: Vec::new(),
            open: Vec::with_capacity(config.max_concurrent_positions),
            ids: TradeIdGen::default(),
            costs: CostModel::new(config.transaction_cost_percent),
            max_open: config.max_concurrent_positions,
            equity_curve: Vec::with_capacity(candle_count),
            signals: SignalSummary::default(),
            peak_open: 0,
        }
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn has_free_slot(&self) -> bool {
        self.open.len() < self.max_open
    }

    /// Snapshot of open trade indices, so trades can be closed while iterating.
    pub fn open_indices(&self) -> Vec<usize> {
        self.open.clone()
    }

    /// Open a trade at the signal's price. The entry cost leaves capital now.
    ///
    /// Exceeding the concurrency cap is an engine bug; callers check
    /// `has_free_slot` first.
    pub fn open_trade(
        &mut self,
        signal: &PredictionSignal,
        config: &BacktestConfig,
        position_size: f64,
        candle_index: usize,
    ) -> TradeId {
        assert!(
            self.has_free_slot(),
            "concurrency cap violated: {} open, max {}",
            self.open.len(),
            self.max_open
        );

        let entry_price = signal.price;
        let entry_cost = self.costs.leg_cost(entry_price, position_size);
        let id = self.ids.next_id();

        self.trades.push(Trade {
            id,
            direction: signal.direction,
            confidence: signal.confidence,
            entry_index: candle_index,
            entry_timestamp: signal.timestamp,
            entry_price,
            entry_cost,
            stop_loss_price: config.stop_loss_price(entry_price, signal.direction),
            take_profit_price: config.take_profit_price(entry_price, signal.direction),
            position_size,
            status: TradeStatus::Open,
            exit_index: None,
            exit_timestamp: None,
            exit_price: None,
            exit_cost: None,
            exit_reason: None,
            pnl: None,
        });
        self.open.push(self.trades.len() - 1);
        self.capital -= entry_cost;
        self.peak_open = self.peak_open.max(self.open.len());
        id
    }

    /// Close the trade at `trade_index` and settle capital. Returns net P&L.
    pub fn close_trade(
        &mut self,
        trade_index: usize,
        exit_price: f64,
        exit_timestamp: i64,
        exit_index: usize,
        reason: ExitReason,
    ) -> f64 {
        let trade = &mut self.trades[trade_index];
        let exit_cost = self.costs.leg_cost(exit_price, trade.position_size);
        let gross = trade.gross_pnl_at(exit_price);
        let pnl = trade.close(exit_price, exit_timestamp, exit_index, reason, exit_cost);

        self.capital += gross - exit_cost;
        self.open.retain(|&i| i != trade_index);
        pnl
    }

    /// Realized capital plus open trades marked to `close`.
    pub fn mark_to_market(&self, close: f64) -> f64 {
        let unrealized: f64 = self
            .open
            .iter()
            .map(|&i| self.trades[i].gross_pnl_at(close))
            .sum();
        self.capital + unrealized
    }

    pub fn record_equity(&mut self, timestamp: i64, equity: f64) {
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }
}
