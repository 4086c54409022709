//! Trade: one opened-then-closed unit of simulated exposure.

use serde::{Deserialize, Serialize};

use super::ids::TradeId;
use super::signal::Direction;
use super::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// Which trigger closed a trade. Exactly one per closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalExpiry,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit => "TAKE_PROFIT",
            ExitReason::SignalExpiry => "SIGNAL_EXPIRY",
            ExitReason::EndOfData => "END_OF_DATA",
        }
    }
}

/// A simulated trade.
///
/// Mutable only while `Open`. `close` freezes it: exit fields and `pnl` are set
/// together, once. `exit_timestamp.is_some()` iff `status == Closed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub direction: Direction,
    /// Confidence of the signal that opened the trade.
    pub confidence: f64,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_timestamp: Timestamp,
    pub entry_price: f64,
    pub entry_cost: f64,

    // ── Protective levels ──
    pub stop_loss_price: Option<f64>,
    pub take_profit_price: Option<f64>,

    // ── Size ──
    pub position_size: f64,

    pub status: TradeStatus,

    // ── Exit ──
    pub exit_index: Option<usize>,
    pub exit_timestamp: Option<Timestamp>,
    pub exit_price: Option<f64>,
    pub exit_cost: Option<f64>,
    pub exit_reason: Option<ExitReason>,

    /// Net of entry and exit costs.
    pub pnl: Option<f64>,
}

impl Trade {
    /// Gross P&L if the trade were closed at `price`, before any costs.
    pub fn gross_pnl_at(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.position_size * self.direction.sign()
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Candles elapsed since entry, measured at `current_index`.
    pub fn candles_held(&self, current_index: usize) -> usize {
        current_index.saturating_sub(self.entry_index)
    }

    /// Close the trade and record its net P&L, which is also returned.
    ///
    /// Closing a trade twice is an engine bug, not a data condition.
    pub fn close(
        &mut self,
        exit_price: f64,
        exit_timestamp: Timestamp,
        exit_index: usize,
        reason: ExitReason,
        exit_cost: f64,
    ) -> f64 {
        assert!(
            self.is_open(),
            "trade {} closed twice (existing exit: {:?}, new exit: {reason:?})",
            self.id,
            self.exit_reason
        );
        let pnl = self.gross_pnl_at(exit_price) - self.entry_cost - exit_cost;
        self.status = TradeStatus::Closed;
        self.exit_index = Some(exit_index);
        self.exit_timestamp = Some(exit_timestamp);
        self.exit_price = Some(exit_price);
        self.exit_cost = Some(exit_cost);
        self.exit_reason = Some(reason);
        self.pnl = Some(pnl);
        pnl
    }

    /// Entry plus exit costs paid so far.
    pub fn total_cost(&self) -> f64 {
        self.entry_cost + self.exit_cost.unwrap_or(0.0)
    }

    /// Net return as a fraction of entry notional. 0 while open.
    pub fn return_pct(&self) -> f64 {
        let notional = self.entry_price * self.position_size;
        match self.pnl {
            Some(pnl) if notional > 0.0 => pnl / notional,
            _ => 0.0,
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl.is_some_and(|p| p > 0.0)
    }

    pub fn is_loser(&self) -> bool {
        self.pnl.is_some_and(|p| p < 0.0)
    }
}
