//! Exit triggers for open trades.
//!
//! Priority within one candle: stop-loss, take-profit, signal expiry. When
//! both protective levels lie inside the candle's range the intrabar path is
//! unknown; the stop fills first (worst-case path policy).

use crate::domain::{Candle, Direction, ExitReason, Trade};

/// A decided exit: reason plus fill price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitTrigger {
    pub reason: ExitReason,
    pub price: f64,
}

pub fn stop_loss_hit(trade: &Trade, candle: &Candle) -> Option<f64> {
    let stop = trade.stop_loss_price?;
    let hit = match trade.direction {
        Direction::Long => candle.low <= stop,
        Direction::Short => candle.high >= stop,
    };
    hit.then_some(stop)
}

pub fn take_profit_hit(trade: &Trade, candle: &Candle) -> Option<f64> {
    let target = trade.take_profit_price?;
    let hit = match trade.direction {
        Direction::Long => candle.high >= target,
        Direction::Short => candle.low <= target,
    };
    hit.then_some(target)
}

/// First matching exit for `trade` on the candle at `index`, if any.
///
/// Protective exits fill at their level, not the close. Expiry fills at the close.
pub fn evaluate_exit(
    trade: &Trade,
    candle: &Candle,
    index: usize,
    max_holding_candles: Option<usize>,
) -> Option<ExitTrigger> {
    if let Some(price) = stop_loss_hit(trade, candle) {
        return Some(ExitTrigger {
            reason: ExitReason::StopLoss,
            price,
        });
    }
    if let Some(price) = take_profit_hit(trade, candle) {
        return Some(ExitTrigger {
            reason: ExitReason::TakeProfit,
            price,
        });
    }
    match max_holding_candles {
        Some(max) if trade.candles_held(index) >= max => Some(ExitTrigger {
            reason: ExitReason::SignalExpiry,
            price: candle.close,
        }),
        _ => None,
    }
}
