use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade ID, sequential within one run starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeId(pub u64);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Deterministic trade ID generator. One per run; never shared across runs.
#[derive(Debug, Default)]
pub struct TradeIdGen {
    last: u64,
}

impl TradeIdGen {
    pub fn next_id(&mut self) -> TradeId {
        self.last += 1;
        TradeId(self.last)
    }
}
