//! Cost model: transaction cost per leg.
//!
//! Costs are symmetric: entry and exit legs are each charged
//! `price * size * transaction_cost_percent / 100` on their own notional.

/// Percent-of-notional cost model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    pub cost_percent: f64,
}

impl CostModel {
    pub fn new(cost_percent: f64) -> Self {
        Self { cost_percent }
    }

    /// Cost of one leg at `price` for `size` units. Never negative.
    pub fn leg_cost(&self, price: f64, size: f64) -> f64 {
        if self.cost_percent == 0.0 {
            return 0.0;
        }
        (price * size).abs() * self.cost_percent / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_percent_is_free() {
        assert_eq!(CostModel::new(0.0).leg_cost(100.0, 50.0), 0.0);
    }

    #[test]
    fn cost_is_percent_of_notional() {
        let model = CostModel::new(0.1);
        // 100 * 10 * 0.1%
        assert!((model.leg_cost(100.0, 10.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exit_leg_uses_exit_price() {
        let model = CostModel::new(0.5);
        let entry = model.leg_cost(100.0, 2.0);
        let exit = model.leg_cost(120.0, 2.0);
        assert!(exit > entry);
        assert!((exit - 1.2).abs() < 1e-12);
    }
}
