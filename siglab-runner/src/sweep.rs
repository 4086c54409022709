//! Parameter sweeps over a grid of engine configurations.
//!
//! Every grid point runs on its own engine. Points whose configuration fails
//! validation are reported individually and never abort the sweep.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use siglab_core::data::{validate_inputs, DataError};
use siglab_core::{BacktestConfig, BacktestEngine, BacktestError, BacktestResult, Candle, PredictionSignal};
use tracing::{info, warn};

/// Values to sweep per parameter. An empty list keeps the base config's value.
///
/// For `stop_loss_percent` and `take_profit_percent`, a value of `0.0`
/// disables the rule at that grid point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub stop_loss_percent: Vec<f64>,
    pub take_profit_percent: Vec<f64>,
    pub position_size_percent: Vec<f64>,
    pub max_concurrent_positions: Vec<usize>,
}

impl ParamGrid {
    /// Number of configurations in this grid. An empty grid still yields the
    /// base config once.
    pub fn size(&self) -> usize {
        self.stop_loss_percent.len().max(1)
            * self.take_profit_percent.len().max(1)
            * self.position_size_percent.len().max(1)
            * self.max_concurrent_positions.len().max(1)
    }

    /// All configurations in the grid, in a fixed nesting order:
    /// stop loss, take profit, position size, concurrency.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let stops = optional_axis(&self.stop_loss_percent, base.stop_loss_percent);
        let targets = optional_axis(&self.take_profit_percent, base.take_profit_percent);
        let sizes = axis(&self.position_size_percent, base.position_size_percent);
        let slots = axis(&self.max_concurrent_positions, base.max_concurrent_positions);

        let mut configs = Vec::with_capacity(self.size());
        for &stop_loss_percent in &stops {
            for &take_profit_percent in &targets {
                for &position_size_percent in &sizes {
                    for &max_concurrent_positions in &slots {
                        configs.push(BacktestConfig {
                            stop_loss_percent,
                            take_profit_percent,
                            position_size_percent,
                            max_concurrent_positions,
                            ..base.clone()
                        });
                    }
                }
            }
        }
        configs
    }
}

fn axis<T: Copy>(values: &[T], base: T) -> Vec<T> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

fn optional_axis(values: &[f64], base: Option<f64>) -> Vec<Option<f64>> {
    if values.is_empty() {
        vec![base]
    } else {
        values.iter().map(|&v| (v != 0.0).then_some(v)).collect()
    }
}

/// One completed grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    /// Position in `ParamGrid::generate_configs` order.
    pub index: usize,
    pub config: BacktestConfig,
    pub result: BacktestResult,
}

/// A grid point that could not run.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFailure {
    pub index: usize,
    pub config: BacktestConfig,
    pub error: BacktestError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Sorted by Sharpe ratio, best first. Ties keep grid order.
    pub outcomes: Vec<SweepOutcome>,
    /// In grid order.
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn best(&self) -> Option<&SweepOutcome> {
        self.outcomes.first()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sweep executor. Parallel by default.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every grid point over the same inputs.
    ///
    /// Inputs are validated once up front; malformed data fails the whole
    /// sweep, since no grid point could run on it.
    pub fn run(
        &self,
        grid: &ParamGrid,
        base: &BacktestConfig,
        candles: &[Candle],
        signals: &[PredictionSignal],
    ) -> Result<SweepReport, DataError> {
        validate_inputs(candles, signals)?;

        let configs = grid.generate_configs(base);
        info!(points = configs.len(), parallel = self.parallel, "Starting parameter sweep");

        let run_point = |(index, config): (usize, &BacktestConfig)| {
            let outcome = BacktestEngine::new(config.clone())
                .map_err(BacktestError::from)
                .and_then(|engine| engine.run_backtest(candles, signals).map_err(BacktestError::from));
            (index, config.clone(), outcome)
        };

        let points: Vec<_> = if self.parallel {
            configs.par_iter().enumerate().map(run_point).collect()
        } else {
            configs.iter().enumerate().map(run_point).collect()
        };

        let mut report = SweepReport::default();
        for (index, config, outcome) in points {
            match outcome {
                Ok(result) => report.outcomes.push(SweepOutcome { index, config, result }),
                Err(error) => {
                    warn!(index, %error, "Sweep point failed");
                    report.failures.push(SweepFailure { index, config, error });
                }
            }
        }

        report.outcomes.sort_by(|a, b| {
            b.result
                .metrics
                .sharpe_ratio
                .total_cmp(&a.result.metrics.sharpe_ratio)
                .then(a.index.cmp(&b.index))
        });

        info!(
            completed = report.outcomes.len(),
            failed = report.failures.len(),
            best_sharpe = report.best().map(|o| o.result.metrics.sharpe_ratio),
            "Parameter sweep complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 4.0;
                Candle::new(i as i64 * 60_000, close, close + 1.5, close - 1.5, close, 10.0)
            })
            .collect()
    }

    fn signals(candles: &[Candle]) -> Vec<PredictionSignal> {
        candles
            .iter()
            .step_by(4)
            .map(|c| PredictionSignal::long(c.timestamp, 80.0, c.close))
            .collect()
    }

    #[test]
    fn empty_grid_runs_base_config_once() {
        let grid = ParamGrid::default();
        assert_eq!(grid.size(), 1);
        let base = BacktestConfig::default();
        assert_eq!(grid.generate_configs(&base), vec![base]);
    }

    #[test]
    fn grid_is_cartesian_product() {
        let grid = ParamGrid {
            stop_loss_percent: vec![1.0, 2.0],
            take_profit_percent: vec![0.0, 3.0, 6.0],
            max_concurrent_positions: vec![1, 2],
            ..Default::default()
        };
        let configs = grid.generate_configs(&BacktestConfig::default());
        assert_eq!(grid.size(), 12);
        assert_eq!(configs.len(), 12);
        assert_eq!(configs[0].stop_loss_percent, Some(1.0));
        assert_eq!(configs[0].take_profit_percent, None);
        assert_eq!(configs[0].max_concurrent_positions, 1);
        assert_eq!(configs[11].take_profit_percent, Some(6.0));
        assert_eq!(configs[11].max_concurrent_positions, 2);
    }

    #[test]
    fn invalid_points_are_reported_not_fatal() {
        let grid = ParamGrid {
            position_size_percent: vec![10.0, 150.0, 20.0],
            ..Default::default()
        };
        let c = candles(40);
        let s = signals(&c);
        let report = ParamSweep::new().run(&grid, &BacktestConfig::default(), &c, &s).unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert!(matches!(report.failures[0].error, BacktestError::Config(_)));
    }

    #[test]
    fn outcomes_sorted_by_sharpe() {
        let grid = ParamGrid {
            stop_loss_percent: vec![0.0, 1.0, 2.0],
            take_profit_percent: vec![0.0, 1.0, 3.0],
            ..Default::default()
        };
        let c = candles(80);
        let s = signals(&c);
        let report = ParamSweep::new().run(&grid, &BacktestConfig::default(), &c, &s).unwrap();
        assert_eq!(report.len(), 9);
        for pair in report.outcomes.windows(2) {
            assert!(pair[0].result.metrics.sharpe_ratio >= pair[1].result.metrics.sharpe_ratio);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let grid = ParamGrid {
            stop_loss_percent: vec![1.0, 2.0],
            max_concurrent_positions: vec![1, 3],
            ..Default::default()
        };
        let c = candles(60);
        let s = signals(&c);
        let base = BacktestConfig::default();
        let par = ParamSweep::new().run(&grid, &base, &c, &s).unwrap();
        let seq = ParamSweep::new().with_parallelism(false).run(&grid, &base, &c, &s).unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn malformed_data_fails_whole_sweep() {
        let mut c = candles(10);
        c[4].close = -1.0;
        let result = ParamSweep::new().run(&ParamGrid::default(), &BacktestConfig::default(), &c, &[]);
        assert!(result.is_err());
    }
}
