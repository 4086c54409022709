//! Artifact export: JSON result manifests and CSV tapes.
//!
//! - **JSON**: the full result plus its config, with a schema version
//! - **CSV**: trade tape, equity curve, and a sweep leaderboard
//!
//! Manifests with a newer schema version than this build understands are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use siglab_core::{BacktestConfig, BacktestResult, EquityPoint, Trade};

use crate::sweep::SweepReport;

/// Current version of the JSON manifest layout.
pub const SCHEMA_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "result.json";
pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_FILE: &str = "equity.csv";

/// A result as persisted: enough to reproduce and verify the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultManifest {
    pub schema_version: u32,
    /// BLAKE3 fingerprint of `result`.
    pub fingerprint: String,
    pub config: BacktestConfig,
    pub result: BacktestResult,
}

impl ResultManifest {
    pub fn new(config: &BacktestConfig, result: &BacktestResult) -> Result<Self> {
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            fingerprint: result.fingerprint().context("failed to fingerprint result")?,
            config: config.clone(),
            result: result.clone(),
        })
    }
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(config: &BacktestConfig, result: &BacktestResult) -> Result<String> {
    let manifest = ResultManifest::new(config, result)?;
    serde_json::to_string_pretty(&manifest).context("failed to serialize result manifest to JSON")
}

/// Parse a manifest, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ResultManifest> {
    let manifest: ResultManifest =
        serde_json::from_str(json).context("failed to deserialize result manifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: id, direction, confidence, entry_index, entry_timestamp,
/// entry_price, exit_index, exit_timestamp, exit_price, exit_reason,
/// position_size, stop_loss, take_profit, costs, pnl, return_pct
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "id",
        "direction",
        "confidence",
        "entry_index",
        "entry_timestamp",
        "entry_price",
        "exit_index",
        "exit_timestamp",
        "exit_price",
        "exit_reason",
        "position_size",
        "stop_loss",
        "take_profit",
        "costs",
        "pnl",
        "return_pct",
    ])?;

    for t in trades {
        wtr.write_record([
            t.id.to_string(),
            t.direction.as_str().to_string(),
            format!("{:.2}", t.confidence),
            t.entry_index.to_string(),
            t.entry_timestamp.to_string(),
            format!("{:.6}", t.entry_price),
            opt(t.exit_index),
            opt(t.exit_timestamp),
            t.exit_price.map(|p| format!("{p:.6}")).unwrap_or_default(),
            t.exit_reason.map(|r| r.as_str().to_string()).unwrap_or_default(),
            format!("{:.6}", t.position_size),
            t.stop_loss_price.map(|p| format!("{p:.6}")).unwrap_or_default(),
            t.take_profit_price.map(|p| format!("{p:.6}")).unwrap_or_default(),
            format!("{:.2}", t.total_cost()),
            t.pnl.map(|p| format!("{p:.2}")).unwrap_or_default(),
            format!("{:.6}", t.return_pct()),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["index", "timestamp", "equity"])?;
    for (i, point) in equity_curve.iter().enumerate() {
        wtr.write_record([
            i.to_string(),
            point.timestamp.to_string(),
            format!("{:.2}", point.equity),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per successful grid point, best Sharpe first.
pub fn export_sweep_csv(report: &SweepReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "rank",
        "grid_index",
        "stop_loss_percent",
        "take_profit_percent",
        "position_size_percent",
        "max_concurrent_positions",
        "trades",
        "win_rate",
        "total_pnl",
        "sharpe_ratio",
        "max_drawdown_percent",
        "profit_factor",
    ])?;
    for (rank, outcome) in report.outcomes.iter().enumerate() {
        let c = &outcome.config;
        let m = &outcome.result.metrics;
        wtr.write_record([
            (rank + 1).to_string(),
            outcome.index.to_string(),
            opt(c.stop_loss_percent),
            opt(c.take_profit_percent),
            c.position_size_percent.to_string(),
            c.max_concurrent_positions.to_string(),
            m.total_trades.to_string(),
            format!("{:.4}", m.win_rate),
            format!("{:.2}", m.total_pnl),
            format!("{:.4}", m.sharpe_ratio),
            format!("{:.2}", m.max_drawdown_percent),
            format!("{:.4}", m.profit_factor),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the manifest, trade tape, and equity curve into `output_dir`,
/// creating it if needed. Existing files are overwritten.
///
/// Returns `output_dir`.
pub fn save_artifacts(
    config: &BacktestConfig,
    result: &BacktestResult,
    output_dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create artifact dir: {}", output_dir.display()))?;

    write(output_dir, MANIFEST_FILE, &export_json(config, result)?)?;
    write(output_dir, TRADES_FILE, &export_trades_csv(&result.trades)?)?;
    write(output_dir, EQUITY_FILE, &export_equity_csv(&result.equity_curve)?)?;

    tracing::info!(dir = %output_dir.display(), "Saved artifacts");
    Ok(output_dir.to_path_buf())
}

/// Load the manifest from an artifact directory and check its fingerprint.
pub fn load_artifacts(dir: &Path) -> Result<ResultManifest> {
    let path = dir.join(MANIFEST_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest = import_json(&json)?;
    let actual = manifest.result.fingerprint().context("failed to fingerprint result")?;
    if actual != manifest.fingerprint {
        bail!(
            "fingerprint mismatch in {}: manifest says {}, content hashes to {}",
            path.display(),
            manifest.fingerprint,
            actual
        );
    }
    Ok(manifest)
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}
