//! CSV loading for candles and prediction signals.
//!
//! Candle files carry a `timestamp,open,high,low,close,volume` header; signal
//! files carry `timestamp,direction,confidence,price`. Timestamps are either
//! integer epoch milliseconds or RFC 3339 strings. Directions are `LONG` or
//! `SHORT`, case-insensitive.
//!
//! Loading only parses. Whether the values make sense (positive prices,
//! increasing timestamps, confidence range) is checked by the engine.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use serde::Deserialize;
use siglab_core::domain::Timestamp;
use siglab_core::{Candle, ConfigError, Direction, PredictionSignal};
use thiserror::Error;
use tracing::debug;

/// Errors from loading run configuration and input files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [backtest] table: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed CSV in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    #[error("{source_name} row {row}: {reason}")]
    Row {
        source_name: String,
        row: usize,
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct SignalRow {
    timestamp: String,
    direction: String,
    confidence: f64,
    price: f64,
}

/// Parse epoch milliseconds, falling back to RFC 3339.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return Ok(ms);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| format!("timestamp `{raw}` is neither epoch millis nor RFC 3339 ({e})"))
}

pub fn parse_direction(raw: &str) -> Result<Direction, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("long") {
        Ok(Direction::Long)
    } else if raw.eq_ignore_ascii_case("short") {
        Ok(Direction::Short)
    } else {
        Err(format!("direction `{raw}` must be LONG or SHORT"))
    }
}

pub fn load_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let file = open(path)?;
    let candles = read_candles(file, &path.display().to_string())?;
    debug!(path = %path.display(), count = candles.len(), "Loaded candles");
    Ok(candles)
}

pub fn load_signals(path: &Path) -> Result<Vec<PredictionSignal>, LoadError> {
    let file = open(path)?;
    let signals = read_signals(file, &path.display().to_string())?;
    debug!(path = %path.display(), count = signals.len(), "Loaded signals");
    Ok(signals)
}

/// Read candles from any CSV source. `source_name` labels errors.
pub fn read_candles<R: Read>(reader: R, source_name: &str) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut candles = Vec::new();
    for (i, row) in rdr.deserialize::<CandleRow>().enumerate() {
        let row = row.map_err(|source| csv_error(source_name, source))?;
        let timestamp = parse_timestamp(&row.timestamp).map_err(|reason| row_error(source_name, i, reason))?;
        candles.push(Candle::new(timestamp, row.open, row.high, row.low, row.close, row.volume));
    }
    Ok(candles)
}

/// Read signals from any CSV source. `source_name` labels errors.
pub fn read_signals<R: Read>(reader: R, source_name: &str) -> Result<Vec<PredictionSignal>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut signals = Vec::new();
    for (i, row) in rdr.deserialize::<SignalRow>().enumerate() {
        let row = row.map_err(|source| csv_error(source_name, source))?;
        let timestamp = parse_timestamp(&row.timestamp).map_err(|reason| row_error(source_name, i, reason))?;
        let direction = parse_direction(&row.direction).map_err(|reason| row_error(source_name, i, reason))?;
        signals.push(PredictionSignal::new(timestamp, direction, row.confidence, row.price));
    }
    Ok(signals)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_error(source_name: &str, source: csv::Error) -> LoadError {
    LoadError::Csv {
        source_name: source_name.to_string(),
        source,
    }
}

/// Rows are numbered from 1, excluding the header.
fn row_error(source_name: &str, index: usize, reason: String) -> LoadError {
    LoadError::Row {
        source_name: source_name.to_string(),
        row: index + 1,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_millis_timestamp() {
        assert_eq!(parse_timestamp("1700000000000").unwrap(), 1_700_000_000_000);
        assert_eq!(parse_timestamp(" 42 ").unwrap(), 42);
    }

    #[test]
    fn rfc3339_timestamp() {
        assert_eq!(parse_timestamp("1970-01-01T00:01:00Z").unwrap(), 60_000);
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00").unwrap(), 0);
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!(parse_direction("LONG").unwrap(), Direction::Long);
        assert_eq!(parse_direction("short").unwrap(), Direction::Short);
        assert_eq!(parse_direction(" Long ").unwrap(), Direction::Long);
        assert!(parse_direction("flat").is_err());
    }

    #[test]
    fn reads_candle_csv() {
        let csv = "timestamp,open,high,low,close,volume\n\
                   0,100,101,99,100.5,10\n\
                   1970-01-01T00:01:00Z,100.5,102,100,101,12\n";
        let candles = read_candles(csv.as_bytes(), "inline").unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].timestamp, 60_000);
        assert_eq!(candles[1].high, 102.0);
    }

    #[test]
    fn reads_signal_csv() {
        let csv = "timestamp,direction,confidence,price\n\
                   0,LONG,85,100\n\
                   60000,short,72.5,101\n";
        let signals = read_signals(csv.as_bytes(), "inline").unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[1].direction, Direction::Short);
        assert_eq!(signals[1].confidence, 72.5);
    }

    #[test]
    fn bad_direction_names_the_row() {
        let csv = "timestamp,direction,confidence,price\n\
                   0,LONG,85,100\n\
                   60000,UP,80,100\n";
        let err = read_signals(csv.as_bytes(), "signals.csv").unwrap_err();
        match err {
            LoadError::Row { row, source_name, .. } => {
                assert_eq!(row, 2);
                assert_eq!(source_name, "signals.csv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_price_is_a_csv_error() {
        let csv = "timestamp,open,high,low,close,volume\n0,abc,101,99,100,10\n";
        let err = read_candles(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_candles(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
