//! On-disk bar cache as UTF-8 (BOM) CSV files.
//!
//! Layout: `{cache_dir}/{instrument}/{width}_{unit}.csv`
//!
//! Writes go to a `.tmp` sibling and are renamed into place, so a reader
//! never sees a partial artifact under the canonical path.

use crate::domain::error::BarcrossError;
use crate::domain::ohlcv::Bar;
use crate::domain::session::BarKey;
use crate::ports::bar_cache_port::BarCachePort;
use chrono::NaiveDateTime;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const BAR_COLUMNS: [&str; 6] = ["datetime", "open", "high", "low", "close", "volume"];
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct CsvBarCache {
    cache_dir: PathBuf,
}

impl CsvBarCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn artifact_path(&self, key: &BarKey) -> PathBuf {
        self.cache_dir.join(&key.instrument).join(format!(
            "{}_{}.csv",
            key.interval.width, key.interval.unit
        ))
    }

    fn write_tmp(path: &Path, bars: &[Bar]) -> Result<(), BarcrossError> {
        let mut file = fs::File::create(path)?;
        file.write_all(UTF8_BOM)?;

        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(BAR_COLUMNS)?;
        for bar in bars {
            wtr.write_record([
                bar.open_time.format(DATETIME_FORMAT).to_string(),
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl BarCachePort for CsvBarCache {
    fn load(&self, key: &BarKey) -> Result<Option<Vec<Bar>>, BarcrossError> {
        let path = self.artifact_path(key);
        if !path.is_file() {
            return Ok(None);
        }
        read_bars(&path).map(Some)
    }

    fn store(&self, key: &BarKey, bars: &[Bar]) -> Result<(), BarcrossError> {
        let path = self.artifact_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("csv.tmp");

        if let Err(e) = Self::write_tmp(&tmp_path, bars) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            BarcrossError::Cache {
                reason: format!("atomic rename to {} failed: {e}", path.display()),
            }
        })
    }
}

/// Read a bar artifact, validating the header and sorting by open time.
pub fn read_bars(path: &Path) -> Result<Vec<Bar>, BarcrossError> {
    let source_name = path.display().to_string();
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let headers = rdr.headers()?.clone();
    let mut idx = [0usize; 6];
    for (slot, column) in idx.iter_mut().zip(BAR_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(column))
            .ok_or_else(|| BarcrossError::Schema {
                source_name: source_name.clone(),
                field: column.to_string(),
            })?;
    }

    let mut bars = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let field = |i: usize| record.get(idx[i]).unwrap_or_default();
        let open_time =
            NaiveDateTime::parse_from_str(field(0), DATETIME_FORMAT).map_err(|e| {
                BarcrossError::Parse {
                    input: field(0).to_string(),
                    reason: e.to_string(),
                }
            })?;
        bars.push(Bar {
            open_time,
            open: parse_f64(field(1))?,
            high: parse_f64(field(2))?,
            low: parse_f64(field(3))?,
            close: parse_f64(field(4))?,
            volume: parse_f64(field(5))?,
        });
    }

    bars.sort_by_key(|b| b.open_time);
    Ok(bars)
}

fn parse_f64(raw: &str) -> Result<f64, BarcrossError> {
    raw.parse().map_err(|e: std::num::ParseFloatError| BarcrossError::Parse {
        input: raw.to_string(),
        reason: e.to_string(),
    })
}
