//! Tick partitions stored as CSV files, one directory per instrument.
//!
//! Layout: `{base}/{instrument}/*.csv`. Partitions are read in file-name
//! order and concatenated.

use crate::domain::error::BarcrossError;
use crate::domain::tick::Tick;
use crate::ports::tick_port::TickPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y%m%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y%m%d %H:%M",
];

/// Header names of the four fields a tick is built from. Matched
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickColumns {
    pub date: String,
    pub time: String,
    pub price: String,
    pub volume: String,
}

impl Default for TickColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            time: "Time".to_string(),
            price: "deal_price".to_string(),
            volume: "volume".to_string(),
        }
    }
}

pub struct CsvTickAdapter {
    base_path: PathBuf,
    columns: TickColumns,
}

impl CsvTickAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            columns: TickColumns::default(),
        }
    }

    pub fn with_columns(mut self, columns: TickColumns) -> Self {
        self.columns = columns;
        self
    }

    fn instrument_dir(&self, instrument: &str) -> PathBuf {
        self.base_path.join(instrument)
    }

    fn partitions(&self, instrument: &str) -> Result<Vec<PathBuf>, BarcrossError> {
        let dir = self.instrument_dir(instrument);
        let not_found = || BarcrossError::DataNotFound {
            instrument: instrument.to_string(),
            path: dir.display().to_string(),
        };
        if !dir.is_dir() {
            return Err(not_found());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if path.is_file() && is_csv {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(not_found());
        }
        files.sort();
        Ok(files)
    }

    fn read_partition(&self, path: &Path, out: &mut Vec<Tick>) -> Result<(), BarcrossError> {
        let source_name = path.display().to_string();
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

        let headers = rdr.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
                .ok_or_else(|| BarcrossError::Schema {
                    source_name: source_name.clone(),
                    field: name.to_string(),
                })
        };
        let date_idx = find(&self.columns.date)?;
        let time_idx = find(&self.columns.time)?;
        let price_idx = find(&self.columns.price)?;
        let volume_idx = find(&self.columns.volume)?;

        for record in rdr.records() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or_default();

            let timestamp = parse_timestamp(field(date_idx), field(time_idx))?;
            let price = parse_number(field(price_idx))?;
            let volume = parse_number(field(volume_idx))?;
            out.push(Tick::new(timestamp, price, volume));
        }
        Ok(())
    }
}

impl TickPort for CsvTickAdapter {
    fn load_ticks(&self, instrument: &str) -> Result<Vec<Tick>, BarcrossError> {
        let mut ticks = Vec::new();
        for path in self.partitions(instrument)? {
            self.read_partition(&path, &mut ticks)?;
        }
        Ok(ticks)
    }

    fn list_instruments(&self) -> Result<Vec<String>, BarcrossError> {
        let mut instruments = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if entry.path().is_dir() {
                instruments.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        instruments.sort();
        Ok(instruments)
    }
}

/// Join a trade date and trade time and parse against the accepted layouts.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, BarcrossError> {
    let joined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
        .ok_or_else(|| BarcrossError::Parse {
            input: joined.clone(),
            reason: "unrecognised timestamp layout".to_string(),
        })
}

fn parse_number(raw: &str) -> Result<f64, BarcrossError> {
    raw.replace(',', "")
        .parse::<f64>()
        .map_err(|e| BarcrossError::Parse {
            input: raw.to_string(),
            reason: e.to_string(),
        })
}
