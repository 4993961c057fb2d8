//! Signal export as CSV, one file per (strategy label, instrument).

use crate::adapters::csv_bar_cache::DATETIME_FORMAT;
use crate::domain::error::BarcrossError;
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::SignalSeries;
use crate::ports::signal_port::SignalSink;
use std::fs;
use std::path::PathBuf;

pub struct CsvSignalSink {
    output_dir: PathBuf,
}

impl CsvSignalSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, label: &str, instrument: &str) -> PathBuf {
        self.output_dir.join(label).join(format!("{instrument}.csv"))
    }
}

impl SignalSink for CsvSignalSink {
    fn publish(
        &self,
        label: &str,
        bars: &BarSeries,
        signals: &SignalSeries,
    ) -> Result<(), BarcrossError> {
        if bars.len() != signals.len() {
            return Err(BarcrossError::InvalidSeries {
                instrument: bars.instrument().to_string(),
                reason: format!(
                    "{} bars but {} signals for {label}",
                    bars.len(),
                    signals.len()
                ),
            });
        }

        let path = self.output_path(label, bars.instrument());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(["datetime", "close", "signal"])?;
        for (bar, point) in bars.bars().iter().zip(&signals.points) {
            wtr.write_record([
                bar.open_time.format(DATETIME_FORMAT).to_string(),
                bar.close.to_string(),
                point.signal.map(|s| s.to_string()).unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
