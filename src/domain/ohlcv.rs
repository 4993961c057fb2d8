//! OHLCV bar representation.

use crate::domain::error::BarcrossError;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub open_time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Start a bar from the first tick of a bucket.
    pub fn open_at(open_time: NaiveDateTime, price: f64, volume: f64) -> Self {
        Self {
            open_time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    /// Fold a later tick of the same bucket into the bar.
    pub fn absorb(&mut self, price: f64, volume: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += volume;
    }
}

/// Bars for one instrument with strictly increasing open times.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    instrument: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(instrument: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarcrossError> {
        let instrument = instrument.into();
        if let Some(pair) = bars
            .windows(2)
            .find(|pair| pair[0].open_time >= pair[1].open_time)
        {
            return Err(BarcrossError::InvalidSeries {
                instrument,
                reason: format!(
                    "bar times not strictly increasing at {} -> {}",
                    pair[0].open_time, pair[1].open_time
                ),
            });
        }
        Ok(Self { instrument, bars })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn times(&self) -> Vec<NaiveDateTime> {
        self.bars.iter().map(|b| b.open_time).collect()
    }
}
