//! Raw trade records.

use chrono::NaiveDateTime;

/// One trade print: when it happened, at what price, for how much volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub volume: f64,
}

impl Tick {
    pub fn new(timestamp: NaiveDateTime, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }
}
