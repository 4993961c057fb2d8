#![allow(dead_code)]

use barcross::domain::error::BarcrossError;
use barcross::domain::ohlcv::{Bar, BarSeries};
use barcross::domain::session::BarKey;
use barcross::domain::signal::SignalSeries;
use barcross::domain::tick::Tick;
use barcross::ports::bar_cache_port::BarCachePort;
use barcross::ports::signal_port::SignalSink;
use barcross::ports::tick_port::TickPort;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockTickPort {
    pub ticks: HashMap<String, Vec<Tick>>,
    pub errors: HashMap<String, String>,
    loads: AtomicUsize,
}

impl MockTickPort {
    pub fn new() -> Self {
        Self {
            ticks: HashMap::new(),
            errors: HashMap::new(),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn with_ticks(mut self, instrument: &str, ticks: Vec<Tick>) -> Self {
        self.ticks.insert(instrument.to_string(), ticks);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl TickPort for MockTickPort {
    fn load_ticks(&self, instrument: &str) -> Result<Vec<Tick>, BarcrossError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(instrument) {
            return Err(BarcrossError::Parse {
                input: instrument.to_string(),
                reason: reason.clone(),
            });
        }
        self.ticks
            .get(instrument)
            .cloned()
            .ok_or_else(|| BarcrossError::DataNotFound {
                instrument: instrument.to_string(),
                path: "mock".to_string(),
            })
    }

    fn list_instruments(&self) -> Result<Vec<String>, BarcrossError> {
        let mut names: Vec<String> = self.ticks.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[derive(Default)]
pub struct MemoryBarCache {
    entries: Mutex<HashMap<BarKey, Vec<Bar>>>,
    stores: AtomicUsize,
}

impl MemoryBarCache {
    pub fn stores(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &BarKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

impl BarCachePort for MemoryBarCache {
    fn load(&self, key: &BarKey) -> Result<Option<Vec<Bar>>, BarcrossError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn store(&self, key: &BarKey, bars: &[Bar]) -> Result<(), BarcrossError> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.clone(), bars.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub published: Mutex<Vec<(String, String, usize)>>,
}

impl SignalSink for RecordingSink {
    fn publish(
        &self,
        label: &str,
        bars: &BarSeries,
        signals: &SignalSeries,
    ) -> Result<(), BarcrossError> {
        assert_eq!(bars.len(), signals.len());
        self.published.lock().unwrap().push((
            label.to_string(),
            bars.instrument().to_string(),
            signals.len(),
        ));
        Ok(())
    }
}

pub fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

pub fn tick(at: NaiveDateTime, price: f64, volume: f64) -> Tick {
    Tick::new(at, price, volume)
}

/// One tick per trading day at 10:00 with the given prices.
pub fn daily_ticks(prices: &[f64]) -> Vec<Tick> {
    let start = ts(2024, 1, 1, 10, 0, 0);
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| tick(start + Duration::days(i as i64), p, 100.0))
        .collect()
}

pub fn bars_from_closes(instrument: &str, closes: &[f64]) -> BarSeries {
    let start = ts(2024, 1, 1, 0, 0, 0);
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::open_at(start + Duration::days(i as i64), c, 1.0))
        .collect();
    BarSeries::new(instrument, bars).unwrap()
}
