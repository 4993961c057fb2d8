//! Bar aggregation with a build cache keyed by (instrument, interval).
//!
//! The first request for a key reads the tick partitions, aggregates them and
//! publishes the artifact; later requests return the cached artifact
//! unchanged. One writer per key is assumed.

use crate::domain::aggregation::aggregate_ticks;
use crate::domain::error::BarcrossError;
use crate::domain::ohlcv::BarSeries;
use crate::domain::session::{BarKey, Session};
use crate::ports::bar_cache_port::BarCachePort;
use crate::ports::tick_port::TickPort;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Built,
}

#[derive(Debug, Clone)]
pub struct Fetched {
    pub bars: BarSeries,
    pub outcome: CacheOutcome,
}

pub struct BarAggregator<'a> {
    ticks: &'a dyn TickPort,
    cache: &'a dyn BarCachePort,
    session: Session,
}

impl<'a> BarAggregator<'a> {
    pub fn new(ticks: &'a dyn TickPort, cache: &'a dyn BarCachePort, session: Session) -> Self {
        Self {
            ticks,
            cache,
            session,
        }
    }

    pub fn get_bars(&self, key: &BarKey) -> Result<BarSeries, BarcrossError> {
        self.fetch(key).map(|f| f.bars)
    }

    pub fn fetch(&self, key: &BarKey) -> Result<Fetched, BarcrossError> {
        if let Some(bars) = self.cache.load(key)? {
            debug!(key = %key, bars = bars.len(), "bar cache hit");
            return Ok(Fetched {
                bars: BarSeries::new(key.instrument.clone(), bars)?,
                outcome: CacheOutcome::Hit,
            });
        }

        debug!(key = %key, "bar cache miss, aggregating ticks");
        let ticks = self.ticks.load_ticks(&key.instrument)?;
        let tick_count = ticks.len();
        let bars = aggregate_ticks(ticks, &self.session, key.interval);
        if bars.is_empty() {
            warn!(key = %key, ticks = tick_count, "no ticks inside the trading session");
        }

        let series = BarSeries::new(key.instrument.clone(), bars)?;
        self.cache.store(key, series.bars())?;
        info!(key = %key, ticks = tick_count, bars = series.len(), "bars aggregated");

        Ok(Fetched {
            bars: series,
            outcome: CacheOutcome::Built,
        })
    }
}
