//! Parallel sweep over instrument x strategy units.
//!
//! Runs in two phases on a dedicated rayon pool. The first phase builds or
//! fetches bars once per instrument, so no two workers ever race on the same
//! cache key. The second phase runs every strategy on every instrument's
//! bars. A failing unit is logged and recorded; it never aborts the others.

use crate::domain::bar_aggregator::BarAggregator;
use crate::domain::error::BarcrossError;
use crate::domain::ohlcv::BarSeries;
use crate::domain::session::{BarKey, Interval};
use crate::domain::signal::Signal;
use crate::domain::strategy::StrategyConfig;
use crate::ports::signal_port::SignalSink;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSummary {
    pub bars: usize,
    pub longs: usize,
    pub shorts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub label: String,
    pub instrument: String,
    pub strategy: String,
    pub result: Result<UnitSummary, String>,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl SweepReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when there was work and none of it succeeded.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded() == 0
    }
}

pub struct Sweep<'a> {
    aggregator: &'a BarAggregator<'a>,
    sink: Option<&'a dyn SignalSink>,
    interval: Interval,
    workers: usize,
}

impl<'a> Sweep<'a> {
    pub fn new(aggregator: &'a BarAggregator<'a>, interval: Interval) -> Self {
        Self {
            aggregator,
            sink: None,
            interval,
            workers: 0,
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn SignalSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 0 uses one worker per available core.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn run(
        &self,
        instruments: &[String],
        strategies: &[(String, StrategyConfig)],
    ) -> Result<SweepReport, BarcrossError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| BarcrossError::invalid("sweep", "workers", e.to_string()))?;

        let total = instruments.len() * strategies.len();
        info!(
            instruments = instruments.len(),
            strategies = strategies.len(),
            units = total,
            workers = pool.current_num_threads(),
            "starting sweep"
        );

        let report = pool.install(|| {
            let bars = self.warm(instruments);
            let units: Vec<(&String, &(String, StrategyConfig))> = instruments
                .iter()
                .flat_map(|inst| strategies.iter().map(move |s| (inst, s)))
                .collect();

            let done = Mutex::new(0usize);
            let outcomes = units
                .par_iter()
                .map(|(instrument, (label, config))| {
                    let outcome = self.run_unit(instrument, label, config, &bars);
                    let n = {
                        let mut done = done.lock().unwrap_or_else(PoisonError::into_inner);
                        *done += 1;
                        *done
                    };
                    match &outcome.result {
                        Ok(s) => info!(
                            unit = %format!("{}/{}", outcome.label, outcome.instrument),
                            progress = %format!("{n}/{total}"),
                            bars = s.bars,
                            longs = s.longs,
                            shorts = s.shorts,
                            "unit finished"
                        ),
                        Err(e) => error!(
                            unit = %format!("{}/{}", outcome.label, outcome.instrument),
                            progress = %format!("{n}/{total}"),
                            error = %e,
                            "unit failed"
                        ),
                    }
                    outcome
                })
                .collect();
            SweepReport { outcomes }
        });

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "sweep finished"
        );
        Ok(report)
    }

    /// One bar fetch per instrument; errors are kept as text for the units
    /// that depend on them.
    fn warm(&self, instruments: &[String]) -> HashMap<String, Result<BarSeries, String>> {
        instruments
            .par_iter()
            .map(|instrument| {
                let key = BarKey::new(instrument.clone(), self.interval);
                let bars = self.aggregator.get_bars(&key).map_err(|e| {
                    error!(key = %key, error = %e, "bar aggregation failed");
                    e.to_string()
                });
                (instrument.clone(), bars)
            })
            .collect()
    }

    fn run_unit(
        &self,
        instrument: &str,
        label: &str,
        config: &StrategyConfig,
        bars: &HashMap<String, Result<BarSeries, String>>,
    ) -> UnitOutcome {
        let strategy = config.build();
        let result = match bars.get(instrument) {
            None => Err(format!("no bars prepared for {instrument}")),
            Some(Err(e)) => Err(e.clone()),
            Some(Ok(series)) => {
                let signals = strategy.calculate_signals(series);
                let published = match self.sink {
                    Some(sink) => sink.publish(label, series, &signals),
                    None => Ok(()),
                };
                published
                    .map(|()| UnitSummary {
                        bars: series.len(),
                        longs: signals.count(Signal::Long),
                        shorts: signals.count(Signal::Short),
                    })
                    .map_err(|e| e.to_string())
            }
        };
        UnitOutcome {
            label: label.to_string(),
            instrument: instrument.to_string(),
            strategy: strategy.name(),
            result,
        }
    }
}
