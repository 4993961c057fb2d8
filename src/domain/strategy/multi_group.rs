//! Guppy multiple moving average (GMMA): a short group against a long group.
//!
//! Full separation at t means every short MA is above every long MA. Testing
//! all `|short| x |long|` pairs is equivalent to `min(short) > max(long)`:
//! the pairwise "all greater" holds exactly when the smallest short value
//! beats the largest long value, and its negation ("some pair <=") is the
//! negation of the same comparison. The bearish side uses
//! `max(short) < min(long)`. Each step is O(|short| + |long|).
//!
//! Performance-sensitive for large groups or long histories: every group
//! member is a full-length MA series.

use crate::domain::indicator::{MaKind, MaSeries};
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::{Signal, SignalSeries, from_edges};
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, PartialEq)]
pub struct MultiGroupMaCross {
    pub ma: MaKind,
    pub short_periods: Vec<usize>,
    pub long_periods: Vec<usize>,
}

impl MultiGroupMaCross {
    pub fn new(ma: MaKind, short_periods: Vec<usize>, long_periods: Vec<usize>) -> Self {
        Self {
            ma,
            short_periods,
            long_periods,
        }
    }
}

impl SignalStrategy for MultiGroupMaCross {
    fn name(&self) -> String {
        format!(
            "GMMA({},{},{})",
            self.ma,
            join(&self.short_periods),
            join(&self.long_periods)
        )
    }

    fn calculate_signals(&self, bars: &BarSeries) -> SignalSeries {
        let closes = bars.closes();
        let short: Vec<MaSeries> = self
            .short_periods
            .iter()
            .map(|&p| self.ma.apply(&closes, p))
            .collect();
        let long: Vec<MaSeries> = self
            .long_periods
            .iter()
            .map(|&p| self.ma.apply(&closes, p))
            .collect();

        let extremes: Vec<Option<GroupExtremes>> = (0..closes.len())
            .map(|t| GroupExtremes::at(&short, &long, t))
            .collect();

        let signals = (0..closes.len())
            .map(|t| {
                let prev = extremes[t.checked_sub(1)?]?;
                let now = extremes[t]?;
                let up = now.bullish() && !prev.bullish();
                let down = now.bearish() && !prev.bearish();
                Some(from_edges(up, down))
            })
            .collect::<Vec<Option<Signal>>>();

        SignalSeries::from_parts(&bars.times(), signals)
    }
}

#[derive(Debug, Clone, Copy)]
struct GroupExtremes {
    short_min: f64,
    short_max: f64,
    long_min: f64,
    long_max: f64,
}

impl GroupExtremes {
    /// `None` if any member of either group is undefined at `t`.
    fn at(short: &[MaSeries], long: &[MaSeries], t: usize) -> Option<Self> {
        let (short_min, short_max) = min_max(short.iter().map(|s| s[t]))?;
        let (long_min, long_max) = min_max(long.iter().map(|s| s[t]))?;
        Some(Self {
            short_min,
            short_max,
            long_min,
            long_max,
        })
    }

    fn bullish(&self) -> bool {
        self.short_min > self.long_max
    }

    fn bearish(&self) -> bool {
        self.short_max < self.long_min
    }
}

fn min_max(values: impl Iterator<Item = Option<f64>>) -> Option<(f64, f64)> {
    let mut acc: Option<(f64, f64)> = None;
    for v in values {
        let v = v?;
        acc = Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }
    acc
}

fn join(periods: &[usize]) -> String {
    periods
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("/")
}
