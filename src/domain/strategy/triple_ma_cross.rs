//! Short, mid and long moving averages.
//!
//! Long when short > mid > long holds now and at least one of the two adjacent
//! orderings did not hold on the previous bar. The ordering is "newly formed",
//! not a strict simultaneous triple cross. Short is the mirror image.

use crate::domain::indicator::MaKind;
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::{Signal, SignalSeries, from_edges};
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, PartialEq)]
pub struct TripleMaCross {
    pub ma: MaKind,
    pub short_period: usize,
    pub mid_period: usize,
    pub long_period: usize,
}

impl TripleMaCross {
    pub fn new(ma: MaKind, short_period: usize, mid_period: usize, long_period: usize) -> Self {
        Self {
            ma,
            short_period,
            mid_period,
            long_period,
        }
    }
}

impl SignalStrategy for TripleMaCross {
    fn name(&self) -> String {
        format!(
            "TMAC({},{},{},{})",
            self.ma, self.short_period, self.mid_period, self.long_period
        )
    }

    fn calculate_signals(&self, bars: &BarSeries) -> SignalSeries {
        let closes = bars.closes();
        let short = self.ma.apply(&closes, self.short_period);
        let mid = self.ma.apply(&closes, self.mid_period);
        let long = self.ma.apply(&closes, self.long_period);

        let signals = (0..closes.len())
            .map(|t| step(&short, &mid, &long, t))
            .collect();

        SignalSeries::from_parts(&bars.times(), signals)
    }
}

fn step(
    short: &[Option<f64>],
    mid: &[Option<f64>],
    long: &[Option<f64>],
    t: usize,
) -> Option<Signal> {
    let prev = t.checked_sub(1)?;
    let (s, m, l) = (short[t]?, mid[t]?, long[t]?);
    let (sp, mp, lp) = (short[prev]?, mid[prev]?, long[prev]?);

    let up = s > m && m > l && (sp <= mp || mp <= lp);
    let down = s < m && m < l && (sp >= mp || mp >= lp);
    Some(from_edges(up, down))
}
