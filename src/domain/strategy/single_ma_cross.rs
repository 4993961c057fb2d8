//! Price versus a single moving average.

use crate::domain::indicator::MaKind;
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::{SignalSeries, cross_signals};
use crate::domain::strategy::SignalStrategy;

/// +1 when the close crosses above its MA, -1 when it crosses below.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleMaCross {
    pub ma: MaKind,
    pub period: usize,
}

impl SingleMaCross {
    pub fn new(ma: MaKind, period: usize) -> Self {
        Self { ma, period }
    }
}

impl SignalStrategy for SingleMaCross {
    fn name(&self) -> String {
        format!("SMAC({},{})", self.ma, self.period)
    }

    fn calculate_signals(&self, bars: &BarSeries) -> SignalSeries {
        let closes = bars.closes();
        let ma = self.ma.apply(&closes, self.period);
        let price: Vec<Option<f64>> = closes.into_iter().map(Some).collect();

        SignalSeries::from_parts(&bars.times(), cross_signals(&price, &ma))
    }
}
