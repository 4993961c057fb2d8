//! Fast moving average versus slow moving average.

use crate::domain::indicator::MaKind;
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::{SignalSeries, cross_signals};
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, PartialEq)]
pub struct DualMaCross {
    pub ma: MaKind,
    pub fast_period: usize,
    pub slow_period: usize,
}

impl DualMaCross {
    pub fn new(ma: MaKind, fast_period: usize, slow_period: usize) -> Self {
        Self {
            ma,
            fast_period,
            slow_period,
        }
    }
}

impl SignalStrategy for DualMaCross {
    fn name(&self) -> String {
        format!(
            "DMAC({},{},{})",
            self.ma, self.fast_period, self.slow_period
        )
    }

    fn calculate_signals(&self, bars: &BarSeries) -> SignalSeries {
        let closes = bars.closes();
        let fast = self.ma.apply(&closes, self.fast_period);
        let slow = self.ma.apply(&closes, self.slow_period);

        SignalSeries::from_parts(&bars.times(), cross_signals(&fast, &slow))
    }
}
