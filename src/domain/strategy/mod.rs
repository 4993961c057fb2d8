//! Signal strategies over a bar series.
//!
//! Each strategy owns only its immutable configuration and is a pure function
//! of the bars it is given: the signal at t never depends on bars after t.

pub mod config;
pub mod dual_ma_cross;
pub mod multi_group;
pub mod single_ma_cross;
pub mod slope;
pub mod slope_threshold;
pub mod triple_ma_cross;

use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::SignalSeries;

pub use config::StrategyConfig;
pub use dual_ma_cross::DualMaCross;
pub use multi_group::MultiGroupMaCross;
pub use single_ma_cross::SingleMaCross;
pub use slope::SlopeMethod;
pub use slope_threshold::{SlopeOutput, SlopeThreshold};
pub use triple_ma_cross::TripleMaCross;

pub trait SignalStrategy: Send + Sync {
    /// Short label including parameters, e.g. `DMAC(SMA,5,20)`.
    fn name(&self) -> String;

    /// One signal per bar, aligned with `bars`.
    fn calculate_signals(&self, bars: &BarSeries) -> SignalSeries;
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::ohlcv::{Bar, BarSeries};
    use chrono::{Duration, NaiveDate};

    pub fn bars_from_closes(closes: &[f64]) -> BarSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                open_time: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect();
        BarSeries::new("TEST", bars).unwrap()
    }
}
