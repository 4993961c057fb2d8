//! Moving-average slope against a threshold (SMAS).
//!
//! beta is estimated over a trailing window, then shifted one bar so the
//! decision at t only sees beta computed through t-1.
//!
//! With [`SlopeMethod::M4`] the configured threshold is ignored: the effective
//! threshold at each bar is the expanding interquartile range of the slope
//! series, shifted together with beta. This coupling between estimator and
//! threshold is kept deliberately visible in [`SlopeOutput::threshold`].

use crate::domain::indicator::{MaKind, MaSeries};
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::{Signal, SignalSeries};
use crate::domain::strategy::slope::{SlopeMethod, expanding_iqr, shift_forward};
use crate::domain::strategy::SignalStrategy;

#[derive(Debug, Clone, PartialEq)]
pub struct SlopeThreshold {
    pub ma: MaKind,
    pub ma_period: usize,
    pub slope_period: usize,
    pub method: SlopeMethod,
    pub threshold: f64,
}

/// Every derived series of one run, aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeOutput {
    pub ma: MaSeries,
    /// Slope estimate through t.
    pub beta: Vec<Option<f64>>,
    /// Slope estimate through t-1, the value the decision at t uses.
    pub decision_beta: Vec<Option<f64>>,
    /// Threshold in effect at t.
    pub threshold: Vec<Option<f64>>,
    pub signals: SignalSeries,
}

impl SlopeThreshold {
    pub fn new(
        ma: MaKind,
        ma_period: usize,
        slope_period: usize,
        method: SlopeMethod,
        threshold: f64,
    ) -> Self {
        Self {
            ma,
            ma_period,
            slope_period,
            method,
            threshold,
        }
    }

    pub fn compute(&self, bars: &BarSeries) -> SlopeOutput {
        let closes = bars.closes();
        let ma = self.ma.apply(&closes, self.ma_period);
        let beta = self.method.estimate(&ma, self.slope_period);
        let decision_beta = shift_forward(&beta);

        let threshold = if self.method.overrides_threshold() {
            shift_forward(&expanding_iqr(&beta))
        } else {
            vec![Some(self.threshold); closes.len()]
        };

        let signals = decision_beta
            .iter()
            .zip(&threshold)
            .map(|(b, th)| Some(classify((*b)?, (*th)?)))
            .collect();

        SlopeOutput {
            signals: SignalSeries::from_parts(&bars.times(), signals),
            ma,
            beta,
            decision_beta,
            threshold,
        }
    }
}

/// With a negative threshold both bands overlap around zero; the short band
/// wins there.
fn classify(beta: f64, threshold: f64) -> Signal {
    if beta < -threshold {
        Signal::Short
    } else if beta > threshold {
        Signal::Long
    } else {
        Signal::Flat
    }
}

impl SignalStrategy for SlopeThreshold {
    fn name(&self) -> String {
        format!(
            "SMAS({},{},{},{},{})",
            self.ma, self.ma_period, self.slope_period, self.method, self.threshold
        )
    }

    fn calculate_signals(&self, bars: &BarSeries) -> SignalSeries {
        self.compute(bars).signals
    }
}
