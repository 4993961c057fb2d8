//! Hand-off port for finished signal series.

use crate::domain::error::BarcrossError;
use crate::domain::ohlcv::BarSeries;
use crate::domain::signal::SignalSeries;

/// Receives a signal series together with the bars it is aligned to, the
/// shape a downstream backtest engine consumes.
pub trait SignalSink: Send + Sync {
    fn publish(
        &self,
        label: &str,
        bars: &BarSeries,
        signals: &SignalSeries,
    ) -> Result<(), BarcrossError>;
}
