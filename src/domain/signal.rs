//! Discrete trading signals aligned with a bar series.

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Short,
    Flat,
    Long,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// `signal` is `None` where the inputs lack enough history.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPoint {
    pub time: NaiveDateTime,
    pub signal: Option<Signal>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalSeries {
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn from_parts(times: &[NaiveDateTime], signals: Vec<Option<Signal>>) -> Self {
        let points = times
            .iter()
            .zip(signals)
            .map(|(&time, signal)| SignalPoint { time, signal })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn signals(&self) -> Vec<Option<Signal>> {
        self.points.iter().map(|p| p.signal).collect()
    }

    /// Values as -1/0/1, `None` where undefined.
    pub fn values(&self) -> Vec<Option<i8>> {
        self.points
            .iter()
            .map(|p| p.signal.map(Signal::value))
            .collect()
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.points
            .iter()
            .filter(|p| p.signal == Some(signal))
            .count()
    }
}

/// Resolve a step from its two mutually exclusive edge conditions.
pub fn from_edges(up: bool, down: bool) -> Signal {
    match (up, down) {
        (true, false) => Signal::Long,
        (false, true) => Signal::Short,
        _ => Signal::Flat,
    }
}

/// Boundary-cross signal between two series.
///
/// Up at t: `a[t] > b[t]` and `a[t-1] <= b[t-1]`.
/// Down at t: `a[t] < b[t]` and `a[t-1] >= b[t-1]`.
/// Undefined at t = 0 and wherever either series is undefined at t or t-1.
pub fn cross_signals(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<Signal>> {
    let n = a.len().min(b.len());
    (0..n)
        .map(|t| {
            if t == 0 {
                return None;
            }
            let (a_now, b_now, a_prev, b_prev) = (a[t]?, b[t]?, a[t - 1]?, b[t - 1]?);
            let up = a_now > b_now && a_prev <= b_prev;
            let down = a_now < b_now && a_prev >= b_prev;
            Some(from_edges(up, down))
        })
        .collect()
}
