//! Moving average library.
//!
//! Every average maps a price series to a derived series of equal length.
//! Positions without enough history are `None`, never a filler value.
//!
//! - `Simple`: trailing arithmetic mean, undefined for the first `p-1` values.
//! - `Exponential`: `alpha = 2/(p+1)`, seeded with the first price, defined
//!   from the first position.
//! - `WeightedLinear`: trailing window weighted `1..=p`, undefined for the
//!   first `p-1` values.

pub mod ema;
pub mod sma;
pub mod wma;

use crate::domain::error::BarcrossError;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// A derived series aligned 1:1 with its input.
pub type MaSeries = Vec<Option<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaKind {
    Simple,
    Exponential,
    WeightedLinear,
}

impl MaKind {
    pub fn apply(self, prices: &[f64], period: usize) -> MaSeries {
        match self {
            MaKind::Simple => sma::calculate_sma(prices, period),
            MaKind::Exponential => ema::calculate_ema(prices, period),
            MaKind::WeightedLinear => wma::calculate_wma(prices, period),
        }
    }
}

impl FromStr for MaKind {
    type Err = BarcrossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SMA" | "SIMPLE" => Ok(MaKind::Simple),
            "EMA" | "EXPONENTIAL" => Ok(MaKind::Exponential),
            "WMA" | "WEIGHTED" | "WEIGHTED-LINEAR" => Ok(MaKind::WeightedLinear),
            _ => Err(BarcrossError::unsupported("moving average kind", s.trim())),
        }
    }
}

impl fmt::Display for MaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaKind::Simple => write!(f, "SMA"),
            MaKind::Exponential => write!(f, "EMA"),
            MaKind::WeightedLinear => write!(f, "WMA"),
        }
    }
}

/// Fixed-capacity trailing window. Pushing into a full window evicts and
/// returns the oldest value.
#[derive(Debug, Clone)]
pub(crate) struct Window {
    values: VecDeque<f64>,
    capacity: usize,
}

impl Window {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, value: f64) -> Option<f64> {
        let evicted = if self.values.len() == self.capacity {
            self.values.pop_front()
        } else {
            None
        };
        self.values.push_back(value);
        evicted
    }

    pub(crate) fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }

    /// The shared value when every element is equal.
    pub(crate) fn constant(&self) -> Option<f64> {
        let first = *self.values.front()?;
        self.values.iter().all(|&v| v == first).then_some(first)
    }
}
