//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first price (no bias correction), then
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k). Defined from the first position.

use crate::domain::indicator::MaSeries;

pub fn calculate_ema(prices: &[f64], period: usize) -> MaSeries {
    if period == 0 {
        return vec![None; prices.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;

    prices
        .iter()
        .map(|&price| {
            let next = match ema {
                None => price,
                Some(prev) => price * k + prev * (1.0 - k),
            };
            ema = Some(next);
            ema
        })
        .collect()
}
