//! Weighted Moving Average.
//!
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! The dot product is taken over the trailing window at every step. A
//! window of identical prices yields that price exactly.
//! Warmup: first (n-1) positions are undefined.

use crate::domain::indicator::{MaSeries, Window};

pub fn calculate_wma(prices: &[f64], period: usize) -> MaSeries {
    if period == 0 {
        return vec![None; prices.len()];
    }

    let mut values = Vec::with_capacity(prices.len());
    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut window = Window::new(period);

    for &price in prices {
        window.push(price);
        values.push(window.is_full().then(|| weighted_mean(&window, divisor)));
    }

    values
}

fn weighted_mean(window: &Window, divisor: f64) -> f64 {
    if let Some(value) = window.constant() {
        return value;
    }
    window
        .iter()
        .enumerate()
        .map(|(j, p)| (j + 1) as f64 * p)
        .sum::<f64>()
        / divisor
}
