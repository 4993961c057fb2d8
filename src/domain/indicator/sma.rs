//! Simple Moving Average.
//!
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n, summed afresh from the trailing
//! window at every step so rounding never carries between windows.
//! A window of identical prices yields that price exactly.
//! Warmup: first (n-1) positions are undefined.

use crate::domain::indicator::{MaSeries, Window};

pub fn calculate_sma(prices: &[f64], period: usize) -> MaSeries {
    if period == 0 {
        return vec![None; prices.len()];
    }

    let mut values = Vec::with_capacity(prices.len());
    let mut window = Window::new(period);

    for &price in prices {
        window.push(price);
        values.push(window.is_full().then(|| mean(&window, period)));
    }

    values
}

fn mean(window: &Window, period: usize) -> f64 {
    match window.constant() {
        Some(value) => value,
        None => window.iter().sum::<f64>() / period as f64,
    }
}
