//! Slope ("beta") estimators over a moving average.
//!
//! All estimators take the MA series and a trailing window `n` and return a
//! series of equal length, `None` where the window lacks history.

use crate::domain::error::BarcrossError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlopeMethod {
    /// Average change per bar: `(ma[t] - ma[t-n]) / n`.
    M1,
    /// `M1` as a percentage of the MA one bar earlier.
    M2,
    /// Z-score of `M1` against its own trailing mean and sample deviation.
    M3,
    /// `M1` as a fraction of the MA one bar earlier. Replaces the static
    /// threshold with the expanding interquartile range of this slope.
    M4,
    /// Least-squares slope of the last `n` MA values against `0..n`.
    Ols,
}

impl SlopeMethod {
    pub fn estimate(self, ma: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
        match self {
            SlopeMethod::M1 => average_change(ma, n),
            SlopeMethod::M2 => relative_change(ma, n)
                .into_iter()
                .map(|v| v.map(|x| x * 100.0))
                .collect(),
            SlopeMethod::M3 => rolling_zscore(&average_change(ma, n), n),
            SlopeMethod::M4 => relative_change(ma, n),
            SlopeMethod::Ols => ols_slope(ma, n),
        }
    }

    /// M4 swaps the static threshold for a computed series.
    pub fn overrides_threshold(self) -> bool {
        matches!(self, SlopeMethod::M4)
    }
}

impl FromStr for SlopeMethod {
    type Err = BarcrossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M1" => Ok(SlopeMethod::M1),
            "M2" => Ok(SlopeMethod::M2),
            "M3" => Ok(SlopeMethod::M3),
            "M4" => Ok(SlopeMethod::M4),
            "OLS" => Ok(SlopeMethod::Ols),
            _ => Err(BarcrossError::unsupported("slope method", s.trim())),
        }
    }
}

impl fmt::Display for SlopeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SlopeMethod::M1 => "M1",
            SlopeMethod::M2 => "M2",
            SlopeMethod::M3 => "M3",
            SlopeMethod::M4 => "M4",
            SlopeMethod::Ols => "OLS",
        };
        write!(f, "{s}")
    }
}

pub fn average_change(ma: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    (0..ma.len())
        .map(|t| {
            if n == 0 || t < n {
                return None;
            }
            Some((ma[t]? - ma[t - n]?) / n as f64)
        })
        .collect()
}

/// Average change divided by the MA level one bar earlier.
pub fn relative_change(ma: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    average_change(ma, n)
        .into_iter()
        .enumerate()
        .map(|(t, slope)| {
            let base = ma[t.checked_sub(1)?]?;
            if base == 0.0 {
                return None;
            }
            Some(slope? / base)
        })
        .collect()
}

pub fn rolling_zscore(values: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|t| {
            if n < 2 || t + 1 < n {
                return None;
            }
            let window = values[t + 1 - n..=t]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()?;
            let mean = window.iter().sum::<f64>() / n as f64;
            let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            let sd = var.sqrt();
            if sd == 0.0 {
                return None;
            }
            Some((values[t]? - mean) / sd)
        })
        .collect()
}

pub fn ols_slope(ma: &[Option<f64>], n: usize) -> Vec<Option<f64>> {
    let x_mean = (n as f64 - 1.0) / 2.0;
    let denom: f64 = (0..n).map(|x| (x as f64 - x_mean).powi(2)).sum();

    (0..ma.len())
        .map(|t| {
            if n < 2 || t + 1 < n {
                return None;
            }
            let window = ma[t + 1 - n..=t]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()?;
            let y_mean = window.iter().sum::<f64>() / n as f64;
            let cov: f64 = window
                .iter()
                .enumerate()
                .map(|(x, y)| (x as f64 - x_mean) * (y - y_mean))
                .sum();
            Some(cov / denom)
        })
        .collect()
}

/// Expanding Q3 - Q1 over the defined values seen so far, linear interpolation.
pub fn expanding_iqr(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut sorted: Vec<f64> = Vec::with_capacity(values.len());
    values
        .iter()
        .map(|v| {
            if let Some(x) = *v {
                let idx = sorted.partition_point(|s| *s < x);
                sorted.insert(idx, x);
            }
            if sorted.is_empty() {
                None
            } else {
                Some(quantile(&sorted, 0.75) - quantile(&sorted, 0.25))
            }
        })
        .collect()
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Move every value one step later; position 0 becomes undefined.
pub fn shift_forward(values: &[Option<f64>]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(values.iter().copied())
        .take(values.len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn defined(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("m1".parse::<SlopeMethod>().unwrap(), SlopeMethod::M1);
        assert_eq!("M4".parse::<SlopeMethod>().unwrap(), SlopeMethod::M4);
        assert_eq!("ols".parse::<SlopeMethod>().unwrap(), SlopeMethod::Ols);
        assert!(matches!(
            "M5".parse::<SlopeMethod>(),
            Err(BarcrossError::UnsupportedConfig { .. })
        ));
    }

    #[test]
    fn only_m4_overrides_threshold() {
        assert!(SlopeMethod::M4.overrides_threshold());
        assert!(!SlopeMethod::M1.overrides_threshold());
        assert!(!SlopeMethod::M2.overrides_threshold());
    }

    #[test]
    fn m1_average_change() {
        let ma = defined(&[10.0, 12.0, 14.0, 20.0]);
        let beta = average_change(&ma, 2);
        assert_eq!(beta[0], None);
        assert_eq!(beta[1], None);
        assert_relative_eq!(beta[2].unwrap(), 2.0);
        assert_relative_eq!(beta[3].unwrap(), 4.0);
    }

    #[test]
    fn m1_skips_undefined_ma() {
        let ma = vec![None, Some(1.0), Some(2.0), Some(3.0)];
        let beta = average_change(&ma, 2);
        assert_eq!(beta[2], None);
        assert_relative_eq!(beta[3].unwrap(), 1.0);
    }

    #[test]
    fn m2_is_percentage_of_prior_level() {
        let ma = defined(&[10.0, 12.0, 14.0]);
        let beta = SlopeMethod::M2.estimate(&ma, 2);
        // (14 - 10) / 2 = 2, relative to 12 => 16.67%
        assert_relative_eq!(beta[2].unwrap(), 2.0 / 12.0 * 100.0, epsilon = 1e-12);
    }

    #[test]
    fn m4_is_unscaled_relative_change() {
        let ma = defined(&[10.0, 12.0, 14.0]);
        let beta = SlopeMethod::M4.estimate(&ma, 2);
        assert_relative_eq!(beta[2].unwrap(), 2.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn relative_change_undefined_on_zero_base() {
        let ma = defined(&[0.0, 0.0, 1.0]);
        assert_eq!(relative_change(&ma, 1)[2], None);
    }

    #[test]
    fn zscore_known_value() {
        let values = defined(&[1.0, 2.0, 3.0]);
        let z = rolling_zscore(&values, 3);
        // mean 2, sample sd 1
        assert_eq!(z[1], None);
        assert_relative_eq!(z[2].unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zscore_undefined_for_constant_window() {
        let values = defined(&[2.0, 2.0, 2.0]);
        assert_eq!(rolling_zscore(&values, 3)[2], None);
    }

    #[test]
    fn ols_recovers_linear_slope() {
        let ma = defined(&[1.0, 3.0, 5.0, 7.0, 9.0]);
        let beta = ols_slope(&ma, 4);
        assert_eq!(beta[2], None);
        assert_relative_eq!(beta[3].unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(beta[4].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn iqr_expands_over_history() {
        let values = vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let iqr = expanding_iqr(&values);
        assert_eq!(iqr[0], None);
        assert_relative_eq!(iqr[1].unwrap(), 0.0);
        // [1, 2]: q1 = 1.25, q3 = 1.75
        assert_relative_eq!(iqr[2].unwrap(), 0.5, epsilon = 1e-12);
        // [1..5]: q1 = 2, q3 = 4
        assert_relative_eq!(iqr[5].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn iqr_ignores_insertion_order() {
        let a = expanding_iqr(&defined(&[5.0, 1.0, 4.0, 2.0, 3.0]));
        assert_relative_eq!(a[4].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn shift_forward_moves_one_step() {
        let shifted = shift_forward(&defined(&[1.0, 2.0, 3.0]));
        assert_eq!(shifted, vec![None, Some(1.0), Some(2.0)]);
        assert!(shift_forward(&[]).is_empty());
    }
}
