//! Descriptive statistics over single-axis sample slices.
//!
//! All spreads are population statistics (divide by `n`), matching what the
//! classifier was trained against.

use crate::policy::{Computed, Degeneracy};

/// Arithmetic mean. NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. NaN for an empty slice.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Minimum, propagating NaN. NaN for an empty slice.
#[must_use]
pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(|a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) })
        .unwrap_or(f64::NAN)
}

/// Maximum, propagating NaN. NaN for an empty slice.
#[must_use]
pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(|a, b| if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) })
        .unwrap_or(f64::NAN)
}

/// Median (mean of the two middle values for even lengths). NaN for an
/// empty slice or when any value is NaN.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() || values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Root mean square. NaN for an empty slice.
#[must_use]
pub fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

/// Moving average over full windows of `window` values (`len - window + 1`
/// outputs). Empty when `window` is 0 or longer than `values`.
#[must_use]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Number of consecutive pairs whose sign bits differ.
///
/// Negative zero counts as negative.
#[must_use]
pub fn zero_crossings(values: &[f64]) -> usize {
    values
        .windows(2)
        .filter(|w| w[0].is_sign_negative() != w[1].is_sign_negative())
        .count()
}

// The mean of repeated values can round away from the value itself, leaving
// a spurious non-zero spread.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Pearson correlation coefficient of two equal-length series.
///
/// Degenerate when either series is constant, shorter than two samples, or
/// the coefficient is not finite.
#[must_use]
pub fn pearson(a: &[f64], b: &[f64]) -> Computed<f64> {
    let n = a.len().min(b.len());
    if n < 2 {
        return Computed::Degenerate(Degeneracy::TooShort { needed: 2, actual: n });
    }
    let (a, b) = (&a[..n], &b[..n]);
    let sa = std_dev(a);
    let sb = std_dev(b);
    if !sa.is_finite() || !sb.is_finite() {
        return Computed::Degenerate(Degeneracy::NonFinite);
    }
    if sa == 0.0 || sb == 0.0 || is_constant(a) || is_constant(b) {
        return Computed::Degenerate(Degeneracy::ZeroVariance);
    }

    let ma = mean(a);
    let mb = mean(b);
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - ma;
        let dy = y - mb;
        cov += dx * dy;
        va += dx * dx;
        vb += dy * dy;
    }
    let r = cov / (va * vb).sqrt();
    // Rounding can push |r| a hair past 1.
    Computed::finite(r).map(|r| r.clamp(-1.0, 1.0))
}
