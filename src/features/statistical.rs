//! Statistical block: per-axis moments, extrema, correlation, zero crossings, RMS.
//!
//! | Index | Feature | Dims |
//! |-------|---------|------|
//! | 0:3 | mean | 3 |
//! | 3:6 | std | 3 |
//! | 6:9 | min | 3 |
//! | 9:12 | max | 3 |
//! | 12:15 | corr xy, yz, xz | 3 |
//! | 15:18 | zero crossings | 3 |
//! | 18:21 | rms | 3 |

use crate::math::stats;
use crate::policy::{sanitize, value_or_default, Computed};

use super::Axes;

/// Number of statistical features.
pub const STATISTICAL_DIM: usize = 21;

/// Axis pairs for correlation features, in output order.
pub const CORRELATION_PAIRS: [(usize, usize); 3] = [(0, 1), (1, 2), (0, 2)];

/// Compute the statistical block for one window.
///
/// Individual non-finite values are zeroed; a correlation pair with a
/// constant axis is exactly 0.0.
#[must_use]
pub fn statistical_features(axes: &Axes) -> [f64; STATISTICAL_DIM] {
    let mut out = [0.0; STATISTICAL_DIM];

    for (axis, values) in axes.iter().enumerate() {
        out[axis] = stats::mean(values);
        out[3 + axis] = stats::std_dev(values);
        out[6 + axis] = stats::min(values);
        out[9 + axis] = stats::max(values);
    }

    for (slot, &(i, j)) in CORRELATION_PAIRS.iter().enumerate() {
        out[12 + slot] = value_or_default(axis_correlation(axes, i, j), 0.0, "correlation");
    }

    for (axis, values) in axes.iter().enumerate() {
        out[15 + axis] = stats::zero_crossings(values) as f64;
        out[18 + axis] = stats::rms(values);
    }

    sanitize(&mut out);
    out
}

/// Correlation between two axes as a [`Computed`] value, for callers that
/// want to distinguish "no correlation" from "undefined".
#[must_use]
pub fn axis_correlation(axes: &Axes, i: usize, j: usize) -> Computed<f64> {
    stats::pearson(&axes[i], &axes[j])
}
