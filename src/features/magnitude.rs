//! Magnitude block: signal magnitude area per axis and mean signal vector magnitude.

use crate::policy::{finite_or_zero, value_or_default, Computed, Degeneracy};

use super::Axes;

/// Number of magnitude features.
pub const MAGNITUDE_DIM: usize = 4;

/// `[sma_x, sma_y, sma_z, svm]`.
///
/// SMA is the sum of absolute values per axis. SVM is the mean over samples
/// of the per-sample Euclidean norm; samples whose squared norm is not finite
/// contribute 0. An empty window yields all zeros.
#[must_use]
pub fn magnitude_features(axes: &Axes) -> [f64; MAGNITUDE_DIM] {
    value_or_default(compute(axes), [0.0; MAGNITUDE_DIM], "magnitude")
}

fn compute(axes: &Axes) -> Computed<[f64; MAGNITUDE_DIM]> {
    let n = axes[0].len();
    if n == 0 {
        return Computed::Degenerate(Degeneracy::EmptyInput);
    }

    let mut out = [0.0; MAGNITUDE_DIM];
    for (axis, values) in axes.iter().enumerate() {
        out[axis] = finite_or_zero(values.iter().map(|v| v.abs()).sum());
    }

    let svm = (0..n)
        .map(|i| {
            let squared = axes[0][i] * axes[0][i] + axes[1][i] * axes[1][i] + axes[2][i] * axes[2][i];
            finite_or_zero(squared).sqrt()
        })
        .sum::<f64>()
        / n as f64;
    out[3] = finite_or_zero(svm);

    Computed::Value(out)
}
