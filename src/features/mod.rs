//! Windowed feature extraction for activity classification.
//!
//! A window is a short run of tri-axial samples `[x, y, z]`. The full
//! extractor maps it to a fixed 46-value [`FeatureVector`]:
//!
//! | Index | Block | Dims |
//! |-------|-------|------|
//! | 0:21 | [`statistical`] | 21 |
//! | 21:42 | [`frequency`] | 21 |
//! | 42:46 | [`magnitude`] | 4 |
//!
//! The output length never depends on the data. Degenerate input (constant
//! axes, NaN, Inf, empty windows) produces zeros in the affected slots so
//! batches always stack into a rectangular matrix.
//!
//! The reduced [`important`] variant (max/min/median/mean per axis) is a
//! separate feature set with strict input checking.

pub mod batch;
pub mod frequency;
pub mod important;
pub mod magnitude;
pub mod statistical;

pub use batch::{extract_features, extract_window_rows};
pub use frequency::FREQUENCY_DIM;
pub use important::{extract_important_features, important_feature_names, IMPORTANT_FEATURE_DIM};
pub use magnitude::MAGNITUDE_DIM;
pub use statistical::STATISTICAL_DIM;

use crate::error::Result;

/// Full feature vector length.
pub const FULL_FEATURE_DIM: usize = STATISTICAL_DIM + FREQUENCY_DIM + MAGNITUDE_DIM;

/// One window's features, `statistical ++ frequency ++ magnitude`.
pub type FeatureVector = [f64; FULL_FEATURE_DIM];

/// Column-major view of a window: `[x values, y values, z values]`.
pub type Axes = [Vec<f64>; 3];

/// Split `[x, y, z]` samples into per-axis series.
#[must_use]
pub fn split_axes(window: &[[f64; 3]]) -> Axes {
    let mut axes: Axes = [
        Vec::with_capacity(window.len()),
        Vec::with_capacity(window.len()),
        Vec::with_capacity(window.len()),
    ];
    for sample in window {
        for (axis, &v) in axes.iter_mut().zip(sample) {
            axis.push(v);
        }
    }
    axes
}

/// Extract the full feature vector from one window.
///
/// # Errors
///
/// Only internal kernel faults (an FFT returning the wrong length) surface
/// as errors; numeric degeneracies are zero-filled.
pub fn extract_window_features(window: &[[f64; 3]]) -> Result<FeatureVector> {
    let axes = split_axes(window);

    let mut out = [0.0; FULL_FEATURE_DIM];
    out[..STATISTICAL_DIM].copy_from_slice(&statistical::statistical_features(&axes));
    out[STATISTICAL_DIM..STATISTICAL_DIM + FREQUENCY_DIM]
        .copy_from_slice(&frequency::frequency_features(&axes)?);
    out[STATISTICAL_DIM + FREQUENCY_DIM..].copy_from_slice(&magnitude::magnitude_features(&axes));
    Ok(out)
}

#[rustfmt::skip]
const FEATURE_NAMES: [&str; FULL_FEATURE_DIM] = [
    "mean_x", "mean_y", "mean_z",
    "std_x", "std_y", "std_z",
    "min_x", "min_y", "min_z",
    "max_x", "max_y", "max_z",
    "corr_xy", "corr_yz", "corr_xz",
    "zero_cross_x", "zero_cross_y", "zero_cross_z",
    "rms_x", "rms_y", "rms_z",
    "fft_x_0", "fft_x_1", "fft_x_2", "fft_x_3", "fft_x_4", "spectral_energy_x", "dominant_freq_x",
    "fft_y_0", "fft_y_1", "fft_y_2", "fft_y_3", "fft_y_4", "spectral_energy_y", "dominant_freq_y",
    "fft_z_0", "fft_z_1", "fft_z_2", "fft_z_3", "fft_z_4", "spectral_energy_z", "dominant_freq_z",
    "sma_x", "sma_y", "sma_z", "svm",
];

/// Column names of [`FeatureVector`], in output order.
#[must_use]
pub const fn feature_names() -> [&'static str; FULL_FEATURE_DIM] {
    FEATURE_NAMES
}
