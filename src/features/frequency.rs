//! Frequency block: leading FFT magnitudes, spectral energy, dominant bin.
//!
//! Seven values per axis (`fft_0..fft_4`, `spectral_energy`,
//! `dominant_freq`), axes in x, y, z order. The dominant frequency is a bin
//! index, not Hz: windows carry no sampling rate.

use crate::error::Result;
use crate::math::fft::{dominant_bin, leading_bins, magnitude_spectrum, spectral_energy};
use crate::policy::{compute_or_default, finite_or_zero};

use super::Axes;

/// Leading magnitude bins kept per axis. Low-frequency bins, not the largest ones.
pub const FFT_COMPONENTS: usize = 5;

/// Values per axis.
pub const PER_AXIS_DIM: usize = FFT_COMPONENTS + 2;

/// Number of frequency features.
pub const FREQUENCY_DIM: usize = 3 * PER_AXIS_DIM;

/// Frequency features for one axis.
///
/// An empty axis or one containing NaN/Inf yields seven zeros.
///
/// # Errors
///
/// Propagates FFT errors.
pub fn axis_frequency_features(values: &[f64]) -> Result<[f64; PER_AXIS_DIM]> {
    let spectrum = magnitude_spectrum(values).map(|outcome| {
        outcome.map(|mags| {
            let mut out = [0.0; PER_AXIS_DIM];
            out[..FFT_COMPONENTS].copy_from_slice(&leading_bins::<FFT_COMPONENTS>(&mags));
            out[FFT_COMPONENTS] = finite_or_zero(spectral_energy(&mags));
            out[FFT_COMPONENTS + 1] = dominant_bin(&mags) as f64;
            out
        })
    });
    compute_or_default(spectrum, [0.0; PER_AXIS_DIM], "frequency")
}

/// Compute the frequency block for one window. Each axis is independent:
/// a degenerate axis zero-fills only its own seven values.
///
/// # Errors
///
/// Propagates FFT errors.
pub fn frequency_features(axes: &Axes) -> Result<[f64; FREQUENCY_DIM]> {
    let mut out = [0.0; FREQUENCY_DIM];
    for (axis, values) in axes.iter().enumerate() {
        let block = axis_frequency_features(values)?;
        out[axis * PER_AXIS_DIM..(axis + 1) * PER_AXIS_DIM].copy_from_slice(&block);
    }
    Ok(out)
}
