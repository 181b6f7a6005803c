//! FFT magnitude spectra for per-axis frequency features.
//!
//! The spectrum is the unnormalised forward DFT of a real sequence, all `n`
//! bins (not just the one-sided half), so bin energies and the dominant index
//! line up with what the classifier was trained on.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{RecognitionError, Result};
use crate::policy::{Computed, Degeneracy};

/// Relative tolerance under which two bin magnitudes count as tied.
///
/// For real input `|X[k]| == |X[n - k]|` analytically; the tolerance keeps
/// rounding noise from moving the dominant bin into the mirrored half.
const TIE_TOLERANCE: f64 = 1e-9;

/// Compute the magnitude spectrum `|DFT(signal)|` of a real sequence.
///
/// Degenerate when the signal is empty or contains NaN/Inf.
///
/// # Errors
///
/// Returns an error if the FFT output length differs from the input length.
pub fn magnitude_spectrum(signal: &[f64]) -> Result<Computed<Vec<f64>>> {
    let n = signal.len();
    if n == 0 {
        return Ok(Computed::Degenerate(Degeneracy::EmptyInput));
    }
    if signal.iter().any(|v| !v.is_finite()) {
        return Ok(Computed::Degenerate(Degeneracy::NonFinite));
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    fft.process(&mut buffer);

    if buffer.len() != n {
        return Err(RecognitionError::fft(format!(
            "spectrum length {} does not match input length {n}",
            buffer.len()
        )));
    }

    Ok(Computed::Value(buffer.iter().map(|c| c.norm()).collect()))
}

/// Sum of squared magnitudes.
#[must_use]
pub fn spectral_energy(magnitudes: &[f64]) -> f64 {
    magnitudes.iter().map(|m| m * m).sum()
}

/// Index of the largest magnitude bin.
///
/// Near-ties resolve to the lowest index. NaN bins are ignored; returns 0
/// when there is no finite bin.
#[must_use]
pub fn dominant_bin(magnitudes: &[f64]) -> usize {
    let peak = magnitudes
        .iter()
        .copied()
        .filter(|m| !m.is_nan())
        .fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() {
        return 0;
    }
    let floor = peak - TIE_TOLERANCE * peak.abs();
    magnitudes.iter().position(|&m| m >= floor).unwrap_or(0)
}

/// First `K` magnitudes, zero-padded on the right.
#[must_use]
pub fn leading_bins<const K: usize>(magnitudes: &[f64]) -> [f64; K] {
    let mut out = [0.0; K];
    for (dst, &src) in out.iter_mut().zip(magnitudes) {
        *dst = src;
    }
    out
}
