//! Butterworth bandpass design and zero-phase filtering.
//!
//! Design follows the classic digital IIR route: analog Butterworth
//! prototype poles, low-pass to band-pass frequency transform, then the
//! bilinear transform with frequency prewarping. Everything is done in
//! zero/pole/gain form with complex arithmetic and only converted to
//! transfer-function coefficients at the end.
//!
//! [`TransferFunction::filtfilt`] runs the filter forward and backward over an
//! odd-extended copy of the signal, starting each pass from the steady-state
//! response to the edge value so no start-up transient leaks into the output.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{RecognitionError, Result};
use crate::policy::{Computed, Degeneracy};

/// Digital filter in transfer-function form, `a[0] == 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    /// Numerator coefficients.
    pub b: Vec<f64>,
    /// Denominator coefficients.
    pub a: Vec<f64>,
}

impl TransferFunction {
    /// Design a Butterworth bandpass filter.
    ///
    /// # Arguments
    ///
    /// * `order` - Prototype order (the band-pass has `2 * order` poles)
    /// * `low_hz`, `high_hz` - Passband edges in Hz
    /// * `sampling_rate_hz` - Sampling rate in Hz
    ///
    /// # Errors
    ///
    /// Returns an error unless `0 < low_hz < high_hz < sampling_rate_hz / 2`
    /// and `order >= 1`.
    pub fn butterworth_bandpass(
        order: usize,
        low_hz: f64,
        high_hz: f64,
        sampling_rate_hz: f64,
    ) -> Result<Self> {
        if order == 0 {
            return Err(RecognitionError::filter_design("order must be at least 1"));
        }
        let nyquist = sampling_rate_hz / 2.0;
        if !nyquist.is_finite() || nyquist <= 0.0 {
            return Err(RecognitionError::filter_design(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }
        let wn_low = low_hz / nyquist;
        let wn_high = high_hz / nyquist;
        if !(wn_low > 0.0 && wn_low < wn_high && wn_high < 1.0) {
            return Err(RecognitionError::filter_design(format!(
                "cutoffs must satisfy 0 < {low_hz} < {high_hz} < {nyquist} Hz"
            )));
        }

        // Prewarp for the bilinear transform at fs = 2 (normalised frequencies).
        let fs = 2.0;
        let warped_low = 2.0 * fs * (PI * wn_low / fs).tan();
        let warped_high = 2.0 * fs * (PI * wn_high / fs).tan();
        let bandwidth = warped_high - warped_low;
        let center = (warped_low * warped_high).sqrt();

        // Analog prototype: poles on the left half of the unit circle, no zeros, unit gain.
        let prototype: Vec<Complex64> = (0..order)
            .map(|i| {
                let m = 2.0 * i as f64 - (order as f64 - 1.0);
                -Complex64::new(0.0, PI * m / (2.0 * order as f64)).exp()
            })
            .collect();

        // Low-pass to band-pass: every pole splits into a pair, `order` zeros land at s = 0.
        let scaled: Vec<Complex64> = prototype.iter().map(|&p| p * (bandwidth / 2.0)).collect();
        let mut analog_poles = Vec::with_capacity(2 * order);
        for &p in &scaled {
            analog_poles.push(p + (p * p - center * center).sqrt());
        }
        for &p in &scaled {
            analog_poles.push(p - (p * p - center * center).sqrt());
        }
        let analog_gain = bandwidth.powi(order as i32);

        // Bilinear transform. Zeros at s = 0 map to z = 1; the degree surplus maps to z = -1.
        let fs2 = Complex64::new(2.0 * fs, 0.0);
        let digital_poles: Vec<Complex64> =
            analog_poles.iter().map(|&p| (fs2 + p) / (fs2 - p)).collect();
        let pole_product = analog_poles
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, &p| acc * (fs2 - p));
        let zero_product = fs2.powu(order as u32);
        let gain = analog_gain * (zero_product / pole_product).re;

        let mut digital_zeros = vec![Complex64::new(1.0, 0.0); order];
        digital_zeros.extend(std::iter::repeat(Complex64::new(-1.0, 0.0)).take(order));

        let b: Vec<f64> = poly(&digital_zeros).iter().map(|c| gain * c.re).collect();
        let a: Vec<f64> = poly(&digital_poles).iter().map(|c| c.re).collect();

        if b.iter().chain(&a).any(|c| !c.is_finite()) {
            return Err(RecognitionError::numerical_instability(
                "non-finite bandpass coefficients",
            ));
        }

        Ok(Self { b, a })
    }

    /// Number of taps, `max(len(a), len(b))`.
    #[must_use]
    pub fn taps(&self) -> usize {
        self.a.len().max(self.b.len())
    }

    /// Edge extension length used by [`Self::filtfilt`].
    #[must_use]
    pub fn pad_len(&self) -> usize {
        3 * self.taps()
    }

    /// Initial state for a step response in steady state (unit input).
    ///
    /// Solves `(I - A^T) zi = b[1..] - a[1..] * b[0]`, where `A` is the
    /// companion matrix of `a`.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is singular.
    pub fn steady_state(&self) -> Result<Vec<f64>> {
        let n = self.taps();
        if n < 2 {
            return Ok(Vec::new());
        }
        let a = padded(&self.a, n);
        let b = padded(&self.b, n);

        let m = n - 1;
        let system = DMatrix::from_fn(m, m, |i, j| {
            let mut v = if i == j { 1.0 } else { 0.0 };
            if j == 0 {
                v += a[i + 1];
            }
            if j == i + 1 {
                v -= 1.0;
            }
            v
        });
        let rhs = DVector::from_iterator(m, (1..n).map(|i| b[i] - a[i] * b[0]));

        system
            .lu()
            .solve(&rhs)
            .map(|zi| zi.iter().copied().collect())
            .ok_or_else(|| RecognitionError::filter_design("singular steady-state system"))
    }

    /// Single forward pass (direct form II transposed) from initial state `zi`.
    #[must_use]
    pub fn lfilter(&self, signal: &[f64], zi: &[f64]) -> Vec<f64> {
        let n = self.taps();
        let a = padded(&self.a, n);
        let b = padded(&self.b, n);
        let mut z = vec![0.0; n.saturating_sub(1)];
        for (dst, &src) in z.iter_mut().zip(zi) {
            *dst = src;
        }

        let mut out = Vec::with_capacity(signal.len());
        for &x in signal {
            let y = b[0] * x + z.first().copied().unwrap_or(0.0);
            let last = z.len().saturating_sub(1);
            for i in 0..last {
                z[i] = b[i + 1] * x + z[i + 1] - a[i + 1] * y;
            }
            if !z.is_empty() {
                z[last] = b[n - 1] * x - a[n - 1] * y;
            }
            out.push(y);
        }
        out
    }

    /// Zero-phase forward-backward filtering with odd edge extension.
    ///
    /// Degenerate when the signal is not longer than [`Self::pad_len`] or
    /// contains non-finite samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the steady-state system cannot be solved.
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Computed<Vec<f64>>> {
        let pad = self.pad_len();
        let n = signal.len();
        if n <= pad {
            return Ok(Computed::Degenerate(Degeneracy::TooShort {
                needed: pad,
                actual: n,
            }));
        }
        if signal.iter().any(|v| !v.is_finite()) {
            return Ok(Computed::Degenerate(Degeneracy::NonFinite));
        }

        let zi = self.steady_state()?;

        let first = signal[0];
        let last = signal[n - 1];
        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        extended.extend_from_slice(signal);
        extended.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));

        let start: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
        let mut forward = self.lfilter(&extended, &start);

        forward.reverse();
        let start: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
        let mut backward = self.lfilter(&forward, &start);
        backward.reverse();

        Ok(Computed::Value(backward[pad..pad + n].to_vec()))
    }
}

/// Monic polynomial coefficients (highest power first) with the given roots.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = coeffs.clone();
        next.push(Complex64::new(0.0, 0.0));
        for (i, &c) in coeffs.iter().enumerate() {
            next[i + 1] -= root * c;
        }
        coeffs = next;
    }
    coeffs
}

fn padded(coeffs: &[f64], n: usize) -> Vec<f64> {
    let mut out = coeffs.to_vec();
    out.resize(n, 0.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_second_order_bandpass_coefficients() {
        // 0.5-5 Hz at 50 Hz, i.e. normalised band [0.02, 0.2]
        let tf = TransferFunction::butterworth_bandpass(2, 0.5, 5.0, 50.0).unwrap();
        assert_eq!(tf.b.len(), 5);
        assert_eq!(tf.a.len(), 5);

        let expected_b = [0.056_448_462, 0.0, -0.112_896_925, 0.0, 0.056_448_462];
        let expected_a = [1.0, -3.159_463_302, 3.792_684_423, -2.082_573_317, 0.450_445_430];
        for (got, want) in tf.b.iter().zip(expected_b) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-8);
        }
        for (got, want) in tf.a.iter().zip(expected_a) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_bandpass_blocks_dc() {
        let tf = TransferFunction::butterworth_bandpass(2, 0.5, 5.0, 50.0).unwrap();
        let dc_gain: f64 = tf.b.iter().sum::<f64>() / tf.a.iter().sum::<f64>();
        assert_abs_diff_eq!(dc_gain, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_cutoffs() {
        assert!(TransferFunction::butterworth_bandpass(2, 5.0, 0.5, 50.0).is_err());
        assert!(TransferFunction::butterworth_bandpass(2, 0.5, 30.0, 50.0).is_err());
        assert!(TransferFunction::butterworth_bandpass(2, 0.0, 5.0, 50.0).is_err());
        assert!(TransferFunction::butterworth_bandpass(0, 0.5, 5.0, 50.0).is_err());
        assert!(TransferFunction::butterworth_bandpass(2, 0.5, 5.0, 0.0).is_err());
    }

    #[test]
    fn test_steady_state_holds_constant_input() {
        let tf = TransferFunction::butterworth_bandpass(2, 0.5, 5.0, 50.0).unwrap();
        let zi = tf.steady_state().unwrap();
        assert_eq!(zi.len(), 4);

        // Starting in steady state, a constant input produces the DC response (0) immediately.
        let level = 3.0;
        let start: Vec<f64> = zi.iter().map(|z| z * level).collect();
        let out = tf.lfilter(&[level; 40], &start);
        for y in out {
            assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_filtfilt_too_short_is_degenerate() {
        let tf = TransferFunction::butterworth_bandpass(2, 0.5, 5.0, 50.0).unwrap();
        assert_eq!(tf.pad_len(), 15);
        let out = tf.filtfilt(&[1.0; 15]).unwrap();
        assert_eq!(
            out,
            Computed::Degenerate(Degeneracy::TooShort { needed: 15, actual: 15 })
        );
        assert!(tf.filtfilt(&[1.0; 16]).unwrap().unwrap_or(vec![]).len() == 16);
    }

    #[test]
    fn test_filtfilt_passes_in_band_tone() {
        let fs = 50.0;
        let tf = TransferFunction::butterworth_bandpass(2, 0.5, 5.0, fs).unwrap();
        let signal: Vec<f64> = (0..500)
            .map(|i| (2.0 * PI * 2.0 * i as f64 / fs).sin() + 4.0)
            .collect();
        let out = tf.filtfilt(&signal).unwrap().unwrap_or(vec![]);
        assert_eq!(out.len(), signal.len());

        // Offset removed, 2 Hz tone kept with near-unit gain (check the middle).
        for (y, x) in out[100..400].iter().zip(&signal[100..400]) {
            assert_abs_diff_eq!(*y, x - 4.0, epsilon = 0.1);
        }
    }

    #[test]
    fn test_poly_roots() {
        let c = poly(&[Complex64::new(1.0, 0.0), Complex64::new(-1.0, 0.0)]);
        let re: Vec<f64> = c.iter().map(|c| c.re).collect();
        assert_eq!(re, vec![1.0, 0.0, -1.0]);
    }
}
