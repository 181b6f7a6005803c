//! Continuous tri-axial recordings and the transforms applied before detection.

use ndarray::Array3;

use crate::error::{RecognitionError, Result};
use crate::policy::finite_or_zero;

/// A tri-axial accelerometer recording with its sampling rate.
///
/// All three channels have the same length.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signal {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub sampling_rate_hz: f64,
}

impl Signal {
    /// Build a signal from separate channels.
    ///
    /// # Errors
    ///
    /// * [`RecognitionError::LengthMismatch`] if the channels differ in length
    /// * [`RecognitionError::InvalidConfig`] if the sampling rate is not
    ///   positive and finite
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, sampling_rate_hz: f64) -> Result<Self> {
        let signal = Self {
            x,
            y,
            z,
            sampling_rate_hz,
        };
        signal.validate()?;
        Ok(signal)
    }

    /// Build a signal from interleaved `[x, y, z]` samples.
    ///
    /// # Errors
    ///
    /// [`RecognitionError::InvalidConfig`] if the sampling rate is not
    /// positive and finite.
    pub fn from_samples(samples: &[[f64; 3]], sampling_rate_hz: f64) -> Result<Self> {
        let [x, y, z] = crate::features::split_axes(samples);
        Self::new(x, y, z, sampling_rate_hz)
    }

    /// Check the invariants [`Signal::new`] enforces. Fields are public, so a
    /// signal built by hand may not hold them.
    ///
    /// # Errors
    ///
    /// As [`Signal::new`].
    pub fn validate(&self) -> Result<()> {
        if self.x.len() != self.y.len() || self.y.len() != self.z.len() {
            return Err(RecognitionError::length_mismatch(
                self.x.len(),
                self.y.len(),
                self.z.len(),
            ));
        }
        let fs = self.sampling_rate_hz;
        if !fs.is_finite() || fs <= 0.0 {
            return Err(RecognitionError::invalid_config(format!(
                "sampling rate must be positive, got {fs}"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Recording length in seconds. Zero when the sampling rate is not positive.
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        if self.sampling_rate_hz > 0.0 {
            self.len() as f64 / self.sampling_rate_hz
        } else {
            0.0
        }
    }

    /// Interleaved `[x, y, z]` samples, truncated to the shortest channel.
    #[must_use]
    pub fn samples(&self) -> Vec<[f64; 3]> {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| [x, y, z])
            .collect()
    }
}

/// Gravity-compensated RMS across axes: `sqrt((x² + y² + (z - g)²) / 3)`.
///
/// The z channel is taken as vertical. Samples that come out non-finite are 0.
#[must_use]
pub fn acceleration_rms(signal: &Signal, gravity: f64) -> Vec<f64> {
    signal
        .x
        .iter()
        .zip(&signal.y)
        .zip(&signal.z)
        .map(|((&x, &y), &z)| {
            let zc = z - gravity;
            finite_or_zero(((x * x + y * y + zc * zc) / 3.0).sqrt())
        })
        .collect()
}

/// Euclidean norm of each sample, without gravity compensation.
///
/// Output length is the shortest of the three channels.
#[must_use]
pub fn acceleration_norm(x: &[f64], y: &[f64], z: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(y)
        .zip(z)
        .map(|((&x, &y), &z)| (x * x + y * y + z * z).sqrt())
        .collect()
}

/// Cut samples into non-overlapping windows of `window_len`, shape
/// `(count, window_len, 3)`. A trailing partial window is dropped.
///
/// # Errors
///
/// [`RecognitionError::InvalidInput`] when `window_len` is 0.
pub fn segment_windows(samples: &[[f64; 3]], window_len: usize) -> Result<Array3<f64>> {
    if window_len == 0 {
        return Err(RecognitionError::invalid_input("window length must be at least 1"));
    }
    let count = samples.len() / window_len;
    Ok(Array3::from_shape_fn((count, window_len, 3), |(w, i, a)| {
        samples[w * window_len + i][a]
    }))
}
