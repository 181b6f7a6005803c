//! Offline step counting over a complete recording.
//!
//! The pipeline is a pure transform of one [`Signal`]:
//!
//! 1. Gravity-compensated RMS across axes ([`acceleration_rms`])
//! 2. Zero-phase Butterworth bandpass
//! 3. Z-score normalization
//! 4. Peak detection against an adaptive threshold
//!
//! Numeric degeneracies (constant input, recordings too short to filter)
//! produce zero steps, never errors.
//!
//! # Example
//!
//! ```
//! use motion_recognition::{DetectorConfig, Signal, StepDetector};
//!
//! let fs = 50.0;
//! let z: Vec<f64> = (0..500)
//!     .map(|i| 9.81 + 3.0 * (2.0 * std::f64::consts::PI * 2.0 * i as f64 / fs).sin().max(0.0))
//!     .collect();
//! let signal = Signal::new(vec![0.0; 500], vec![0.0; 500], z, fs)?;
//!
//! let detector = StepDetector::new(DetectorConfig::default());
//! let result = detector.detect(&signal);
//! assert!((19..=21).contains(&result.step_count));
//! # Ok::<(), motion_recognition::RecognitionError>(())
//! ```

use tracing::{debug, warn};

use crate::config::{DetectorConfig, DetectorParameters};
use crate::error::Result;
use crate::math::filter::TransferFunction;
use crate::math::peaks::{find_peaks, PeakCriteria};
use crate::math::stats;
use crate::policy::{Computed, Degeneracy};
use crate::signal::{acceleration_norm, acceleration_rms, Signal};

/// Channels shorter than this skip the pipeline entirely.
pub const MIN_SIGNAL_LEN: usize = 3;

/// Fixed norm threshold (m/s²) of the on-device detector.
pub const ON_DEVICE_THRESHOLD: f64 = 10.0;

/// Smoothing window of the on-device detector.
const ON_DEVICE_SMOOTHING: usize = 3;

/// Relative floor on the filtered spread below which the series is treated
/// as constant.
const DEGENERATE_STD_RATIO: f64 = 1e-9;

/// Outcome of one detection run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectionResult {
    /// Number of detected steps, always `peak_indices.len()`.
    pub step_count: usize,
    /// Strictly increasing sample indices of the detected steps.
    pub peak_indices: Vec<usize>,
    /// Unfiltered per-sample magnitude: gravity-compensated RMS for
    /// [`StepDetector`], the plain norm for [`analyze_movement_on_device`].
    pub magnitude_series: Vec<f64>,
}

impl DetectionResult {
    /// The `(0, [], [])` result.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_peaks(peak_indices: Vec<usize>, magnitude_series: Vec<f64>) -> Self {
        Self {
            step_count: peak_indices.len(),
            peak_indices,
            magnitude_series,
        }
    }
}

/// Stateless step detector.
#[derive(Debug, Clone, Default)]
pub struct StepDetector {
    config: DetectorConfig,
}

impl StepDetector {
    /// Create a detector. The sampling rate used at detection time is the
    /// signal's own; the configured rate only serves as a default elsewhere.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect steps with the configured parameters.
    #[must_use]
    pub fn detect(&self, signal: &Signal) -> DetectionResult {
        self.detect_with(signal, &self.config.parameters)
    }

    /// Detect steps with explicit parameters.
    ///
    /// Invalid parameters or a malformed signal produce a zero-step result
    /// (logged at `warn`). Use [`Self::try_detect_with`] to observe them.
    #[must_use]
    pub fn detect_with(&self, signal: &Signal, params: &DetectorParameters) -> DetectionResult {
        match self.try_detect_with(signal, params) {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "step detection rejected input");
                if shortest_channel(signal) < MIN_SIGNAL_LEN {
                    DetectionResult::empty()
                } else {
                    DetectionResult::from_peaks(
                        Vec::new(),
                        acceleration_rms(signal, self.config.gravity),
                    )
                }
            }
        }
    }

    /// Step count for scoring a labeled recording.
    ///
    /// Parameters the recording cannot support (an upper cutoff at or above
    /// its Nyquist frequency, a filter that cannot be designed for its rate)
    /// count as 0 steps.
    ///
    /// # Errors
    ///
    /// Only when the signal itself is malformed, see [`Signal::validate`].
    pub fn count_steps(&self, signal: &Signal, params: &DetectorParameters) -> Result<usize> {
        signal.validate()?;
        match self.try_detect_with(signal, params) {
            Ok(result) => Ok(result.step_count),
            Err(e) => {
                debug!(error = %e, "parameters unsupported for recording, counting 0 steps");
                Ok(0)
            }
        }
    }

    /// Detect steps, reporting structural problems as errors.
    ///
    /// # Errors
    ///
    /// * `LengthMismatch` if the channels differ in length
    /// * `InvalidConfig` for a bad sampling rate, or if `params` are invalid for the
    ///   signal's sampling rate
    /// * filter design errors
    pub fn try_detect_with(
        &self,
        signal: &Signal,
        params: &DetectorParameters,
    ) -> Result<DetectionResult> {
        if shortest_channel(signal) < MIN_SIGNAL_LEN {
            debug!(samples = shortest_channel(signal), "signal too short for analysis");
            return Ok(DetectionResult::empty());
        }
        signal.validate()?;
        let fs = signal.sampling_rate_hz;
        params.validate(fs)?;

        let rms = acceleration_rms(signal, self.config.gravity);
        let filter = TransferFunction::butterworth_bandpass(
            self.config.filter_order,
            params.cutoff_low_hz,
            params.cutoff_high_hz,
            fs,
        )?;

        let peaks = match locate_steps(&filter, &rms, fs, params)? {
            Computed::Value(peaks) => peaks,
            Computed::Degenerate(reason) => {
                warn!(%reason, samples = rms.len(), "degenerate signal, no steps detected");
                Vec::new()
            }
        };

        debug!(
            steps = peaks.len(),
            samples = rms.len(),
            sampling_rate_hz = fs,
            "step detection complete"
        );
        Ok(DetectionResult::from_peaks(peaks, rms))
    }
}

/// Filter, normalize and peak-pick an RMS series.
fn locate_steps(
    filter: &TransferFunction,
    rms: &[f64],
    sampling_rate_hz: f64,
    params: &DetectorParameters,
) -> Result<Computed<Vec<usize>>> {
    let filtered = match filter.filtfilt(rms)? {
        Computed::Value(v) => v,
        Computed::Degenerate(reason) => return Ok(Computed::Degenerate(reason)),
    };

    let Computed::Value(normalized) = z_score(&filtered, rms) else {
        return Ok(Computed::Degenerate(Degeneracy::ZeroVariance));
    };

    let threshold =
        stats::mean(&normalized) + params.threshold_multiplier * stats::std_dev(&normalized);
    let criteria = PeakCriteria {
        height: threshold,
        distance: params.min_step_samples(sampling_rate_hz),
        prominence: params.prominence,
    };
    Ok(find_peaks(&normalized, &criteria))
}

/// Z-score `filtered`, degenerate when its spread is negligible relative to
/// the level of the unfiltered series.
fn z_score(filtered: &[f64], rms: &[f64]) -> Computed<Vec<f64>> {
    let mean = stats::mean(filtered);
    let std = stats::std_dev(filtered);
    let level = rms.iter().map(|v| v.abs()).sum::<f64>() / rms.len().max(1) as f64;
    if !std.is_finite() || std < DEGENERATE_STD_RATIO * (1.0 + level) {
        return Computed::Degenerate(Degeneracy::ZeroVariance);
    }
    Computed::Value(filtered.iter().map(|v| (v - mean) / std).collect())
}

fn shortest_channel(signal: &Signal) -> usize {
    signal.x.len().min(signal.y.len()).min(signal.z.len())
}

/// Count steps in raw channels with the default parameters.
///
/// Any channel shorter than three samples yields [`DetectionResult::empty`].
///
/// # Errors
///
/// * `LengthMismatch` if the channels differ in length
/// * `InvalidConfig` for a non-positive sampling rate or
///   one whose Nyquist frequency is below the default upper cutoff
pub fn analyze_movement(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    sampling_rate_hz: f64,
) -> Result<DetectionResult> {
    if x.len().min(y.len()).min(z.len()) < MIN_SIGNAL_LEN {
        return Ok(DetectionResult::empty());
    }
    let signal = Signal::new(x.to_vec(), y.to_vec(), z.to_vec(), sampling_rate_hz)?;
    let detector = StepDetector::new(DetectorConfig::default().with_sampling_rate(sampling_rate_hz));
    detector.try_detect_with(&signal, &detector.config.parameters)
}

/// Lightweight detector for phones and wearables: no filtering, no sampling
/// rate.
///
/// The raw acceleration norm is smoothed with a 3-sample moving average, and
/// every strict local maximum of the smoothed series above `threshold` is a
/// step. Peak indices refer to the unsmoothed series, and
/// `magnitude_series` is the acceleration norm. Any channel shorter than three
/// samples yields [`DetectionResult::empty`].
///
/// # Errors
///
/// `LengthMismatch` if the channels differ in length.
pub fn analyze_movement_on_device(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    threshold: f64,
) -> Result<DetectionResult> {
    if x.len().min(y.len()).min(z.len()) < MIN_SIGNAL_LEN {
        return Ok(DetectionResult::empty());
    }
    if x.len() != y.len() || y.len() != z.len() {
        return Err(crate::error::RecognitionError::length_mismatch(
            x.len(),
            y.len(),
            z.len(),
        ));
    }

    let norm = acceleration_norm(x, y, z);
    let smoothed = stats::moving_average(&norm, ON_DEVICE_SMOOTHING);
    let peaks: Vec<usize> = smoothed
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > threshold && w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1 + ON_DEVICE_SMOOTHING / 2)
        .collect();

    debug!(steps = peaks.len(), samples = norm.len(), threshold, "on-device detection complete");
    Ok(DetectionResult::from_peaks(peaks, norm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognitionError;
    use std::f64::consts::PI;

    fn tone(fs: f64, seconds: f64, step_hz: f64, amplitude: f64) -> Signal {
        let n = (fs * seconds) as usize;
        let z = (0..n)
            .map(|i| 9.81 + amplitude * (2.0 * PI * step_hz * i as f64 / fs).sin())
            .collect();
        Signal::new(vec![0.0; n], vec![0.0; n], z, fs).unwrap()
    }

    fn bumps(fs: f64, seconds: f64, step_hz: f64) -> Signal {
        let n = (fs * seconds) as usize;
        let z = (0..n)
            .map(|i| 9.81 + 3.0 * (2.0 * PI * step_hz * i as f64 / fs).sin().max(0.0))
            .collect();
        Signal::new(vec![0.0; n], vec![0.0; n], z, fs).unwrap()
    }

    #[test]
    fn test_clean_two_hertz_tone() {
        let signal = tone(50.0, 3.0, 2.0, 2.0);
        let result = StepDetector::default().detect(&signal);
        assert!((5..=7).contains(&result.step_count), "got {}", result.step_count);
        assert_eq!(result.magnitude_series.len(), 150);
        assert_eq!(result.step_count, result.peak_indices.len());
    }

    #[test]
    fn test_bump_train() {
        let result = StepDetector::default().detect(&bumps(50.0, 10.0, 2.0));
        assert!((19..=21).contains(&result.step_count), "got {}", result.step_count);
        assert!(result.peak_indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_uses_signal_sampling_rate() {
        let result = StepDetector::new(DetectorConfig::default()).detect(&bumps(33.0, 10.0, 1.8));
        assert!((17..=19).contains(&result.step_count), "got {}", result.step_count);
    }

    #[test]
    fn test_constant_signal_has_no_steps() {
        let signal = Signal::new(vec![0.0; 200], vec![0.0; 200], vec![9.81; 200], 50.0).unwrap();
        let result = StepDetector::default().detect(&signal);
        assert_eq!(result.step_count, 0);
        assert_eq!(result.magnitude_series.len(), 200);

        let offset = Signal::new(vec![1.5; 200], vec![-0.5; 200], vec![3.0; 200], 50.0).unwrap();
        assert_eq!(StepDetector::default().detect(&offset).step_count, 0);
    }

    #[test]
    fn test_short_signals() {
        let two = Signal::new(vec![0.0; 2], vec![0.0; 2], vec![0.0; 2], 50.0).unwrap();
        assert_eq!(StepDetector::default().detect(&two), DetectionResult::empty());

        // Long enough to analyze, too short to filter
        let ten = tone(50.0, 0.2, 2.0, 2.0);
        let result = StepDetector::default().detect(&ten);
        assert_eq!(result.step_count, 0);
        assert_eq!(result.magnitude_series.len(), 10);
    }

    #[test]
    fn test_invalid_parameters() {
        let signal = tone(50.0, 3.0, 2.0, 2.0);
        let detector = StepDetector::default();
        let bad = DetectorParameters::default().with_cutoffs(0.5, 30.0);

        assert!(matches!(
            detector.try_detect_with(&signal, &bad),
            Err(RecognitionError::InvalidConfig(_))
        ));
        let lenient = detector.detect_with(&signal, &bad);
        assert_eq!(lenient.step_count, 0);
        assert_eq!(lenient.magnitude_series.len(), 150);
    }

    #[test]
    fn test_mismatched_channels() {
        let signal = Signal {
            x: vec![0.0; 100],
            y: vec![0.0; 100],
            z: vec![0.0; 99],
            sampling_rate_hz: 50.0,
        };
        let detector = StepDetector::default();
        assert!(matches!(
            detector.try_detect_with(&signal, &DetectorParameters::default()),
            Err(RecognitionError::LengthMismatch { .. })
        ));
        assert!(detector
            .count_steps(&signal, &DetectorParameters::default())
            .is_err());
    }

    #[test]
    fn test_count_steps_separates_signal_faults_from_unsupported_parameters() {
        let detector = StepDetector::default();
        let params = DetectorParameters::default();

        let walk = bumps(50.0, 10.0, 2.0);
        assert_eq!(
            detector.count_steps(&walk, &params).unwrap(),
            detector.detect_with(&walk, &params).step_count
        );

        // Nyquist of 4 Hz sits under the 5 Hz upper cutoff
        let slow = bumps(8.0, 10.0, 1.0);
        assert_eq!(detector.count_steps(&slow, &params).unwrap(), 0);

        let mut no_rate = bumps(50.0, 2.0, 2.0);
        no_rate.sampling_rate_hz = 0.0;
        assert!(matches!(
            detector.count_steps(&no_rate, &params),
            Err(RecognitionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_samples_do_not_abort() {
        let mut signal = bumps(50.0, 10.0, 2.0);
        signal.z[100] = f64::NAN;
        signal.x[200] = f64::INFINITY;
        let result = StepDetector::default().detect(&signal);
        assert_eq!(result.magnitude_series[100], 0.0);
        assert_eq!(result.magnitude_series[200], 0.0);
        assert!(result.step_count >= 17);
    }

    #[test]
    fn test_analyze_movement() {
        let signal = bumps(50.0, 10.0, 2.0);
        let result = analyze_movement(&signal.x, &signal.y, &signal.z, 50.0).unwrap();
        assert!((19..=21).contains(&result.step_count));

        let short = analyze_movement(&[0.0; 2], &[0.0; 10], &[0.0; 10], 50.0).unwrap();
        assert_eq!(short, DetectionResult::empty());

        assert!(analyze_movement(&[0.0; 10], &[0.0; 10], &[0.0; 9], 50.0).is_err());
    }

    #[test]
    fn test_stricter_prominence_finds_fewer_steps() {
        let signal = bumps(50.0, 10.0, 2.0);
        let detector = StepDetector::default();
        let loose = detector.detect_with(&signal, &DetectorParameters::default());
        let strict = detector.detect_with(
            &signal,
            &DetectorParameters::default().with_prominence(100.0),
        );
        assert!(strict.step_count <= loose.step_count);
        assert_eq!(strict.step_count, 0);
    }

    #[test]
    fn test_on_device_detector() {
        let fs = 50.0;
        let n = 500;
        let x: Vec<f64> = (0..n).map(|i| 0.15 * (2.0 * PI * i as f64 / fs).sin()).collect();
        let signal = bumps(fs, 10.0, 2.0);
        let result =
            analyze_movement_on_device(&x, &signal.y, &signal.z, ON_DEVICE_THRESHOLD).unwrap();

        assert_eq!(result.step_count, 20);
        assert_eq!(&result.peak_indices[..3], &[6, 31, 56]);
        assert_eq!(result.magnitude_series, acceleration_norm(&x, &signal.y, &signal.z));
    }

    #[test]
    fn test_on_device_detector_edge_cases() {
        // Standing still: norm sits under the threshold
        let still = vec![9.81; 100];
        let zeros = vec![0.0; 100];
        let result = analyze_movement_on_device(&zeros, &zeros, &still, ON_DEVICE_THRESHOLD).unwrap();
        assert_eq!(result.step_count, 0);
        assert_eq!(result.magnitude_series.len(), 100);

        assert_eq!(
            analyze_movement_on_device(&[0.0; 2], &[0.0; 2], &[20.0; 2], ON_DEVICE_THRESHOLD).unwrap(),
            DetectionResult::empty()
        );
        assert!(matches!(
            analyze_movement_on_device(&[0.0; 5], &[0.0; 4], &[0.0; 5], ON_DEVICE_THRESHOLD),
            Err(RecognitionError::LengthMismatch { x: 5, y: 4, z: 5 })
        ));
    }
}
