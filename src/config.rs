//! Configuration for step detection and parameter search.
//!
//! This module provides [`DetectorConfig`], which centralizes the tunable
//! parameters of the step-detection pipeline, along with device presets, and
//! [`SearchConfig`] / [`ParameterSpace`] for the offline hyperparameter search.
//!
//! # Example
//!
//! ```
//! use motion_recognition::{DetectorConfig, DetectorParameters};
//!
//! // Use default configuration (50 Hz)
//! let config = DetectorConfig::default();
//!
//! // Use device preset and override one parameter
//! let wearable = DetectorConfig::wearable()
//!     .with_parameters(DetectorParameters::default().with_prominence(0.7));
//! assert!(wearable.validate().is_ok());
//! ```

use std::time::Duration;

use crate::error::{RecognitionError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tunable parameters of the step detector.
///
/// All values are positive. Distances are expressed in seconds and converted
/// to samples with the signal's sampling rate at detection time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorParameters {
    /// Adaptive threshold is `mean + threshold_multiplier * std` of the
    /// normalized series.
    pub threshold_multiplier: f64,

    /// Minimum time between two detected steps (seconds).
    pub min_step_distance_seconds: f64,

    /// Minimum peak prominence in normalized (z-score) units.
    pub prominence: f64,

    /// Lower bandpass cutoff (Hz).
    pub cutoff_low_hz: f64,

    /// Upper bandpass cutoff (Hz). Must stay below Nyquist.
    pub cutoff_high_hz: f64,
}

impl Default for DetectorParameters {
    fn default() -> Self {
        Self {
            threshold_multiplier: 0.2,
            min_step_distance_seconds: 0.3,
            prominence: 0.5,
            cutoff_low_hz: 0.5,
            cutoff_high_hz: 5.0,
        }
    }
}

impl DetectorParameters {
    /// Set the threshold multiplier.
    #[must_use]
    pub const fn with_threshold_multiplier(mut self, value: f64) -> Self {
        self.threshold_multiplier = value;
        self
    }

    /// Set the minimum step distance in seconds.
    #[must_use]
    pub const fn with_min_step_distance(mut self, seconds: f64) -> Self {
        self.min_step_distance_seconds = seconds;
        self
    }

    /// Set the minimum peak prominence.
    #[must_use]
    pub const fn with_prominence(mut self, value: f64) -> Self {
        self.prominence = value;
        self
    }

    /// Set both bandpass cutoffs.
    #[must_use]
    pub const fn with_cutoffs(mut self, low_hz: f64, high_hz: f64) -> Self {
        self.cutoff_low_hz = low_hz;
        self.cutoff_high_hz = high_hz;
        self
    }

    /// Minimum peak distance in whole samples for a given sampling rate.
    #[must_use]
    pub fn min_step_samples(&self, sampling_rate_hz: f64) -> usize {
        let samples = (self.min_step_distance_seconds * sampling_rate_hz).floor();
        if samples.is_finite() && samples > 0.0 {
            samples as usize
        } else {
            0
        }
    }

    /// Check the constraints that hold for every recording: all values
    /// positive and finite, `cutoff_low_hz < cutoff_high_hz`.
    ///
    /// # Errors
    ///
    /// [`RecognitionError::InvalidConfig`] naming the first offending value.
    pub fn validate_values(&self) -> Result<()> {
        let named = [
            ("threshold_multiplier", self.threshold_multiplier),
            ("min_step_distance_seconds", self.min_step_distance_seconds),
            ("prominence", self.prominence),
            ("cutoff_low_hz", self.cutoff_low_hz),
            ("cutoff_high_hz", self.cutoff_high_hz),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(RecognitionError::invalid_config(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.cutoff_low_hz >= self.cutoff_high_hz {
            return Err(RecognitionError::invalid_config(format!(
                "cutoff_low_hz ({}) must be below cutoff_high_hz ({})",
                self.cutoff_low_hz, self.cutoff_high_hz
            )));
        }
        Ok(())
    }

    /// Validate the parameters against a sampling rate.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is non-positive or non-finite, or if the
    /// cutoffs do not satisfy `0 < low < high < nyquist`.
    pub fn validate(&self, sampling_rate_hz: f64) -> Result<()> {
        self.validate_values()?;
        let nyquist = sampling_rate_hz / 2.0;
        if self.cutoff_high_hz >= nyquist {
            return Err(RecognitionError::invalid_config(format!(
                "cutoff_high_hz ({}) must be below nyquist ({nyquist})",
                self.cutoff_high_hz
            )));
        }
        Ok(())
    }
}

/// Configuration for the step detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Nominal sampling rate (Hz) used when building signals from raw samples.
    pub sampling_rate_hz: f64,

    /// Gravitational acceleration subtracted from the vertical (z) axis (m/s²).
    pub gravity: f64,

    /// Butterworth prototype order for the bandpass stage.
    pub filter_order: usize,

    /// Default detection parameters.
    pub parameters: DetectorParameters,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 50.0,
            gravity: 9.81,
            filter_order: 2,
            parameters: DetectorParameters::default(),
        }
    }
}

impl DetectorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for the wrist/ankle wearable recordings (33 Hz).
    #[must_use]
    pub fn wearable() -> Self {
        Self {
            sampling_rate_hz: 33.0,
            ..Self::default()
        }
    }

    /// Preset for phone IMUs (50 Hz).
    #[must_use]
    pub fn smartphone() -> Self {
        Self::default()
    }

    /// Set the sampling rate.
    #[must_use]
    pub const fn with_sampling_rate(mut self, hz: f64) -> Self {
        self.sampling_rate_hz = hz;
        self
    }

    /// Set the detection parameters.
    #[must_use]
    pub const fn with_parameters(mut self, parameters: DetectorParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Nyquist frequency for the nominal sampling rate.
    #[must_use]
    pub fn nyquist(&self) -> f64 {
        self.sampling_rate_hz / 2.0
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !self.sampling_rate_hz.is_finite() || self.sampling_rate_hz <= 0.0 {
            return Err(RecognitionError::invalid_config(
                "sampling_rate_hz must be positive",
            ));
        }
        if !self.gravity.is_finite() {
            return Err(RecognitionError::invalid_config("gravity must be finite"));
        }
        if self.filter_order == 0 {
            return Err(RecognitionError::invalid_config(
                "filter_order must be at least 1",
            ));
        }
        self.parameters.validate(self.sampling_rate_hz)
    }
}

/// Inclusive range a single parameter is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterRange {
    pub low: f64,
    pub high: f64,
}

impl ParameterRange {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low <= 0.0 {
            return Err(RecognitionError::invalid_config(format!(
                "{name} range must be positive and finite"
            )));
        }
        if self.low > self.high {
            return Err(RecognitionError::invalid_config(format!(
                "{name} range is inverted: [{}, {}]",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Search space explored by [`crate::ParameterSearch`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterSpace {
    pub threshold_multiplier: ParameterRange,
    pub min_step_distance_seconds: ParameterRange,
    pub prominence: ParameterRange,
    pub cutoff_low_hz: ParameterRange,
    pub cutoff_high_hz: ParameterRange,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self {
            threshold_multiplier: ParameterRange::new(0.1, 0.5),
            min_step_distance_seconds: ParameterRange::new(0.2, 0.5),
            prominence: ParameterRange::new(0.3, 1.0),
            cutoff_low_hz: ParameterRange::new(0.3, 1.0),
            cutoff_high_hz: ParameterRange::new(3.0, 6.0),
        }
    }
}

impl ParameterSpace {
    /// Whether every field of `params` lies inside its range.
    #[must_use]
    pub fn contains(&self, params: &DetectorParameters) -> bool {
        self.threshold_multiplier.contains(params.threshold_multiplier)
            && self
                .min_step_distance_seconds
                .contains(params.min_step_distance_seconds)
            && self.prominence.contains(params.prominence)
            && self.cutoff_low_hz.contains(params.cutoff_low_hz)
            && self.cutoff_high_hz.contains(params.cutoff_high_hz)
    }

    /// Validate the ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if a range is inverted or non-positive, or if the
    /// cutoff ranges overlap (a candidate could then have `low >= high`).
    pub fn validate(&self) -> Result<()> {
        self.threshold_multiplier.validate("threshold_multiplier")?;
        self.min_step_distance_seconds
            .validate("min_step_distance_seconds")?;
        self.prominence.validate("prominence")?;
        self.cutoff_low_hz.validate("cutoff_low_hz")?;
        self.cutoff_high_hz.validate("cutoff_high_hz")?;
        if self.cutoff_low_hz.high >= self.cutoff_high_hz.low {
            return Err(RecognitionError::invalid_config(
                "cutoff_low_hz range must lie entirely below cutoff_high_hz range",
            ));
        }
        Ok(())
    }
}

/// Configuration for the offline parameter search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    /// Ranges candidates are drawn from.
    pub space: ParameterSpace,

    /// Trial budget.
    pub n_trials: usize,

    /// Seed for the train/test partition and candidate sampling.
    pub seed: u64,

    /// Fraction of recordings held out for evaluation.
    pub test_fraction: f64,

    /// Optional wall-clock bound; trials not started before it elapses are skipped.
    pub time_budget: Option<Duration>,

    /// Evaluate [`DetectorParameters::default`] as the first trial.
    pub include_baseline: bool,

    /// Run trials on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            space: ParameterSpace::default(),
            n_trials: 100,
            seed: 42,
            test_fraction: 0.2,
            time_budget: None,
            include_baseline: true,
            parallel: true,
        }
    }
}

impl SearchConfig {
    /// Set the trial budget.
    #[must_use]
    pub const fn with_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    /// Set the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the wall-clock budget.
    #[must_use]
    pub const fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Enable/disable the baseline trial.
    #[must_use]
    pub const fn with_baseline(mut self, include: bool) -> Self {
        self.include_baseline = include;
        self
    }

    /// Enable/disable parallel trial evaluation.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the trial budget is zero, the test fraction is
    /// outside `[0, 1)`, or the parameter space is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.n_trials == 0 {
            return Err(RecognitionError::invalid_config(
                "n_trials must be at least 1",
            ));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(RecognitionError::invalid_config(
                "test_fraction must lie in [0, 1)",
            ));
        }
        self.space.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling_rate_hz, 50.0);
        assert_eq!(config.gravity, 9.81);
        assert_eq!(config.parameters.threshold_multiplier, 0.2);
        assert_eq!(config.parameters.cutoff_high_hz, 5.0);
    }

    #[test]
    fn test_wearable_preset() {
        let config = DetectorConfig::wearable();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling_rate_hz, 33.0);
        assert_eq!(config.nyquist(), 16.5);
    }

    #[test]
    fn test_validation() {
        let mut config = DetectorConfig::default();

        config.sampling_rate_hz = 0.0;
        assert!(config.validate().is_err());

        config.sampling_rate_hz = 8.0;
        // cutoff_high 5.0 is above nyquist 4.0
        assert!(config.validate().is_err());

        config.sampling_rate_hz = 50.0;
        config.parameters = config.parameters.with_cutoffs(3.0, 2.0);
        assert!(config.validate().is_err());

        config.parameters = DetectorParameters::default().with_prominence(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_value_checks_ignore_sampling_rate() {
        let params = DetectorParameters::default().with_cutoffs(0.5, 5.0);
        assert!(params.validate_values().is_ok());
        // fine in itself, but above the Nyquist of an 8 Hz recording
        assert!(params.validate(8.0).is_err());

        assert!(params.with_cutoffs(5.0, 0.5).validate_values().is_err());
        assert!(params.with_threshold_multiplier(-1.0).validate_values().is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let params = DetectorParameters::default()
            .with_threshold_multiplier(0.35)
            .with_min_step_distance(0.25)
            .with_cutoffs(0.4, 4.0);
        assert_eq!(params.threshold_multiplier, 0.35);
        assert_eq!(params.min_step_distance_seconds, 0.25);
        assert_eq!(params.cutoff_low_hz, 0.4);
        assert_eq!(params.cutoff_high_hz, 4.0);
    }

    #[test]
    fn test_min_step_samples_truncates() {
        let params = DetectorParameters::default();
        assert_eq!(params.min_step_samples(50.0), 15);
        assert_eq!(params.min_step_samples(33.0), 9);
        assert_eq!(params.with_min_step_distance(0.01).min_step_samples(33.0), 0);
    }

    #[test]
    fn test_parameter_space() {
        let space = ParameterSpace::default();
        assert!(space.validate().is_ok());
        assert!(space.contains(&DetectorParameters::default()));
        assert!(!space.contains(&DetectorParameters::default().with_prominence(2.0)));

        let mut overlapping = space;
        overlapping.cutoff_low_hz = ParameterRange::new(0.5, 4.0);
        assert!(overlapping.validate().is_err());
    }

    #[test]
    fn test_search_config_validation() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(SearchConfig::default().with_trials(0).validate().is_err());

        let config = SearchConfig {
            test_fraction: 1.0,
            ..SearchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
