//! Motion Recognition Library
//!
//! Feature extraction and step detection for wearable tri-axial accelerometers.
//!
//! The crate covers two signal-processing paths:
//!
//! - **Activity features**: each fixed-length window of `[x, y, z]` samples
//!   becomes a 46-value feature vector (statistical, frequency and magnitude
//!   blocks) for an external classifier.
//! - **Step counting**: gravity compensation, Butterworth bandpass,
//!   normalization and adaptive peak detection over a continuous recording,
//!   plus a seeded parameter search that tunes the detector against labeled
//!   recordings.
//!
//! # Quick Start
//!
//! ```
//! use motion_recognition::{extract_window_features, DetectorConfig, Signal, StepDetector};
//!
//! // One window of samples -> 46 features
//! let window: Vec<[f64; 3]> = (0..32)
//!     .map(|i| { let t = i as f64 * 0.1; [t.sin(), t.cos(), 9.81] })
//!     .collect();
//! let features = extract_window_features(&window)?;
//! assert_eq!(features.len(), motion_recognition::FULL_FEATURE_DIM);
//!
//! // A continuous recording -> step count
//! let fs = 50.0;
//! let z: Vec<f64> = (0..500)
//!     .map(|i| 9.81 + 3.0 * (2.0 * std::f64::consts::PI * 2.0 * i as f64 / fs).sin().max(0.0))
//!     .collect();
//! let signal = Signal::new(vec![0.0; 500], vec![0.0; 500], z, fs)?;
//! let result = StepDetector::new(DetectorConfig::default()).detect(&signal);
//! assert_eq!(result.step_count, result.peak_indices.len());
//! # Ok::<(), motion_recognition::RecognitionError>(())
//! ```
//!
//! # Feature Dimensions
//!
//! | Variant | Dimensions | Error policy |
//! |---------|------------|--------------|
//! | [`extract_features`] | 46 | Degenerate values zero-filled |
//! | [`extract_important_features`] | 12 | Strict |
//!
//! # Presets
//!
//! ```
//! use motion_recognition::DetectorConfig;
//!
//! let wearable = DetectorConfig::wearable();     // 33 Hz
//! let smartphone = DetectorConfig::smartphone(); // 50 Hz
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod config;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod math;
pub mod policy;
pub mod search;
pub mod signal;

// Re-exports for convenient access
pub use config::{DetectorConfig, DetectorParameters, ParameterRange, ParameterSpace, SearchConfig};
pub use dataset::{extract_step_count, split_train_test, LabeledRecording, RecordingSource};
pub use detector::{
    analyze_movement, analyze_movement_on_device, DetectionResult, StepDetector, ON_DEVICE_THRESHOLD,
};
pub use error::{RecognitionError, Result};
pub use evaluation::{evaluate, evaluate_recording, EvaluationReport, EvaluationSummary, FileResult};
pub use features::{
    extract_features, extract_important_features, extract_window_features, feature_names,
    important_feature_names, FeatureVector, FULL_FEATURE_DIM, IMPORTANT_FEATURE_DIM,
};
pub use policy::{Computed, Degeneracy};
pub use search::{CancellationToken, ParameterSearch, SearchOutcome, SearchResult, TrialOutcome};
pub use signal::{acceleration_norm, acceleration_rms, segment_windows, Signal};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
