//! Error types for movement recognition operations.
//!
//! Only structural faults surface here. Degenerate sensor data (constant
//! axes, NaN samples, windows too short for a transform) is absorbed by the
//! compute-or-default policy in [`crate::policy`] and never becomes an `Err`.

use thiserror::Error;

/// Main error type for movement recognition operations.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Batch input has the wrong dimensionality or axis width.
    #[error("Invalid shape: expected {expected}, got {actual:?}")]
    InvalidShape {
        expected: &'static str,
        actual: Vec<usize>,
    },

    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Signal channels have different lengths.
    #[error("Channel length mismatch: x={x}, y={y}, z={z}")]
    LengthMismatch { x: usize, y: usize, z: usize },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// FFT computation failed.
    #[error("FFT error: {0}")]
    FftError(String),

    /// Filter design or application failed.
    #[error("Filter design error: {0}")]
    FilterDesign(String),

    /// Numerical computation resulted in NaN or Inf where it must not.
    #[error("Numerical instability: {context}")]
    NumericalInstability { context: String },

    /// A search was cancelled before any trial completed.
    #[error("Search cancelled before any trial completed")]
    Cancelled,
}

/// Result type alias for movement recognition operations.
pub type Result<T> = std::result::Result<T, RecognitionError>;

impl RecognitionError {
    /// Create an invalid shape error.
    #[must_use]
    pub fn invalid_shape(expected: &'static str, actual: &[usize]) -> Self {
        Self::InvalidShape {
            expected,
            actual: actual.to_vec(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a channel length mismatch error.
    #[must_use]
    pub const fn length_mismatch(x: usize, y: usize, z: usize) -> Self {
        Self::LengthMismatch { x, y, z }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an FFT error.
    #[must_use]
    pub fn fft(msg: impl Into<String>) -> Self {
        Self::FftError(msg.into())
    }

    /// Create a filter design error.
    #[must_use]
    pub fn filter_design(msg: impl Into<String>) -> Self {
        Self::FilterDesign(msg.into())
    }

    /// Create a numerical instability error.
    #[must_use]
    pub fn numerical_instability(context: impl Into<String>) -> Self {
        Self::NumericalInstability {
            context: context.into(),
        }
    }
}
