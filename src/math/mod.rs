//! Numeric kernels for feature extraction and step detection.
//!
//! This module provides:
//! - [`stats`]: per-axis descriptive statistics and correlation
//! - [`fft`]: FFT magnitude spectra
//! - [`filter`]: Butterworth bandpass design and zero-phase filtering
//! - [`peaks`]: peak finding with height/distance/prominence criteria

pub mod fft;
pub mod filter;
pub mod peaks;
pub mod stats;

pub use fft::{dominant_bin, magnitude_spectrum, spectral_energy};
pub use filter::TransferFunction;
pub use peaks::{find_peaks, PeakCriteria};
