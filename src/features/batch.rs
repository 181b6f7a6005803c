//! Batch feature extraction over `(count, window_length, 3)` arrays.

use ndarray::{Array2, ArrayView3, ArrayViewD, Axis, Ix3};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{RecognitionError, Result};

use super::{extract_window_features, FeatureVector, FULL_FEATURE_DIM};

/// Windows at or above this count are extracted on the rayon pool.
const PARALLEL_THRESHOLD: usize = 256;

pub(crate) const BATCH_SHAPE: &str = "(count, window_length, 3)";

/// Check that `batch` is 3-D with a last axis of width 3.
pub(crate) fn as_window_batch<'a>(batch: &ArrayViewD<'a, f64>) -> Result<ArrayView3<'a, f64>> {
    let shape = batch.shape();
    if shape.len() != 3 || shape[2] != 3 {
        return Err(RecognitionError::invalid_shape(BATCH_SHAPE, shape));
    }
    batch
        .clone()
        .into_dimensionality::<Ix3>()
        .map_err(|_| RecognitionError::invalid_shape(BATCH_SHAPE, shape))
}

/// Copy each window of a validated batch into `[x, y, z]` rows.
pub(crate) fn windows_of(batch: &ArrayView3<'_, f64>) -> Vec<Vec<[f64; 3]>> {
    batch
        .axis_iter(Axis(0))
        .map(|window| {
            window
                .axis_iter(Axis(0))
                .map(|sample| [sample[0], sample[1], sample[2]])
                .collect()
        })
        .collect()
}

/// Extract features for every window, preserving order.
///
/// # Errors
///
/// Propagates the first kernel error encountered.
pub fn extract_window_rows(windows: &[Vec<[f64; 3]>]) -> Result<Vec<FeatureVector>> {
    if windows.len() >= PARALLEL_THRESHOLD {
        windows
            .par_iter()
            .map(|w| extract_window_features(w))
            .collect()
    } else {
        windows.iter().map(|w| extract_window_features(w)).collect()
    }
}

/// Extract the full 46-column feature matrix from a window batch.
///
/// Row `i` corresponds to window `i`, so the matrix lines up index-for-index
/// with an external label sequence.
///
/// # Errors
///
/// Returns [`RecognitionError::InvalidShape`] unless `batch` has shape
/// `(count, window_length, 3)`.
///
/// # Example
///
/// ```
/// use motion_recognition::features::extract_features;
/// use ndarray::Array3;
///
/// let batch = Array3::<f64>::zeros((4, 10, 3));
/// let matrix = extract_features(&batch.view().into_dyn())?;
/// assert_eq!(matrix.shape(), &[4, 46]);
/// # Ok::<(), motion_recognition::RecognitionError>(())
/// ```
pub fn extract_features(batch: &ArrayViewD<'_, f64>) -> Result<Array2<f64>> {
    let batch = as_window_batch(batch)?;
    let windows = windows_of(&batch);
    let rows = extract_window_rows(&windows)?;

    debug!(
        windows = rows.len(),
        window_length = batch.shape()[1],
        "extracted feature matrix"
    );

    let flat: Vec<f64> = rows.iter().flat_map(|row| row.iter().copied()).collect();
    Array2::from_shape_vec((rows.len(), FULL_FEATURE_DIM), flat)
        .map_err(|e| RecognitionError::invalid_input(format!("feature matrix assembly: {e}")))
}
