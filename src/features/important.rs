//! Reduced feature set: max, min, median and mean per axis.
//!
//! Unlike the full extractor this variant does no zero-filling. Structural
//! problems are errors and the statistics are reported exactly as computed.

use ndarray::{Array2, ArrayViewD, Axis};

use crate::error::{RecognitionError, Result};
use crate::math::stats;

use super::batch::{as_window_batch, BATCH_SHAPE};

/// Number of reduced features.
pub const IMPORTANT_FEATURE_DIM: usize = 12;

#[rustfmt::skip]
const IMPORTANT_FEATURE_NAMES: [&str; IMPORTANT_FEATURE_DIM] = [
    "max_x", "max_y", "max_z",
    "min_x", "min_y", "min_z",
    "median_x", "median_y", "median_z",
    "mean_x", "mean_y", "mean_z",
];

/// Column names of the reduced feature matrix.
#[must_use]
pub const fn important_feature_names() -> [&'static str; IMPORTANT_FEATURE_DIM] {
    IMPORTANT_FEATURE_NAMES
}

/// Extract the 12-column reduced feature matrix.
///
/// # Errors
///
/// [`RecognitionError::InvalidShape`] unless `batch` is
/// `(count, window_length, 3)` with a non-zero window length.
pub fn extract_important_features(batch: &ArrayViewD<'_, f64>) -> Result<Array2<f64>> {
    let batch = as_window_batch(batch)?;
    if batch.shape()[1] == 0 {
        return Err(RecognitionError::invalid_shape(BATCH_SHAPE, batch.shape()));
    }

    let mut out = Array2::<f64>::zeros((batch.shape()[0], IMPORTANT_FEATURE_DIM));
    for (window, mut row) in batch.axis_iter(Axis(0)).zip(out.rows_mut()) {
        for (axis, column) in window.axis_iter(Axis(1)).enumerate() {
            let values = column.to_vec();
            row[axis] = stats::max(&values);
            row[3 + axis] = stats::min(&values);
            row[6 + axis] = stats::median(&values);
            row[9 + axis] = stats::mean(&values);
        }
    }
    Ok(out)
}
