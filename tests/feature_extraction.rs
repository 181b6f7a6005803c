//! Feature extraction over synthetic activity windows.

use approx::assert_abs_diff_eq;
use motion_recognition::features::frequency::PER_AXIS_DIM;
use motion_recognition::features::{FREQUENCY_DIM, MAGNITUDE_DIM, STATISTICAL_DIM};
use motion_recognition::{
    extract_features, extract_important_features, extract_window_features, feature_names,
    segment_windows, RecognitionError, FULL_FEATURE_DIM, IMPORTANT_FEATURE_DIM,
};
use ndarray::{Array, Array3, IxDyn};
use std::f64::consts::PI;

// =============================================================================
// WINDOW GENERATORS
// =============================================================================

/// Window with a pure cosine of `cycles` periods on each axis.
fn cosine_window(len: usize, cycles: [usize; 3]) -> Vec<[f64; 3]> {
    (0..len)
        .map(|i| {
            let phase = |c: usize| (2.0 * PI * c as f64 * i as f64 / len as f64).cos();
            [phase(cycles[0]), phase(cycles[1]), phase(cycles[2])]
        })
        .collect()
}

/// Walking-like window: vertical bumps over gravity, small lateral sway.
fn walking_window(len: usize, offset: usize) -> Vec<[f64; 3]> {
    (0..len)
        .map(|i| {
            let t = (i + offset) as f64 / 50.0;
            [
                0.3 * (2.0 * PI * t).sin(),
                0.1 * (2.0 * PI * 0.5 * t).cos(),
                9.81 + 2.5 * (2.0 * PI * 2.0 * t).sin().max(0.0),
            ]
        })
        .collect()
}

fn stack(windows: &[Vec<[f64; 3]>]) -> Array3<f64> {
    let len = windows[0].len();
    Array3::from_shape_fn((windows.len(), len, 3), |(w, i, a)| windows[w][i][a])
}

// =============================================================================
// TESTS
// =============================================================================

#[test]
fn test_block_layout() {
    assert_eq!(STATISTICAL_DIM + FREQUENCY_DIM + MAGNITUDE_DIM, FULL_FEATURE_DIM);
    let names = feature_names();
    assert_eq!(names[STATISTICAL_DIM], "fft_x_0");
    assert_eq!(names[STATISTICAL_DIM + FREQUENCY_DIM], "sma_x");
}

#[test]
fn test_dominant_frequency_matches_known_bin() {
    let window = cosine_window(64, [3, 5, 8]);
    let f = extract_window_features(&window).unwrap();
    for (axis, &bin) in [3.0, 5.0, 8.0].iter().enumerate() {
        let dominant = f[STATISTICAL_DIM + axis * PER_AXIS_DIM + PER_AXIS_DIM - 1];
        assert_eq!(dominant, bin, "axis {axis}");
    }
}

#[test]
fn test_spectral_energy_obeys_parseval() {
    let window = walking_window(40, 0);
    let f = extract_window_features(&window).unwrap();
    let z: Vec<f64> = window.iter().map(|s| s[2]).collect();
    let time_energy: f64 = z.iter().map(|v| v * v).sum::<f64>() * z.len() as f64;
    let energy_z = f[STATISTICAL_DIM + 2 * PER_AXIS_DIM + 5];
    assert_abs_diff_eq!(energy_z, time_energy, epsilon = 1e-6 * time_energy);
}

#[test]
fn test_magnitude_block() {
    let window = vec![[1.0, -2.0, 2.0]; 5];
    let f = extract_window_features(&window).unwrap();
    let m = &f[STATISTICAL_DIM + FREQUENCY_DIM..];
    assert_eq!(&m[..3], &[5.0, 10.0, 10.0]);
    assert_abs_diff_eq!(m[3], 3.0, epsilon = 1e-12);
}

#[test]
fn test_degenerate_windows_keep_shape() {
    let zeros = vec![[0.0; 3]; 16];
    let f = extract_window_features(&zeros).unwrap();
    assert!(f.iter().all(|&v| v == 0.0));

    let nan = vec![[f64::NAN; 3]; 16];
    let f = extract_window_features(&nan).unwrap();
    assert_eq!(f.len(), FULL_FEATURE_DIM);
    assert!(f.iter().all(|v| v.is_finite()));
}

#[test]
fn test_batch_rows_follow_input_order() {
    let windows: Vec<Vec<[f64; 3]>> = (0..6).map(|k| walking_window(50, k * 17)).collect();
    let matrix = extract_features(&stack(&windows).view().into_dyn()).unwrap();
    assert_eq!(matrix.shape(), &[6, FULL_FEATURE_DIM]);
    for (k, window) in windows.iter().enumerate() {
        let expected = extract_window_features(window).unwrap();
        assert_eq!(matrix.row(k).to_vec(), expected.to_vec());
    }
}

#[test]
fn test_segmented_recording() {
    let samples = walking_window(1000, 0);
    let windows = segment_windows(&samples, 64).unwrap();
    assert_eq!(windows.shape(), &[15, 64, 3]);
    let matrix = extract_features(&windows.view().into_dyn()).unwrap();
    assert_eq!(matrix.nrows(), 15);
}

#[test]
fn test_batch_shape_validation() {
    for shape in [vec![10, 3], vec![4, 10, 2], vec![2, 3, 10, 3], vec![30]] {
        let arr = Array::<f64, _>::zeros(IxDyn(&shape));
        match extract_features(&arr.view()) {
            Err(RecognitionError::InvalidShape { actual, .. }) => assert_eq!(actual, shape),
            other => panic!("expected InvalidShape for {shape:?}, got {other:?}"),
        }
        assert!(extract_important_features(&arr.view()).is_err());
    }
}

#[test]
fn test_important_variant() {
    let windows: Vec<Vec<[f64; 3]>> = (0..3).map(|k| walking_window(25, k * 25)).collect();
    let matrix = extract_important_features(&stack(&windows).view().into_dyn()).unwrap();
    assert_eq!(matrix.shape(), &[3, IMPORTANT_FEATURE_DIM]);
    for (k, window) in windows.iter().enumerate() {
        let max_z = window.iter().map(|s| s[2]).fold(f64::MIN, f64::max);
        assert_eq!(matrix[[k, 2]], max_z);
        assert!(matrix[[k, 3]] <= matrix[[k, 6]] && matrix[[k, 6]] <= matrix[[k, 0]]);
    }
}
