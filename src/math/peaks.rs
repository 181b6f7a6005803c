//! Peak finding with height, distance, and prominence criteria.
//!
//! Stages run in a fixed order: local maxima (flat tops report their
//! midpoint), height filter, distance filter (taller peaks claim their
//! neighbourhood first), prominence filter.

use crate::policy::{Computed, Degeneracy};

/// Acceptance criteria for [`find_peaks`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCriteria {
    /// Minimum peak value.
    pub height: f64,
    /// Minimum index spacing between kept peaks (samples, at least 1).
    pub distance: usize,
    /// Minimum prominence.
    pub prominence: f64,
}

/// Indices of local maxima.
///
/// A maximum is a sample (or flat run of equal samples) strictly higher than
/// both neighbours. The first and last sample are never maxima.
#[must_use]
pub fn local_maxima(data: &[f64]) -> Vec<usize> {
    let n = data.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let last = n - 1;
    let mut i = 1;
    while i < last {
        if data[i - 1] < data[i] {
            let mut ahead = i + 1;
            while ahead < last && data[ahead] == data[i] {
                ahead += 1;
            }
            if data[ahead] < data[i] {
                let left = i;
                let right = ahead - 1;
                peaks.push((left + right) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Prominence of the peak at `peak`.
///
/// Walk outward on each side until the signal rises above the peak or the
/// edge is reached, tracking the lowest point. Prominence is the peak height
/// minus the higher of the two minima.
#[must_use]
pub fn prominence(data: &[f64], peak: usize) -> f64 {
    let height = data[peak];

    let mut left_min = height;
    for &v in data[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &data[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

/// Keep peaks so that no two are closer than `distance`, favouring taller ones.
///
/// Ties in height are resolved in index order (earlier peaks rank lower).
fn select_by_distance(data: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let n = peaks.len();
    let mut keep = vec![true; n];

    let mut priority: Vec<usize> = (0..n).collect();
    priority.sort_by(|&a, &b| data[peaks[a]].total_cmp(&data[peaks[b]]));

    for &j in priority.iter().rev() {
        if !keep[j] {
            continue;
        }
        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }
        let mut k = j + 1;
        while k < n && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, kept)| kept.then_some(p))
        .collect()
}

/// Detect peaks satisfying `criteria`. Returned indices are strictly increasing.
///
/// Degenerate when `criteria.distance` is 0 or any threshold is NaN.
#[must_use]
pub fn find_peaks(data: &[f64], criteria: &PeakCriteria) -> Computed<Vec<usize>> {
    if criteria.distance == 0 {
        return Computed::Degenerate(Degeneracy::InvalidParameter);
    }
    if criteria.height.is_nan() || criteria.prominence.is_nan() {
        return Computed::Degenerate(Degeneracy::NonFinite);
    }

    let candidates: Vec<usize> = local_maxima(data)
        .into_iter()
        .filter(|&p| data[p] >= criteria.height)
        .collect();

    let spaced = select_by_distance(data, &candidates, criteria.distance);

    Computed::Value(
        spaced
            .into_iter()
            .filter(|&p| prominence(data, p) >= criteria.prominence)
            .collect(),
    )
}
