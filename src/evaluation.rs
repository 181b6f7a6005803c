//! Per-recording error reporting and summary statistics.
//!
//! A [`FileResult`] row is produced for every recording that loads and has a
//! ground-truth count. Summary statistics are derived from those rows only;
//! skipped recordings are counted but never contribute error.

use std::fmt;

use tracing::{debug, warn};

use crate::config::DetectorParameters;
use crate::dataset::{LabeledRecording, RecordingSource};
use crate::detector::StepDetector;

/// Detection outcome for one recording.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileResult {
    /// Recording name.
    pub file: String,

    /// Steps found by the detector.
    pub detected_steps: usize,

    /// Ground-truth step count.
    pub actual_steps: u32,

    /// `detected - actual`.
    pub error: i64,

    /// `|detected - actual|`.
    pub absolute_error: u64,

    /// `error / actual`, or 0 when `actual` is 0.
    pub relative_error: f64,
}

impl FileResult {
    #[must_use]
    pub fn new(file: impl Into<String>, detected_steps: usize, actual_steps: u32) -> Self {
        let error = detected_steps as i64 - i64::from(actual_steps);
        let relative_error = if actual_steps > 0 {
            error as f64 / f64::from(actual_steps)
        } else {
            0.0
        };
        Self {
            file: file.into(),
            detected_steps,
            actual_steps,
            error,
            absolute_error: error.unsigned_abs(),
            relative_error,
        }
    }
}

/// Aggregate statistics over a table of [`FileResult`]s.
///
/// All means are 0 when no recording was processed.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationSummary {
    /// Rows in the results table.
    pub files_processed: usize,

    /// Recordings that failed to load, had no ground truth, or had a
    /// malformed signal.
    pub files_skipped: usize,

    /// Mean signed error (steps).
    pub mean_error: f64,

    /// Mean absolute error (steps).
    pub mean_absolute_error: f64,

    /// Mean signed relative error, as a percentage.
    pub mean_relative_error_percent: f64,

    /// Root mean squared error (steps).
    pub rms_error: f64,
}

impl EvaluationSummary {
    /// Derive the summary from a results table.
    #[must_use]
    pub fn from_results(results: &[FileResult], files_skipped: usize) -> Self {
        let n = results.len();
        if n == 0 {
            return Self {
                files_skipped,
                ..Self::default()
            };
        }
        let n_f = n as f64;
        let mean = |f: fn(&FileResult) -> f64| results.iter().map(f).sum::<f64>() / n_f;

        Self {
            files_processed: n,
            files_skipped,
            mean_error: mean(|r| r.error as f64),
            mean_absolute_error: mean(|r| r.absolute_error as f64),
            mean_relative_error_percent: mean(|r| r.relative_error) * 100.0,
            rms_error: mean(|r| (r.error * r.error) as f64).sqrt(),
        }
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files processed: {} (skipped {})", self.files_processed, self.files_skipped)?;
        writeln!(f, "Mean error: {:.2} steps", self.mean_error)?;
        writeln!(f, "Mean absolute error: {:.2} steps", self.mean_absolute_error)?;
        writeln!(f, "Mean relative error: {:.2}%", self.mean_relative_error_percent)?;
        write!(f, "Root mean squared error: {:.2} steps", self.rms_error)
    }
}

/// Results table plus its summary.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationReport {
    pub results: Vec<FileResult>,
    pub summary: EvaluationSummary,
}

/// Run the detector on one recording and compare against its ground truth.
///
/// Returns `None` (logged) when the recording has no ground-truth count or
/// its signal is malformed. Scoring follows [`StepDetector::count_steps`], the
/// same rule the parameter search applies.
#[must_use]
pub fn evaluate_recording(
    detector: &StepDetector,
    params: &DetectorParameters,
    recording: &LabeledRecording,
) -> Option<FileResult> {
    let Some(actual) = recording.actual_steps else {
        warn!(recording = %recording.name, "no ground-truth step count, skipping");
        return None;
    };
    let detected = match detector.count_steps(&recording.signal, params) {
        Ok(steps) => steps,
        Err(e) => {
            warn!(recording = %recording.name, error = %e, "unusable signal, skipping");
            return None;
        }
    };
    let result = FileResult::new(recording.name.clone(), detected, actual);
    debug!(
        recording = %result.file,
        detected = result.detected_steps,
        actual = result.actual_steps,
        "evaluated recording"
    );
    Some(result)
}

/// Evaluate every source, skipping those that fail to load, lack ground truth,
/// or carry a malformed signal.
#[must_use]
pub fn evaluate<S: RecordingSource>(
    detector: &StepDetector,
    params: &DetectorParameters,
    sources: &[S],
) -> EvaluationReport {
    let mut results = Vec::with_capacity(sources.len());
    let mut skipped = 0;

    for source in sources {
        let outcome = match source.load() {
            Ok(recording) => evaluate_recording(detector, params, &recording),
            Err(e) => {
                warn!(source = source.name(), error = %e, "failed to load recording, skipping");
                None
            }
        };
        match outcome {
            Some(result) => results.push(result),
            None => skipped += 1,
        }
    }

    let summary = EvaluationSummary::from_results(&results, skipped);
    EvaluationReport { results, summary }
}
