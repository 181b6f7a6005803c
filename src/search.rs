//! Offline search for detector parameters that minimize step-count error.
//!
//! [`ParameterSearch`] draws candidate [`DetectorParameters`] uniformly from a
//! [`ParameterSpace`], scores each candidate by the summed absolute step-count
//! error over a labeled training split, and keeps the best. The winning
//! parameters are then evaluated once on the held-out split.
//!
//! All candidates are drawn from the seed before any trial runs, so a given
//! seed yields the same result whether trials run sequentially or on the
//! rayon pool.
//!
//! # Example
//!
//! ```
//! use motion_recognition::{DetectorConfig, LabeledRecording, ParameterSearch, SearchConfig, Signal};
//!
//! let fs = 50.0;
//! let z: Vec<f64> = (0..500)
//!     .map(|i| 9.81 + 3.0 * (2.0 * std::f64::consts::PI * 2.0 * i as f64 / fs).sin().max(0.0))
//!     .collect();
//! let signal = Signal::new(vec![0.0; 500], vec![0.0; 500], z, fs)?;
//! let train = vec![LabeledRecording::new("walk", signal, Some(20))];
//!
//! let search = ParameterSearch::new(DetectorConfig::default(), SearchConfig::default().with_trials(8));
//! let result = search.search(&train)?;
//! assert!(result.best.aggregate_absolute_error <= 1.0);
//! # Ok::<(), motion_recognition::RecognitionError>(())
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{DetectorConfig, DetectorParameters, ParameterRange, ParameterSpace, SearchConfig};
use crate::dataset::{split_train_test, LabeledRecording, RecordingSource};
use crate::detector::StepDetector;
use crate::error::{RecognitionError, Result};
use crate::evaluation::{evaluate, EvaluationReport};

/// Shared flag for stopping a running search from another thread.
///
/// Trials already in progress finish; trials not yet started are skipped.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Score of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialOutcome {
    /// Position in the candidate sequence (0 is the baseline when enabled).
    pub trial: usize,
    pub parameters: DetectorParameters,
    /// Sum of absolute step-count errors over the training split.
    pub aggregate_absolute_error: f64,
}

/// Result of [`ParameterSearch::search`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    pub best: TrialOutcome,
    /// Completed trials in candidate order.
    pub trials: Vec<TrialOutcome>,
}

/// Result of a full [`ParameterSearch::run`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOutcome {
    /// Winning trial on the training split.
    pub best: TrialOutcome,

    /// Number of trials that completed.
    pub trials_run: usize,

    /// Recordings excluded from training.
    pub held_out: Vec<LabeledRecording>,

    /// Best parameters evaluated on [`Self::held_out`].
    pub evaluation: EvaluationReport,

    /// Sources that failed to load or had no ground truth.
    pub sources_skipped: usize,
}

/// Random search over detector parameters.
#[derive(Debug, Clone)]
pub struct ParameterSearch {
    detector: StepDetector,
    config: SearchConfig,
    cancel: CancellationToken,
}

impl ParameterSearch {
    /// Create a search. `detector_config` supplies gravity and filter order;
    /// its parameters are what trial 0 evaluates when the baseline is enabled.
    #[must_use]
    pub fn new(detector_config: DetectorConfig, config: SearchConfig) -> Self {
        Self {
            detector: StepDetector::new(detector_config),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this search.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Sum of absolute step-count errors of `params` over `recordings`.
    ///
    /// Recordings without a ground-truth count or with a malformed signal
    /// are left out of the sum (the latter logged). A recording whose sampling
    /// rate cannot support `params` contributes its full count as error.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` are invalid regardless of recording.
    pub fn objective(&self, params: &DetectorParameters, recordings: &[LabeledRecording]) -> Result<f64> {
        params.validate_values()?;
        let mut total = 0.0;
        for recording in recordings {
            let Some(actual) = recording.actual_steps else {
                continue;
            };
            match self.detector.count_steps(&recording.signal, params) {
                Ok(detected) => total += (detected as f64 - f64::from(actual)).abs(),
                Err(e) => {
                    warn!(recording = %recording.name, error = %e, "unusable signal, left out of objective");
                }
            }
        }
        Ok(total)
    }

    /// Candidate sequence for the configured seed and budget.
    #[must_use]
    pub fn candidates(&self) -> Vec<DetectorParameters> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut candidates = Vec::with_capacity(self.config.n_trials);
        if self.config.include_baseline && self.config.n_trials > 0 {
            candidates.push(self.detector.config().parameters);
        }
        while candidates.len() < self.config.n_trials {
            candidates.push(sample(&self.config.space, &mut rng));
        }
        candidates
    }

    /// Search for the best parameters on a training split.
    ///
    /// # Errors
    ///
    /// * [`RecognitionError::InvalidConfig`] for an invalid [`SearchConfig`]
    /// * [`RecognitionError::InvalidInput`] if no training recording has ground
    ///   truth and a well-formed signal
    /// * [`RecognitionError::Cancelled`] if cancellation or the time budget
    ///   stopped the search before any trial completed
    pub fn search(&self, train: &[LabeledRecording]) -> Result<SearchResult> {
        self.config.validate()?;
        let usable: Vec<&LabeledRecording> = train
            .iter()
            .filter(|r| r.actual_steps.is_some())
            .filter(|r| match r.signal.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(recording = %r.name, error = %e, "unusable signal, excluded from training");
                    false
                }
            })
            .collect();
        if usable.is_empty() {
            return Err(RecognitionError::invalid_input(
                "no usable training recording has a ground-truth step count",
            ));
        }
        let train: Vec<LabeledRecording> = usable.into_iter().cloned().collect();
        let labeled = train.len();

        let candidates = self.candidates();
        info!(
            trials = candidates.len(),
            recordings = labeled,
            parallel = self.config.parallel,
            "starting parameter search"
        );

        let deadline = self.config.time_budget.map(|budget| Instant::now() + budget);
        let stopped = || self.cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d);

        let run_trial = |(trial, parameters): (usize, DetectorParameters)| -> Option<TrialOutcome> {
            if stopped() {
                return None;
            }
            match self.objective(&parameters, &train) {
                Ok(error) => {
                    debug!(trial, error, ?parameters, "trial complete");
                    Some(TrialOutcome {
                        trial,
                        parameters,
                        aggregate_absolute_error: error,
                    })
                }
                Err(e) => {
                    warn!(trial, error = %e, "trial rejected");
                    None
                }
            }
        };

        let trials: Vec<TrialOutcome> = if self.config.parallel {
            candidates
                .into_par_iter()
                .enumerate()
                .filter_map(run_trial)
                .collect()
        } else {
            candidates
                .into_iter()
                .enumerate()
                .filter_map(run_trial)
                .collect()
        };

        let Some(best) = trials.iter().copied().min_by(|a, b| {
            a.aggregate_absolute_error
                .total_cmp(&b.aggregate_absolute_error)
                .then(a.trial.cmp(&b.trial))
        }) else {
            if stopped() {
                return Err(RecognitionError::Cancelled);
            }
            return Err(RecognitionError::invalid_input("every trial was rejected"));
        };

        info!(
            best_trial = best.trial,
            best_error = best.aggregate_absolute_error,
            trials_run = trials.len(),
            "parameter search finished"
        );
        Ok(SearchResult { best, trials })
    }

    /// Load, partition, search, and evaluate on the held-out split.
    ///
    /// Sources that fail to load or have no ground truth are skipped.
    ///
    /// # Errors
    ///
    /// As [`Self::search`].
    pub fn run<S: RecordingSource>(&self, sources: &[S]) -> Result<SearchOutcome> {
        let mut recordings = Vec::with_capacity(sources.len());
        let mut sources_skipped = 0;
        for source in sources {
            match source.load() {
                Ok(recording) if recording.actual_steps.is_some() => recordings.push(recording),
                Ok(_) => {
                    warn!(source = source.name(), "no ground-truth step count, skipping");
                    sources_skipped += 1;
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "failed to load recording, skipping");
                    sources_skipped += 1;
                }
            }
        }

        let (train, held_out) =
            split_train_test(recordings, self.config.test_fraction, self.config.seed);
        debug!(train = train.len(), held_out = held_out.len(), "partitioned recordings");

        let result = self.search(&train)?;
        let evaluation = evaluate(&self.detector, &result.best.parameters, &held_out);

        Ok(SearchOutcome {
            best: result.best,
            trials_run: result.trials.len(),
            held_out,
            evaluation,
            sources_skipped,
        })
    }
}

fn sample(space: &ParameterSpace, rng: &mut StdRng) -> DetectorParameters {
    let mut draw = |range: &ParameterRange| rng.gen_range(range.low..=range.high);
    DetectorParameters {
        threshold_multiplier: draw(&space.threshold_multiplier),
        min_step_distance_seconds: draw(&space.min_step_distance_seconds),
        prominence: draw(&space.prominence),
        cutoff_low_hz: draw(&space.cutoff_low_hz),
        cutoff_high_hz: draw(&space.cutoff_high_hz),
    }
}
