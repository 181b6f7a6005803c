//! Labeled recordings, ground-truth parsing, and train/test partitioning.
//!
//! File parsing lives outside this crate. Loaders implement
//! [`RecordingSource`]; in-memory [`LabeledRecording`]s implement it directly.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::Result;
use crate::signal::Signal;

/// Header markers that introduce a ground-truth step count.
const STEP_COUNT_MARKERS: [&str; 3] = ["COUNT OF ACTUAL STEPS", "ACTUAL STEPS", "STEPS:"];

/// A recording with its optional ground-truth step count.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledRecording {
    pub name: String,
    pub signal: Signal,
    pub actual_steps: Option<u32>,
}

impl LabeledRecording {
    pub fn new(name: impl Into<String>, signal: Signal, actual_steps: Option<u32>) -> Self {
        Self {
            name: name.into(),
            signal,
            actual_steps,
        }
    }
}

/// Something that can produce a [`LabeledRecording`], typically a file.
pub trait RecordingSource: Send + Sync {
    /// Human-readable name for logging and reports.
    fn name(&self) -> &str;

    /// Load the recording.
    ///
    /// # Errors
    ///
    /// Implementation-specific IO or format errors. Callers skip sources that
    /// fail to load.
    fn load(&self) -> Result<LabeledRecording>;
}

impl RecordingSource for LabeledRecording {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<LabeledRecording> {
        Ok(self.clone())
    }
}

impl<T: RecordingSource + ?Sized> RecordingSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load(&self) -> Result<LabeledRecording> {
        (**self).load()
    }
}

/// Parse the ground-truth step count from recording header lines.
///
/// Recognizes lines such as `COUNT OF ACTUAL STEPS: 42` or
/// `"ACTUAL STEPS", "42"`. Within a matching line the first comma-separated
/// field that is all digits wins; failing that, the digits after a colon.
#[must_use]
pub fn extract_step_count<S: AsRef<str>>(header_lines: &[S]) -> Option<u32> {
    header_lines
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|line| STEP_COUNT_MARKERS.iter().any(|m| line.contains(m)))
        .find_map(parse_count_line)
}

fn parse_count_line(line: &str) -> Option<u32> {
    let parts: Vec<&str> = line.split(',').map(clean_field).collect();

    if let Some(n) = parts.iter().find_map(|p| parse_digits(p)) {
        return Some(n);
    }
    parts
        .iter()
        .filter(|p| p.contains(':'))
        .find_map(|p| p.split(':').nth(1).map(clean_field).and_then(parse_digits))
}

fn clean_field(field: &str) -> &str {
    field.trim_matches(|c: char| c.is_whitespace() || c == '"')
}

fn parse_digits(field: &str) -> Option<u32> {
    if !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse().ok()
    } else {
        None
    }
}

/// Deterministically shuffle `items` and split them into `(train, test)`.
///
/// The train split holds the first `floor(len * (1 - test_fraction))` items of
/// the shuffled order. `test_fraction` is clamped to `[0, 1]`.
#[must_use]
pub fn split_train_test<T>(mut items: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let fraction = if test_fraction.is_nan() {
        0.0
    } else {
        test_fraction.clamp(0.0, 1.0)
    };
    let train_len = ((items.len() as f64) * (1.0 - fraction)).floor() as usize;
    let test = items.split_off(train_len.min(items.len()));
    (items, test)
}
