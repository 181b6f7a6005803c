//! Compute-or-default policy for the fault-tolerant numeric path.
//!
//! Kernels report three outcomes: a value, an expected numeric degeneracy
//! (empty input, zero variance, non-finite samples, too few samples), or a
//! genuine error. Only the degenerate case is replaced by a default value.
//! Errors still propagate to the caller.

use std::fmt;

use tracing::trace;

use crate::error::Result;

/// Why a computation had no meaningful value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// No samples to compute over.
    EmptyInput,
    /// A series was constant where a spread was required.
    ZeroVariance,
    /// The input or an intermediate value was NaN or infinite.
    NonFinite,
    /// Fewer samples than the computation needs.
    TooShort { needed: usize, actual: usize },
    /// A parameter-derived quantity is out of range (e.g. a peak distance of 0 samples).
    InvalidParameter,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty input"),
            Self::ZeroVariance => write!(f, "zero variance"),
            Self::NonFinite => write!(f, "non-finite values"),
            Self::TooShort { needed, actual } => {
                write!(f, "need more than {needed} samples, got {actual}")
            }
            Self::InvalidParameter => write!(f, "parameter out of range"),
        }
    }
}

/// Outcome of a numeric kernel that may legitimately have no value.
#[derive(Debug, Clone, PartialEq)]
pub enum Computed<T> {
    Value(T),
    Degenerate(Degeneracy),
}

impl Computed<f64> {
    /// Wrap a scalar, turning NaN/Inf into [`Degeneracy::NonFinite`].
    #[must_use]
    pub fn finite(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Degenerate(Degeneracy::NonFinite)
        }
    }
}

impl<T> Computed<T> {
    /// Take the value or fall back to `default`.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Value(v) => v,
            Self::Degenerate(_) => default,
        }
    }

    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }

    /// Map the contained value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Computed<U> {
        match self {
            Self::Value(v) => Computed::Value(f(v)),
            Self::Degenerate(d) => Computed::Degenerate(d),
        }
    }
}

/// Resolve a kernel outcome: values pass through, degeneracies become
/// `default`, errors propagate.
///
/// # Errors
///
/// Returns the kernel's error unchanged.
pub fn compute_or_default<T>(outcome: Result<Computed<T>>, default: T, block: &str) -> Result<T> {
    Ok(value_or_default(outcome?, default, block))
}

/// Infallible counterpart of [`compute_or_default`] for kernels that cannot error.
pub fn value_or_default<T>(outcome: Computed<T>, default: T, block: &str) -> T {
    match outcome {
        Computed::Value(v) => v,
        Computed::Degenerate(reason) => {
            trace!(block, %reason, "degenerate block, using default");
            default
        }
    }
}

/// Replace NaN/Inf with 0.0.
#[inline]
#[must_use]
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

/// Apply [`finite_or_zero`] to every element.
pub fn sanitize(values: &mut [f64]) {
    for v in values {
        *v = finite_or_zero(*v);
    }
}
