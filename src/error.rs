//! Error types for reducer construction and merging.
//!
//! Only two things can go wrong inside the kernel:
//!
//! - [`ConfigurationError`] -- a constructor was handed parameters it cannot
//!   work with (a zero-sized window, a quantile target outside `(0, 1)`, an
//!   inverted histogram range, ...). Raised synchronously at construction.
//! - [`TypeMismatchError`] -- two reducers of the same type but incompatible
//!   configuration were merged (histograms with different bins, conditionals
//!   with different active branches). Raised at merge time.
//!
//! Numeric input never produces an error: NaN and infinities flow through the
//! arithmetic per IEEE-754.

use thiserror::Error;

/// Invalid constructor parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {component} configuration: {reason}")]
pub struct ConfigurationError {
    /// The reducer or wrapper being constructed.
    pub component: &'static str,
    /// Human-readable description of the violated constraint.
    pub reason: String,
}

impl ConfigurationError {
    pub fn new<S: Into<String>>(component: &'static str, reason: S) -> Self {
        Self {
            component,
            reason: reason.into(),
        }
    }
}

/// Merge between two reducers whose configurations are incompatible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot merge {component}: expected {expected}, found {found}")]
pub struct TypeMismatchError {
    pub component: &'static str,
    pub expected: String,
    pub found: String,
}

impl TypeMismatchError {
    pub fn new<E, F>(component: &'static str, expected: E, found: F) -> Self
    where
        E: Into<String>,
        F: Into<String>,
    {
        Self {
            component,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Either of the kernel's error kinds, for call sites that mix construction and merging.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReducerError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),
}

/// Shorthand for merge results.
pub type MergeResult = Result<(), TypeMismatchError>;

/// Reject a value that must lie in the open interval `(lo, hi)`.
pub(crate) fn check_open_interval(
    component: &'static str,
    name: &str,
    value: f64,
    lo: f64,
    hi: f64,
) -> Result<(), ConfigurationError> {
    if value > lo && value < hi {
        Ok(())
    } else {
        Err(ConfigurationError::new(
            component,
            format!("{name} must lie in ({lo}, {hi}), got {value}"),
        ))
    }
}

/// Reject a zero count or size.
pub(crate) fn check_positive(
    component: &'static str,
    name: &str,
    value: usize,
) -> Result<(), ConfigurationError> {
    if value == 0 {
        Err(ConfigurationError::new(component, format!("{name} must be > 0")))
    } else {
        Ok(())
    }
}
