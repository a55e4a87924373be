//! Step completion outcomes.
//!
//! Every span close reports how the enclosed step ended. Outcomes also
//! aggregate: a scope that dispatched several branches joins their outcomes
//! to decide its own span status, where any failure wins.

use core::fmt;
use serde::{Deserialize, Serialize};

/// The cause of a failed step: a stable error type identifier plus a
/// human-readable message.
///
/// The error type is the identifier the runtime matches handlers against
/// (e.g. `"HTTP:CONNECTIVITY"`); the message is free-form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailureCause {
    error_type: String,
    message: String,
}

impl FailureCause {
    /// Creates a failure cause.
    #[must_use]
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Returns the stable error type identifier.
    #[inline]
    #[must_use]
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Returns the human-readable message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

/// How a traced step completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The step completed normally.
    Success,
    /// The step raised or propagated a failure.
    Failure(FailureCause),
}

impl StepOutcome {
    /// Creates a failure outcome.
    #[must_use]
    pub fn failure(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure(FailureCause::new(error_type, message))
    }

    /// Whether this outcome is a success.
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure cause, if any.
    #[inline]
    #[must_use]
    pub const fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::Success => None,
            Self::Failure(cause) => Some(cause),
        }
    }

    /// Joins two outcomes: any failure wins, and the first failure's cause
    /// is kept.
    #[must_use]
    pub fn join(self, other: Self) -> Self {
        match self {
            Self::Success => other,
            failed @ Self::Failure(_) => failed,
        }
    }
}

/// Joins an ordered sequence of branch outcomes into one aggregate.
///
/// Success only when every branch succeeded; otherwise the first failure's
/// cause, in iteration order.
#[must_use]
pub fn join_outcomes<I>(outcomes: I) -> StepOutcome
where
    I: IntoIterator<Item = StepOutcome>,
{
    outcomes
        .into_iter()
        .fold(StepOutcome::Success, StepOutcome::join)
}
