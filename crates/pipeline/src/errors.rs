//! Error and retry-policy types for the AsoWorks domain.
//!
//! [`AsoWorksError`] covers structural misuse of the core: malformed input,
//! out-of-order session-state writes, ranking over nothing. Compliance
//! findings are **not** errors — a report full of issues is ordinary,
//! successful validator output.
//!
//! [`RetryPolicy`] is a cross-cutting concern: collaborator failures
//! ([`StageError`]) produce one so the stage runner can decide whether to
//! re-invoke a call without escalating. Core errors are never retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{Phase, StageKind};

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether a collaborator failure is safe to retry and, if so, after what
/// minimum delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The call may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying (e.g.
    /// derived from a rate-limit response header). `None` means the caller's
    /// own back-off schedule applies.
    Retryable {
        /// Minimum back-off before the next attempt.
        after: Option<Duration>,
    },
    /// The call must not be retried; the failure escalates to the caller.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Core errors
// ---------------------------------------------------------------------------

/// Errors raised by the deterministic core.
///
/// Each variant indicates a caller bug or input the caller must fix before
/// re-invoking; none is retried by the core itself.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum AsoWorksError {
    /// A structural precondition failed: unknown platform string, empty
    /// draft title, overlapping keyword tiers, and the like.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the precondition that failed.
        message: String,
    },

    /// A stage attempted to write session state out of sequence.
    ///
    /// Fatal to the run. This is an orchestration bug, not bad content.
    #[error("Out-of-order write: {attempted} wrote while the pipeline is in the {phase} phase")]
    OutOfOrderWrite {
        /// The stage whose write was rejected.
        attempted: StageKind,
        /// The phase the session state was actually in.
        phase: Phase,
    },

    /// The ranker was handed zero drafts.
    ///
    /// Fatal to aggregation; the caller re-runs content generation.
    #[error("Empty input: {what}")]
    EmptyInput {
        /// What was empty.
        what: String,
    },
}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// A failure reported by an external stage collaborator (a model or search
/// call behind one of the [`crate::ports`] traits).
///
/// Distinct from [`AsoWorksError`]: collaborator failures may be transient,
/// and the stage runner consults [`StageError::retry_policy`] before giving
/// up on a stage.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum StageError {
    /// The collaborator did not answer in time.
    #[error("{stage} collaborator timed out")]
    Timeout {
        /// The stage whose collaborator failed.
        stage: StageKind,
    },

    /// The upstream provider rate-limited the call.
    #[error("{stage} collaborator was rate-limited")]
    RateLimited {
        /// The stage whose collaborator failed.
        stage: StageKind,
        /// Minimum delay requested by the provider, if it sent one.
        after: Option<Duration>,
    },

    /// The provider failed transiently (a 5xx-class condition).
    #[error("{stage} collaborator failed upstream: {message}")]
    Upstream {
        /// The stage whose collaborator failed.
        stage: StageKind,
        /// Provider-supplied failure description.
        message: String,
    },

    /// The collaborator answered, but with output the stage cannot accept.
    #[error("{stage} collaborator returned unusable output: {message}")]
    Rejected {
        /// The stage whose collaborator failed.
        stage: StageKind,
        /// Why the output was rejected.
        message: String,
    },
}

impl StageError {
    /// The stage whose collaborator reported the failure.
    pub fn stage(&self) -> StageKind {
        match self {
            StageError::Timeout { stage }
            | StageError::RateLimited { stage, .. }
            | StageError::Upstream { stage, .. }
            | StageError::Rejected { stage, .. } => *stage,
        }
    }

    /// Whether the stage runner may re-invoke the failed call.
    ///
    /// Timeouts, rate limits, and upstream failures are retryable; unusable
    /// output is not — retrying the identical request would produce the same
    /// rejection.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            StageError::Timeout { .. } | StageError::Upstream { .. } => {
                RetryPolicy::Retryable { after: None }
            }
            StageError::RateLimited { after, .. } => RetryPolicy::Retryable { after: *after },
            StageError::Rejected { .. } => RetryPolicy::NonRetryable,
        }
    }
}
