//! Error types for improb.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for callers
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 21,
//!   "category": "arithmetic",
//!   "message": "cannot condition on event {a} with zero lower probability",
//!   "recoverable": true,
//!   "context": { "event": "{a}" }
//! }
//! ```

use improb_math::{LpError, NumberError, NumberKind, PolytopeError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for improb operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Operands from different spaces or number kinds.
    Domain,
    /// Assessments that incur sure loss.
    Coherence,
    /// Arithmetic preconditions such as conditioning on null events.
    Arithmetic,
    /// Set-function values that were never assigned.
    Lookup,
    /// Internal invariants and unsupported operations.
    Invariant,
    /// Malformed caller input.
    Input,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Domain => write!(f, "domain"),
            ErrorCategory::Coherence => write!(f, "coherence"),
            ErrorCategory::Arithmetic => write!(f, "arithmetic"),
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::Invariant => write!(f, "invariant"),
            ErrorCategory::Input => write!(f, "input"),
        }
    }
}

/// Unified error type for improb.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Domain errors (10-19)
    #[error("domain mismatch: {0}")]
    DomainMismatch(String),

    #[error("number kind mismatch: expected {expected}, got {actual}")]
    NumberKindMismatch {
        expected: NumberKind,
        actual: NumberKind,
    },

    // Coherence and arithmetic errors (20-29)
    #[error("assessments incur sure loss")]
    SureLoss,

    #[error("cannot condition on event {event} with zero lower probability")]
    ZeroProbabilityConditioning { event: String },

    // Lookup errors (30-39)
    #[error("set function value undefined for event {event}")]
    UndefinedSetFunctionValue { event: String },

    // Invariant errors (40-49)
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("invalid monotonicity level {0}")]
    InvalidMonotonicity(usize),

    #[error("algorithm {algorithm} is not supported by {target}")]
    UnsupportedAlgorithm { algorithm: String, target: String },

    #[error("linear program failed: {0}")]
    LinearProgram(#[from] LpError),

    #[error("vertex enumeration failed: {0}")]
    Polytope(#[from] PolytopeError),

    // Input errors (50-59)
    #[error("invalid assessment: {0}")]
    InvalidAssessment(String),

    #[error("unknown outcome {0:?}")]
    UnknownOutcome(String),

    #[error("possibility space must not be empty")]
    EmptySpace,

    #[error("duplicate outcome {0:?}")]
    DuplicateOutcome(String),

    #[error("possibility space has {size} outcomes, at most {max} are supported")]
    SpaceTooLarge { size: usize, max: usize },

    #[error("number error: {0}")]
    Number(NumberError),
}

impl From<NumberError> for Error {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::KindMismatch { left, right } => Error::NumberKindMismatch {
                expected: left,
                actual: right,
            },
            other => Error::Number(other),
        }
    }
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Domain errors
    /// - 20-29: Coherence and arithmetic errors
    /// - 30-39: Lookup errors
    /// - 40-49: Invariant errors
    /// - 50-59: Input errors
    pub fn code(&self) -> u32 {
        match self {
            Error::DomainMismatch(_) => 10,
            Error::NumberKindMismatch { .. } => 11,
            Error::SureLoss => 20,
            Error::ZeroProbabilityConditioning { .. } => 21,
            Error::UndefinedSetFunctionValue { .. } => 30,
            Error::Invariant(_) => 40,
            Error::InvalidMonotonicity(_) => 41,
            Error::UnsupportedAlgorithm { .. } => 42,
            Error::LinearProgram(_) => 43,
            Error::Polytope(_) => 44,
            Error::InvalidAssessment(_) => 50,
            Error::UnknownOutcome(_) => 51,
            Error::EmptySpace => 52,
            Error::DuplicateOutcome(_) => 53,
            Error::SpaceTooLarge { .. } => 54,
            Error::Number(_) => 55,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::DomainMismatch(_) | Error::NumberKindMismatch { .. } => ErrorCategory::Domain,

            Error::SureLoss => ErrorCategory::Coherence,

            Error::ZeroProbabilityConditioning { .. } => ErrorCategory::Arithmetic,

            Error::UndefinedSetFunctionValue { .. } => ErrorCategory::Lookup,

            Error::Invariant(_)
            | Error::InvalidMonotonicity(_)
            | Error::UnsupportedAlgorithm { .. }
            | Error::LinearProgram(_)
            | Error::Polytope(_) => ErrorCategory::Invariant,

            Error::InvalidAssessment(_)
            | Error::UnknownOutcome(_)
            | Error::EmptySpace
            | Error::DuplicateOutcome(_)
            | Error::SpaceTooLarge { .. }
            | Error::Number(_) => ErrorCategory::Input,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Domain and invariant errors point at a bug in the caller or the
    /// engine; everything else can be fixed by changing the input.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::Domain | ErrorCategory::Invariant
        )
    }
}

/// Structured error for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., event, algorithm).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ZeroProbabilityConditioning { event }
            | Error::UndefinedSetFunctionValue { event } => {
                context.insert("event".to_string(), serde_json::json!(event));
            }
            Error::UnsupportedAlgorithm { algorithm, target } => {
                context.insert("algorithm".to_string(), serde_json::json!(algorithm));
                context.insert("target".to_string(), serde_json::json!(target));
            }
            Error::SpaceTooLarge { size, max } => {
                context.insert("size".to_string(), serde_json::json!(size));
                context.insert("max".to_string(), serde_json::json!(max));
            }
            Error::InvalidMonotonicity(level) => {
                context.insert("monotonicity".to_string(), serde_json::json!(level));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}
