//! Configuration validation errors and semantic validation.

use crate::engine::EngineConfig;
use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate an engine configuration semantically.
pub fn validate_engine(config: &EngineConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    if !config.float_tolerance.is_finite() || !(0.0..1e-2).contains(&config.float_tolerance) {
        return Err(invalid(
            "float_tolerance",
            format!("must be in [0, 0.01), got {}", config.float_tolerance),
        ));
    }

    if !config.bisection_tolerance.is_finite() || config.bisection_tolerance <= 0.0 {
        return Err(invalid(
            "bisection_tolerance",
            format!("must be positive, got {}", config.bisection_tolerance),
        ));
    }

    if config.bisection_max_iterations == 0 {
        return Err(invalid("bisection_max_iterations", "must be at least 1"));
    }

    if config.snap_max_denominator == 0 {
        return Err(invalid("snap_max_denominator", "must be at least 1"));
    }

    if config.lp_max_iterations == 0 {
        return Err(invalid("lp_max_iterations", "must be at least 1"));
    }

    if config.vertex_enumeration_limit == Some(0) {
        return Err(invalid("vertex_enumeration_limit", "must be at least 1 when set"));
    }

    Ok(())
}
