//! Process exit codes of the `improb` binary.
//!
//! Ranges:
//! - 0: success
//! - 10-19: bad configuration or input (fixable by the caller)
//! - 20-29: the model itself is the answer (sure loss, null conditioning)
//! - 30-39: internal errors

use improb_common::{Error, ErrorCategory};

/// Stable exit codes; scripts may branch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Ok = 0,

    /// Config file missing, unreadable or invalid.
    ConfigError = 10,
    /// Model file or arguments rejected.
    InputError = 11,

    /// The assessments incur sure loss.
    SureLoss = 20,
    /// Conditioning event has zero lower probability.
    ZeroProbability = 21,

    /// Internal error (bug).
    InternalError = 30,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Ok
    }

    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    /// Outcome reported about the model rather than a failure to run.
    pub fn is_model_outcome(self) -> bool {
        (20..30).contains(&self.as_i32())
    }

    pub fn is_internal_error(self) -> bool {
        self.as_i32() >= 30
    }

    /// Name used in JSON error payloads.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Ok => "OK",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::SureLoss => "ERR_SURE_LOSS",
            ExitCode::ZeroProbability => "ERR_ZERO_PROBABILITY",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }

    /// Exit code for an engine error.
    pub fn for_error(error: &Error) -> ExitCode {
        match error {
            Error::SureLoss => ExitCode::SureLoss,
            Error::ZeroProbabilityConditioning { .. } => ExitCode::ZeroProbability,
            // The caller picks the level and the algorithm.
            Error::InvalidMonotonicity(_) | Error::UnsupportedAlgorithm { .. } => ExitCode::InputError,
            _ if error.category() == ErrorCategory::Invariant => ExitCode::InternalError,
            _ => ExitCode::InputError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
