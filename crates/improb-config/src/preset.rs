//! Configuration presets.
//!
//! - Exact: rational arithmetic, tight bisection, generous snapping
//! - Fast: floating point with looser tolerances and smaller budgets

use crate::engine::EngineConfig;
use improb_math::NumberKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Available configuration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    /// Exact rationals everywhere
    Exact,
    /// Floating point, looser tolerances
    Fast,
}

impl PresetName {
    /// All available preset names.
    pub const ALL: &'static [PresetName] = &[PresetName::Exact, PresetName::Fast];

    /// Get preset name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Exact => "exact",
            PresetName::Fast => "fast",
        }
    }

    /// Parse preset name from string.
    pub fn parse(s: &str) -> Option<PresetName> {
        match s.to_lowercase().as_str() {
            "exact" | "fraction" | "rational" => Some(PresetName::Exact),
            "fast" | "float" => Some(PresetName::Fast),
            _ => None,
        }
    }

    /// Get a description of the preset.
    pub fn description(&self) -> &'static str {
        match self {
            PresetName::Exact => "Exact rational arithmetic, results reproducible bit for bit",
            PresetName::Fast => "Floating point with looser tolerances for large spaces",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s).ok_or_else(|| PresetError::UnknownPreset(s.to_string()))
    }
}

/// Errors related to preset operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("Unknown preset '{0}'. Available: exact, fast")]
    UnknownPreset(String),
}

/// Build the configuration for a preset.
pub fn get_preset(name: PresetName) -> EngineConfig {
    match name {
        PresetName::Exact => EngineConfig {
            number_kind: NumberKind::Fraction,
            bisection_tolerance: 1e-13,
            bisection_max_iterations: 200,
            snap_max_denominator: 10_000_000,
            ..EngineConfig::default()
        },
        PresetName::Fast => EngineConfig {
            number_kind: NumberKind::Float,
            float_tolerance: 1e-8,
            bisection_tolerance: 1e-10,
            bisection_max_iterations: 100,
            lp_max_iterations: 5_000,
            ..EngineConfig::default()
        },
    }
}
