//! Engine configuration: numeric kind, tolerances, and solver limits.

use crate::preset::{get_preset, PresetName};
use crate::resolve::{resolve_config, ConfigSource};
use crate::validate::{validate_engine, ValidationError, ValidationResult};
use crate::CONFIG_SCHEMA_VERSION;
use improb_math::NumberKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tunables shared by every lower prevision built from one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub schema_version: String,

    /// Numeric representation for new lower previsions.
    pub number_kind: NumberKind,

    /// Absolute tolerance for float comparisons (ignored for fractions).
    pub float_tolerance: f64,

    /// Bracket width at which conditional bisection stops.
    pub bisection_tolerance: f64,

    pub bisection_max_iterations: usize,

    /// Largest denominator tried when snapping a float root to a fraction.
    pub snap_max_denominator: u64,

    /// Pivot budget per linear program.
    pub lp_max_iterations: usize,

    /// Abort vertex enumeration beyond this many intermediate rays.
    pub vertex_enumeration_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            number_kind: NumberKind::Float,
            float_tolerance: 1e-9,
            bisection_tolerance: 1e-12,
            bisection_max_iterations: 200,
            snap_max_denominator: 1_000_000,
            lp_max_iterations: 10_000,
            vertex_enumeration_limit: None,
        }
    }
}

impl EngineConfig {
    /// Default configuration with a different number kind.
    pub fn with_kind(kind: NumberKind) -> Self {
        EngineConfig {
            number_kind: kind,
            ..EngineConfig::default()
        }
    }

    /// Tolerance for comparing numbers of the configured kind.
    pub fn tolerance(&self) -> f64 {
        match self.number_kind {
            NumberKind::Fraction => 0.0,
            NumberKind::Float => self.float_tolerance,
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: &Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ValidationResult<Self> {
        serde_json::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }
}

/// A resolved and validated configuration with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: EngineConfig,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
    pub preset: Option<PresetName>,
}

/// Resolve, read, apply an optional preset, and validate.
///
/// A preset replaces the file's solver settings but keeps an explicitly
/// configured vertex enumeration limit.
pub fn load_config(cli_path: Option<&Path>, preset: Option<PresetName>) -> ValidationResult<LoadedConfig> {
    let (path, source) = resolve_config(cli_path);
    let mut config = match &path {
        Some(p) => EngineConfig::from_file(p)?,
        None => EngineConfig::default(),
    };
    if let Some(name) = preset {
        let limit = config.vertex_enumeration_limit;
        config = get_preset(name);
        config.vertex_enumeration_limit = config.vertex_enumeration_limit.or(limit);
    }
    validate_engine(&config)?;
    debug!(
        source = %source,
        path = ?path,
        preset = ?preset,
        kind = %config.number_kind,
        "engine config loaded"
    );
    Ok(LoadedConfig {
        config,
        source,
        path,
        preset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        validate_engine(&EngineConfig::default()).unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"number_kind": "fraction"}"#).unwrap();
        assert_eq!(config.number_kind, NumberKind::Fraction);
        assert_eq!(config.lp_max_iterations, 10_000);
        assert_eq!(config.tolerance(), 0.0);
    }

    #[test]
    fn test_bad_json() {
        let err = EngineConfig::from_json("{").unwrap_err();
        assert_eq!(err.code(), 61);
        let err = EngineConfig::from_json(r#"{"number_kind": "decimal"}"#).unwrap_err();
        assert!(matches!(err, ValidationError::ParseError(_)));
    }
}
