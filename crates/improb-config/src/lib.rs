//! improb configuration loading and validation.
//!
//! This crate provides:
//! - The typed `EngineConfig` (numeric kind, tolerances, iteration limits)
//! - Config resolution (CLI → env → XDG → defaults)
//! - Named presets
//! - Semantic validation

pub mod engine;
pub mod preset;
pub mod resolve;
pub mod validate;

pub use engine::{load_config, EngineConfig, LoadedConfig};
pub use preset::{get_preset, PresetError, PresetName};
pub use resolve::{resolve_config, ConfigSource};
pub use validate::{validate_engine, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
