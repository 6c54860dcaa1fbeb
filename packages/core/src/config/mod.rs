//! Configuration management for openhands-space
//!
//! This module provides:
//! - The environment variable schema and the Space defaults table
//! - Pure set-if-absent resolution of operator values against defaults
//! - Session secret generation
//! - Validation with actionable fix commands

mod resolve;
pub mod schema;
mod secret;
pub mod validation;

use thiserror::Error;

pub use resolve::{OperatorEnv, ResolvedEnv, parse_flag, resolve_env};
pub use schema::{EnvDefault, SPACE_DEFAULTS, SpaceConfig};
pub use secret::{SESSION_SECRET_BYTES, generate_session_secret};
pub use validation::{ValidationError, ValidationWarning, validate_config};

/// Errors turning a resolved set into a typed configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}

/// Resolve the operator's environment against the Space defaults, generating
/// a fresh session secret if none is set.
pub fn resolve_space_env(overrides: &OperatorEnv) -> ResolvedEnv {
    resolve_env(overrides, SPACE_DEFAULTS, generate_session_secret)
}
