//! openhands-space-core - Core library for openhands-space
//!
//! This library provides the shared functionality for running the OpenHands
//! backend on Hugging Face Spaces:
//! - Environment provisioning with set-if-absent defaults
//! - Server bootstrap and readiness probing
//! - Packaging of the deployable tree into a staging directory

pub mod config;
pub mod package;
pub mod provision;
pub mod server;

pub use config::{OperatorEnv, ResolvedEnv, SpaceConfig};
pub use provision::{ProvisionError, ProvisionOutcome, prepare_environment};

/// Get the version string of the core library
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
