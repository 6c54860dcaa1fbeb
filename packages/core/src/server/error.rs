//! Server bootstrap error types

use std::io;
use thiserror::Error;

/// Errors from resolving server settings or running the backend process
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid PORT value {value:?}: expected a number between 1 and 65535")]
    InvalidPort { value: String },

    #[error("Failed to start backend with '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting for backend process: {0}")]
    Wait(#[source] io::Error),

    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[source] io::Error),

    #[error("Failed to build readiness probe client: {0}")]
    ProbeClient(#[source] reqwest::Error),
}
