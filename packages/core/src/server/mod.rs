//! Server bootstrap
//!
//! This module provides:
//! - Port and bind address resolution
//! - The uvicorn command that serves the backend's application object
//! - Launching and supervising the backend process
//! - Readiness probing against the backend's health endpoint

mod error;
pub mod health;
mod launch;
mod settings;

pub use error::ServerError;
pub use health::{HttpProbe, ReadinessOutcome, ReadinessStatus, map_readiness_status};
pub use launch::{
    DEFAULT_READY_TIMEOUT, LaunchOptions, READY_POLL_INTERVAL, SHUTDOWN_GRACE, run_server,
    run_server_until,
};
pub use settings::{
    API_ENDPOINTS, BIND_HOST, DEFAULT_APP_TARGET, DEFAULT_PORT, DEFAULT_PYTHON, HEALTH_PATH,
    LaunchCommand, ServerSettings, resolve_port,
};
