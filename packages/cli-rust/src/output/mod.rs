//! Output utilities for CLI commands
//!
//! This module provides terminal output helpers including a spinner with
//! elapsed time display for staging, color utilities for
//! consistent status styling, and the provisioning summary.

pub mod colors;
pub mod spinner;
pub mod summary;

pub use colors::readiness_style;
pub use spinner::CommandSpinner;
pub use summary::{display_status, display_validation_error, display_warnings};
