//! Color utilities for CLI output
//!
//! Provides consistent styling for readiness states and presence flags.

use console::{Style, StyledObject};
use openhands_space_core::server::ReadinessStatus;

/// Human label for a readiness status
pub fn readiness_label(status: ReadinessStatus) -> String {
    match status {
        ReadinessStatus::Ready => "ready".to_string(),
        ReadinessStatus::Starting => "starting".to_string(),
        ReadinessStatus::Unhealthy(code) => format!("unhealthy (HTTP {code})"),
        ReadinessStatus::CheckFailed => "check failed".to_string(),
    }
}

/// Style a readiness status
///
/// - ready -> green bold
/// - starting -> yellow
/// - unhealthy, check failed -> red
pub fn readiness_style(status: ReadinessStatus) -> StyledObject<String> {
    let style = match status {
        ReadinessStatus::Ready => Style::new().green().bold(),
        ReadinessStatus::Starting => Style::new().yellow(),
        ReadinessStatus::Unhealthy(_) | ReadinessStatus::CheckFailed => Style::new().red(),
    };
    style.apply_to(readiness_label(status))
}

/// "Set" or "Missing", never the value itself
pub fn presence_label(present: bool) -> &'static str {
    if present { "Set" } else { "Missing" }
}
