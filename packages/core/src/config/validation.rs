//! Configuration validation with actionable messages
//!
//! Checks a resolved [`SpaceConfig`] and suggests the exact environment
//! change that fixes each issue.

use super::schema::{self, SpaceConfig};
use thiserror::Error;

/// A configuration validation error with an actionable fix
#[derive(Debug, Clone, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// The environment variable that has an error
    pub field: String,
    /// Description of what's wrong
    pub message: String,
    /// Exact shell command to fix the issue
    pub fix_command: String,
}

/// A configuration validation warning (non-fatal)
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The environment variable with a potential issue
    pub field: String,
    /// Description of the warning
    pub message: String,
    /// Suggested shell command to address the warning
    pub fix_command: String,
}

/// Validate configuration and return warnings or first error
///
/// Returns Ok(warnings) if validation passes (possibly with non-fatal warnings).
/// Returns Err(error) on the first fatal validation error encountered.
pub fn validate_config(config: &SpaceConfig) -> Result<Vec<ValidationWarning>, ValidationError> {
    let mut warnings = Vec::new();

    if config.max_iterations == 0 {
        return Err(ValidationError {
            field: schema::MAX_ITERATIONS.to_string(),
            message: "MAX_ITERATIONS must be > 0".to_string(),
            fix_command: "export MAX_ITERATIONS=30".to_string(),
        });
    }

    if !config.max_budget_per_task.is_finite() || config.max_budget_per_task < 0.0 {
        return Err(ValidationError {
            field: schema::MAX_BUDGET_PER_TASK.to_string(),
            message: "MAX_BUDGET_PER_TASK must be a non-negative number".to_string(),
            fix_command: "export MAX_BUDGET_PER_TASK=10.0".to_string(),
        });
    }

    for (field, path) in [
        (schema::FILE_STORE_PATH, &config.file_store_path),
        (schema::CACHE_DIR, &config.cache_dir),
        (schema::WORKSPACE_BASE, &config.workspace_base),
    ] {
        if path.as_os_str().is_empty() {
            return Err(ValidationError {
                field: field.to_string(),
                message: format!("{field} cannot be empty"),
                fix_command: format!("unset {field}"),
            });
        }
    }

    // Warnings (non-fatal)

    if !config.llm_api_key_present {
        warnings.push(ValidationWarning {
            field: schema::LLM_API_KEY.to_string(),
            message: "No LLM API key; users must supply one in the settings".to_string(),
            fix_command: "export LLM_API_KEY=<your-key>".to_string(),
        });
    }

    if config.security_disabled || config.auth_disabled {
        warnings.push(ValidationWarning {
            field: schema::OPENHANDS_DISABLE_AUTH.to_string(),
            message: "Authentication is disabled; anyone who can reach the port can use the API"
                .to_string(),
            fix_command: "export DISABLE_SECURITY=false OPENHANDS_DISABLE_AUTH=false".to_string(),
        });
    }

    if config.allows_any_origin() {
        warnings.push(ValidationWarning {
            field: schema::CORS_ALLOWED_ORIGINS.to_string(),
            message: "Any web origin may call the API".to_string(),
            fix_command: "export CORS_ALLOWED_ORIGINS=https://your-frontend.example".to_string(),
        });
    }

    Ok(warnings)
}
