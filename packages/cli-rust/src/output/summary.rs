//! Provisioning summary display
//!
//! Shows the resolved configuration before the backend is launched.

use super::colors::presence_label;
use comfy_table::{Cell, Color, Table};
use console::style;
use openhands_space_core::ProvisionOutcome;
use openhands_space_core::config::schema::{LLM_BASE_URL, LLM_MODEL, WORKSPACE_BASE};
use openhands_space_core::config::{ValidationError, ValidationWarning};
use openhands_space_core::server::{API_ENDPOINTS, ServerSettings};

const NOT_SET: &str = "Not set";

/// Label/value pairs for the status table, in display order
pub fn status_rows(outcome: &ProvisionOutcome) -> Vec<(&'static str, String)> {
    let config = &outcome.config;
    let on_off = |flag: bool| if flag { "disabled" } else { "enabled" }.to_string();
    let sandbox = if config.container_sandbox_disabled() {
        "disabled".to_string()
    } else {
        config.sandbox_container_image.clone()
    };

    vec![
        ("Runtime:", config.runtime.clone()),
        ("Sandbox image:", sandbox),
        ("CORS origins:", config.cors_allowed_origins.clone()),
        ("File store:", config.file_store_path.display().to_string()),
        ("Cache dir:", config.cache_dir.display().to_string()),
        (
            "LLM API key:",
            presence_label(config.llm_api_key_present).to_string(),
        ),
        (
            "JWT secret:",
            presence_label(config.jwt_secret_present).to_string(),
        ),
        ("Security:", on_off(config.security_disabled)),
        ("Auth:", on_off(config.auth_disabled)),
        ("Default model:", config.default_llm_model.clone()),
    ]
}

/// Debug values shown as-is, or "Not set"
pub fn debug_rows(outcome: &ProvisionOutcome) -> Vec<(&'static str, String)> {
    [LLM_MODEL, LLM_BASE_URL, WORKSPACE_BASE]
        .into_iter()
        .map(|key| {
            let value = outcome
                .env
                .get(key)
                .filter(|v| !v.is_empty())
                .unwrap_or(NOT_SET)
                .to_string();
            (key, value)
        })
        .collect()
}

fn rows_table(rows: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    for (label, value) in rows {
        let cell = match value.as_str() {
            "Missing" | "disabled" | NOT_SET => Cell::new(value).fg(Color::Yellow),
            "Set" | "enabled" => Cell::new(value).fg(Color::Green),
            _ => Cell::new(value),
        };
        table.add_row(vec![Cell::new(label), cell]);
    }
    table
}

/// Display the provisioning status summary
pub fn display_status(outcome: &ProvisionOutcome, settings: Option<&ServerSettings>) {
    println!("{}", style("OpenHands Space Configuration").bold());
    println!("{}", style("-".repeat(29)).dim());
    println!("{}", rows_table(&status_rows(outcome)));

    if outcome.env.secret_generated() {
        println!();
        println!(
            "{} Generated a new {} for this process. Sessions will not survive a restart.",
            style("Note:").cyan(),
            style("JWT_SECRET").cyan()
        );
    }

    if let Some(settings) = settings {
        println!();
        println!("{}", style("Server").bold());
        println!("  Listening on: {}", style(settings.socket_addr()).cyan());
        println!("  Command: {}", style(settings.command().display()).dim());
        println!();
        println!("{}", style("API endpoints").bold());
        for (method, path) in API_ENDPOINTS {
            println!("  {} {}", style(format!("{method:<5}")).green(), path);
        }
    }

    println!();
    println!("{}", style("Debug info").bold());
    println!("{}", rows_table(&debug_rows(outcome)));
}

/// Display validation warnings with their fix commands
pub fn display_warnings(warnings: &[ValidationWarning]) {
    for warning in warnings {
        eprintln!(
            "{} {}: {}",
            style("Warning:").yellow().bold(),
            warning.field,
            warning.message
        );
        if !warning.fix_command.is_empty() {
            eprintln!("  {} {}", style("Fix:").dim(), style(&warning.fix_command).cyan());
        }
    }
}

/// Display a fatal validation error before the command fails
pub fn display_validation_error(error: &ValidationError) {
    eprintln!("{} {}", style("Error:").red().bold(), error.message);
    eprintln!("  {} {}", style("Field:").dim(), error.field);
    eprintln!("  {} {}", style("Fix:").dim(), style(&error.fix_command).cyan());
}
