//! Provision command
//!
//! Resolves the Space configuration and creates its directories without
//! launching the backend. Prints a table, or JSON for scripts.

use crate::output::{display_status, display_validation_error, display_warnings};
use anyhow::{Context, Result};
use clap::Args;
use openhands_space_core::{OperatorEnv, ProvisionError, ProvisionOutcome, prepare_environment};
use serde_json::json;

/// Arguments for the provision command
#[derive(Args)]
pub struct ProvisionArgs {
    /// Output the resolved configuration as JSON
    #[arg(long)]
    pub json: bool,
}

/// Provision the environment, showing rich output for validation errors
pub(crate) fn provision_or_report(overrides: &OperatorEnv) -> Result<ProvisionOutcome> {
    match prepare_environment(overrides) {
        Ok(outcome) => Ok(outcome),
        Err(ProvisionError::Validation(e)) => {
            display_validation_error(&e);
            Err(ProvisionError::Validation(e)).context("Configuration is invalid")
        }
        Err(e) => Err(e).context("Failed to prepare the environment"),
    }
}

/// JSON document for `provision --json`. The secret value is never included.
fn provision_json(outcome: &ProvisionOutcome) -> serde_json::Value {
    let defaulted: Vec<&str> = outcome.env.defaulted_keys().collect();
    let warnings: Vec<_> = outcome
        .warnings
        .iter()
        .map(|w| json!({ "field": w.field, "message": w.message, "fix": w.fix_command }))
        .collect();
    json!({
        "config": outcome.config,
        "defaulted": defaulted,
        "secret_generated": outcome.env.secret_generated(),
        "warnings": warnings,
    })
}

pub fn cmd_provision(args: &ProvisionArgs, quiet: bool) -> Result<()> {
    let outcome = provision_or_report(&OperatorEnv::from_process())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&provision_json(&outcome))?);
        return Ok(());
    }

    if !quiet {
        display_status(&outcome, None);
        display_warnings(&outcome.warnings);
    }
    Ok(())
}
