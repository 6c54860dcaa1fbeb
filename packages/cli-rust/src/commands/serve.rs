//! Serve command
//!
//! Provisions the environment, prints the status summary and runs the
//! backend in the foreground until it exits.

use super::provision::provision_or_report;
use crate::output::spinner::format_elapsed;
use crate::output::{display_status, display_warnings, readiness_style};
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use openhands_space_core::OperatorEnv;
use openhands_space_core::config::schema::PORT;
use openhands_space_core::server::{
    DEFAULT_APP_TARGET, DEFAULT_PYTHON, DEFAULT_READY_TIMEOUT, LaunchOptions, ReadinessOutcome,
    ServerSettings, run_server,
};
use std::process::ExitStatus;
use std::time::Duration;
use tracing::debug;

/// Arguments for the serve command
#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Python interpreter used to run uvicorn
    #[arg(long, value_name = "PROG", default_value = DEFAULT_PYTHON)]
    pub python: String,

    /// Application object to serve
    #[arg(long, value_name = "TARGET", default_value = DEFAULT_APP_TARGET)]
    pub app: String,

    /// Do not wait for the health endpoint after launch
    #[arg(long)]
    pub no_wait: bool,

    /// Seconds to wait for the health endpoint before warning
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_READY_TIMEOUT.as_secs())]
    pub ready_timeout: u64,
}

pub fn cmd_serve(args: &ServeArgs, quiet: bool, verbose: u8) -> Result<()> {
    let mut overrides = OperatorEnv::from_process();
    if let Some(port) = args.port {
        overrides = overrides.with_override(PORT, port.to_string());
    }

    let outcome = provision_or_report(&overrides)?;
    let mut settings = ServerSettings::from_env(&outcome.env)?;
    settings.python = args.python.clone();
    settings.app_target = args.app.clone();

    if !quiet {
        display_status(&outcome, Some(&settings));
        display_warnings(&outcome.warnings);
        println!();
    }
    if verbose > 0 {
        eprintln!(
            "{} Defaulted: {}",
            style("[info]").cyan(),
            outcome.env.defaulted_keys().collect::<Vec<_>>().join(", ")
        );
    }

    let options = LaunchOptions {
        health_url: (!args.no_wait).then(|| settings.health_url()),
        ready_timeout: Duration::from_secs(args.ready_timeout),
        ..LaunchOptions::default()
    };
    // Backend logs share the terminal; readiness is reported as plain lines
    if let Some(url) = &options.health_url
        && !quiet
    {
        eprintln!(
            "Waiting for {} (up to {})",
            style(url).cyan(),
            format_elapsed(options.ready_timeout)
        );
    }

    debug!(port = settings.port, "Handing off to the backend");
    let rt = tokio::runtime::Runtime::new()?;
    let status = rt
        .block_on(run_server(
            &settings.command(),
            &outcome.env,
            &options,
            |ready| {
                if !quiet {
                    eprintln!("{}", readiness_line(ready));
                }
            },
        ))
        .context("Backend server failed")?;

    if status.success() {
        return Ok(());
    }
    let code = exit_code(status);
    eprintln!(
        "{} Backend exited with status {}",
        style("Error:").red().bold(),
        code
    );
    std::process::exit(code);
}

/// One line summarizing the readiness wait
fn readiness_line(outcome: ReadinessOutcome) -> String {
    match outcome {
        ReadinessOutcome::Ready { elapsed } => format!(
            "{} Backend ready in {}",
            style("✓").green(),
            format_elapsed(elapsed)
        ),
        ReadinessOutcome::TimedOut { last, waited } => format!(
            "{} Backend not ready after {} (last status: {})",
            style("✗").red(),
            format_elapsed(waited),
            readiness_style(last)
        ),
    }
}

/// Exit code for the CLI mirroring the backend's. A signal-terminated child
/// maps to 128 + signal, as shells report it.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
