//! openhands-space CLI - Run and package the OpenHands backend as a Hugging Face Space
//!
//! This module contains the shared CLI implementation used by all binaries.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use openhands_space_core::get_version;
use tracing_subscriber::EnvFilter;

/// Run and package the OpenHands backend as a Hugging Face Space
#[derive(Parser)]
#[command(name = "openhands-space")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run and package the OpenHands backend as a Hugging Face Space", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the environment and launch the backend server
    Serve(commands::ServeArgs),
    /// Provision the environment and show the resolved configuration
    Provision(commands::ProvisionArgs),
    /// Validate and stage the Space deployment tree
    Package(commands::PackageArgs),
}

/// Map `-v` occurrences to a default filter. `RUST_LOG` always wins.
fn default_log_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose, quiet)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match cli.command {
        Some(Commands::Serve(args)) => commands::cmd_serve(&args, cli.quiet, cli.verbose),
        Some(Commands::Provision(args)) => commands::cmd_provision(&args, cli.quiet),
        Some(Commands::Package(args)) => commands::cmd_package(&args, cli.quiet, cli.verbose),
        None => {
            if !cli.quiet {
                println!(
                    "{} {}",
                    style("openhands-space").cyan().bold(),
                    style(get_version()).dim()
                );
                println!();
                println!("Run {} for available commands.", style("--help").green());
            }
            Ok(())
        }
    }
}
