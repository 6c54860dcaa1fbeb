//! Package command
//!
//! Checks the deployable tree, stages it into a scratch directory the way the
//! deploy workflow does, and reports whether the deploy token is available.

use crate::output::CommandSpinner;
use crate::output::spinner::format_elapsed;
use anyhow::{Result, bail};
use clap::Args;
use console::style;
use openhands_space_core::OperatorEnv;
use openhands_space_core::package::{
    ArchiveTarget, CredentialStatus, FrontMatter, HF_TOKEN, PackageLayout, PipelineObserver,
    PipelineReport, PipelineRequest, PreflightReport, Stage, StagingStep, StagingSummary,
    run_pipeline,
};
use openhands_space_core::server::DEFAULT_PORT;
use std::path::PathBuf;

/// Arguments for the package command
#[derive(Args)]
pub struct PackageArgs {
    /// Project root containing the deployable files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Scratch directory, relative to the root [default: test_hf_space]
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Port advertised in the README front matter
    #[arg(long, default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Also write a tar.gz of the staged tree [default: <staging dir>.tar.gz]
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub archive: Option<Option<PathBuf>>,

    /// Output the pipeline report as JSON
    #[arg(long)]
    pub json: bool,
}

impl PackageArgs {
    fn to_request(&self, env: OperatorEnv) -> PipelineRequest {
        let mut layout = PackageLayout::default();
        if let Some(dir) = &self.staging_dir {
            layout.staging_dir = dir.clone();
        }
        let archive = match &self.archive {
            None => ArchiveTarget::None,
            Some(None) => ArchiveTarget::Default,
            Some(Some(path)) => ArchiveTarget::Path(path.clone()),
        };
        PipelineRequest {
            root: self.root.clone(),
            layout,
            front_matter: FrontMatter {
                app_port: self.port,
                ..FrontMatter::default()
            },
            archive,
            env,
        }
    }
}

/// Prints pipeline progress as it happens
struct ConsoleReporter {
    quiet: bool,
    /// False when log output may share the terminal
    animate: bool,
    spinner: Option<CommandSpinner>,
}

impl ConsoleReporter {
    fn new(quiet: bool, verbose: u8) -> Self {
        Self {
            quiet,
            animate: verbose == 0,
            spinner: None,
        }
    }
}

impl PipelineObserver for ConsoleReporter {
    fn stage_started(&mut self, stage: Stage) {
        if self.quiet {
            return;
        }
        let title = match stage {
            Stage::Preflight => "Checking required files...",
            Stage::Staging => "Preparing deployment files...",
            Stage::Credential => "Checking Hugging Face token...",
        };
        if stage != Stage::Preflight {
            println!();
        }
        println!("{}", style(title).bold());
        if stage == Stage::Staging {
            self.spinner = Some(if self.animate {
                CommandSpinner::new_maybe("Starting...", self.quiet)
            } else {
                CommandSpinner::plain(self.quiet)
            });
        }
    }

    fn preflight_finished(&mut self, report: &PreflightReport) {
        if self.quiet {
            return;
        }
        for path in &report.present {
            println!("  {} {}", style("✓").green(), path);
        }
        for path in &report.missing {
            println!("  {} {}", style("✗").red(), path);
        }
        if report.passed() {
            println!("{}", style("All required files found").green());
        }
    }

    fn staging_step(&mut self, step: &StagingStep) {
        if let Some(spinner) = &self.spinner {
            spinner.update(&step.describe());
        }
    }

    fn staging_finished(&mut self, summary: &StagingSummary) {
        let staging = &summary.staging;
        if let Some(spinner) = self.spinner.take() {
            spinner.success(&format!(
                "Staged {} files in {}",
                staging.files.len(),
                format_elapsed(spinner.elapsed())
            ));
        }
        if self.quiet {
            return;
        }
        println!();
        println!(
            "{} {}:",
            style("Files prepared in").bold(),
            style(staging.staging_dir.display()).cyan()
        );
        for file in &staging.files {
            println!(
                "  {} {}",
                file.path.display(),
                style(format!("({} bytes)", file.size)).dim()
            );
        }
        println!(
            "  {}",
            style(format!(
                "{} files, {} bytes total",
                staging.files.len(),
                staging.total_bytes()
            ))
            .dim()
        );
        if let Some(archive) = &summary.archive {
            println!(
                "Archive: {} {}",
                style(archive.path.display()).cyan(),
                style(format!("({} bytes)", archive.size)).dim()
            );
        }
    }

    fn stage_failed(&mut self, stage: Stage, error: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
        let label = match stage {
            Stage::Preflight => "File check failed",
            Stage::Staging => "Staging failed",
            Stage::Credential => "Token check failed",
        };
        eprintln!("{} {}: {}", style("Error:").red().bold(), label, error);
    }

    fn credential_checked(&mut self, status: CredentialStatus) {
        if status.is_present() {
            if !self.quiet {
                println!("  {} {} found", style("✓").green(), HF_TOKEN);
            }
            return;
        }
        eprintln!(
            "{} {} not found in environment variables",
            style("Warning:").yellow().bold(),
            HF_TOKEN
        );
        eprintln!("  For actual deployment, set this in GitHub Secrets");
    }
}

fn print_next_steps() {
    println!();
    println!("{}", style("Next steps").bold());
    println!("  1. Set {HF_TOKEN} in the GitHub repository secrets");
    println!("  2. Push changes to the main branch to trigger the deploy");
    println!("  3. Or run the deploy workflow manually from the GitHub Actions tab");
}

fn finish(report: &PipelineReport) -> Result<()> {
    if !report.succeeded() {
        bail!("Deployment packaging failed");
    }
    Ok(())
}

pub fn cmd_package(args: &PackageArgs, quiet: bool, verbose: u8) -> Result<()> {
    let request = args.to_request(OperatorEnv::from_process());
    if verbose > 0 {
        eprintln!(
            "{} Project root: {}",
            style("[info]").cyan(),
            request.root.display()
        );
    }

    if args.json {
        let report = run_pipeline(&request, &mut ());
        println!("{}", serde_json::to_string_pretty(&report)?);
        return finish(&report);
    }

    let mut reporter = ConsoleReporter::new(quiet, verbose);
    let report = run_pipeline(&request, &mut reporter);
    finish(&report)?;

    if !quiet {
        println!();
        println!("{}", style("Deployment package is ready").green().bold());
        print_next_steps();
    }
    Ok(())
}
