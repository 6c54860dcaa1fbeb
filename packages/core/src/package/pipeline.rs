//! The three-stage packaging pipeline
//!
//! 1. Precondition check: every required path must exist.
//! 2. Staging: reset the scratch directory and copy the deployable tree,
//!    optionally archiving it.
//! 3. Credential check: advisory, never fails the pipeline.
//!
//! A failed stage skips everything after it.

use super::archive::{ArchiveReport, write_archive};
use super::credential::{CredentialStatus, check_credential};
use super::front_matter::FrontMatter;
use super::layout::PackageLayout;
use super::preflight::{PreflightReport, check_required_files};
use super::staging::{StagingReport, StagingStep, stage};
use crate::config::OperatorEnv;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preflight,
    Staging,
    Credential,
}

/// Outcome of a single stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Skipped,
    Passed(T),
    Failed(String),
}

impl<T> StageOutcome<T> {
    pub fn passed(&self) -> bool {
        matches!(self, StageOutcome::Passed(_))
    }

    pub fn as_passed(&self) -> Option<&T> {
        match self {
            StageOutcome::Passed(value) => Some(value),
            _ => None,
        }
    }
}

/// Where to archive the staged tree, if anywhere
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ArchiveTarget {
    #[default]
    None,
    /// `<staging dir>.tar.gz` next to the staging directory
    Default,
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub root: PathBuf,
    pub layout: PackageLayout,
    pub front_matter: FrontMatter,
    pub archive: ArchiveTarget,
    /// Environment consulted by the credential check
    pub env: OperatorEnv,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagingSummary {
    #[serde(flatten)]
    pub staging: StagingReport,
    pub archive: Option<ArchiveReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub preflight: StageOutcome<PreflightReport>,
    pub staging: StageOutcome<StagingSummary>,
    pub credential: StageOutcome<CredentialStatus>,
}

impl PipelineReport {
    /// True when the precondition check and staging both passed. The
    /// credential check never affects this.
    pub fn succeeded(&self) -> bool {
        self.preflight.passed() && self.staging.passed()
    }
}

/// Hooks for reporting pipeline progress as it happens
pub trait PipelineObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn preflight_finished(&mut self, _report: &PreflightReport) {}
    fn staging_step(&mut self, _step: &StagingStep) {}
    fn staging_finished(&mut self, _summary: &StagingSummary) {}
    fn stage_failed(&mut self, _stage: Stage, _error: &str) {}
    fn credential_checked(&mut self, _status: CredentialStatus) {}
}

impl PipelineObserver for () {}

pub fn run_pipeline(
    request: &PipelineRequest,
    observer: &mut dyn PipelineObserver,
) -> PipelineReport {
    let mut report = PipelineReport {
        preflight: StageOutcome::Skipped,
        staging: StageOutcome::Skipped,
        credential: StageOutcome::Skipped,
    };

    observer.stage_started(Stage::Preflight);
    let preflight = check_required_files(&request.root, &request.layout);
    observer.preflight_finished(&preflight);
    if !preflight.passed() {
        let message = format!("Missing files: {}", preflight.missing.join(", "));
        observer.stage_failed(Stage::Preflight, &message);
        debug!("Preflight failed, skipping staging and credential check");
        report.preflight = StageOutcome::Failed(message);
        return report;
    }
    report.preflight = StageOutcome::Passed(preflight);

    observer.stage_started(Stage::Staging);
    match run_staging(request, observer) {
        Ok(summary) => {
            observer.staging_finished(&summary);
            report.staging = StageOutcome::Passed(summary);
        }
        Err(error) => {
            let message = error.to_string();
            observer.stage_failed(Stage::Staging, &message);
            report.staging = StageOutcome::Failed(message);
            return report;
        }
    }

    observer.stage_started(Stage::Credential);
    let status = check_credential(&request.env);
    observer.credential_checked(status);
    report.credential = StageOutcome::Passed(status);

    report
}

fn run_staging(
    request: &PipelineRequest,
    observer: &mut dyn PipelineObserver,
) -> Result<StagingSummary, super::StagingError> {
    let staging = stage(
        &request.root,
        &request.layout,
        &request.front_matter,
        |step| observer.staging_step(step),
    )?;

    let archive_path = match &request.archive {
        ArchiveTarget::None => None,
        ArchiveTarget::Default => Some(request.layout.default_archive_path(&request.root)),
        ArchiveTarget::Path(path) => Some(request.root.join(path)),
    };
    let sources = request.layout.source_paths(&request.root);
    let archive = archive_path
        .map(|path| write_archive(&staging, &path, &sources))
        .transpose()?;

    Ok(StagingSummary { staging, archive })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        stages: Vec<Stage>,
        failures: Vec<Stage>,
        steps: usize,
    }

    impl PipelineObserver for Recorder {
        fn stage_started(&mut self, stage: Stage) {
            self.stages.push(stage);
        }

        fn staging_step(&mut self, _step: &StagingStep) {
            self.steps += 1;
        }

        fn stage_failed(&mut self, stage: Stage, _error: &str) {
            self.failures.push(stage);
        }
    }

    fn request(root: &Path) -> PipelineRequest {
        PipelineRequest {
            root: root.to_path_buf(),
            layout: PackageLayout::default(),
            front_matter: FrontMatter::default(),
            archive: ArchiveTarget::None,
            env: OperatorEnv::default(),
        }
    }

    fn project(root: &Path) {
        fs::create_dir_all(root.join("openhands")).expect("create");
        fs::write(root.join("openhands/app.py"), "app = 1\n").expect("write");
        fs::write(root.join("app_hf.py"), "boot\n").expect("write");
        fs::write(root.join("requirements.txt"), "uvicorn\n").expect("write");
        fs::write(root.join("Dockerfile_HF"), "FROM python\n").expect("write");
        fs::write(root.join("README_HF.md"), "# Docs\n").expect("write");
    }

    #[test]
    fn preflight_failure_skips_remaining_stages() {
        let dir = tempdir().expect("tempdir");
        let mut recorder = Recorder::default();

        let report = run_pipeline(&request(dir.path()), &mut recorder);

        assert!(!report.succeeded());
        assert!(matches!(report.preflight, StageOutcome::Failed(_)));
        assert_eq!(report.staging, StageOutcome::Skipped);
        assert_eq!(report.credential, StageOutcome::Skipped);
        assert_eq!(recorder.stages, vec![Stage::Preflight]);
        assert_eq!(recorder.failures, vec![Stage::Preflight]);
        assert!(!dir.path().join("test_hf_space").exists());
    }

    #[test]
    fn staging_failure_skips_credential_check() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let mut req = request(dir.path());
        req.layout.staging_dir = PathBuf::from(".");

        let report = run_pipeline(&req, &mut ());

        assert!(!report.succeeded());
        assert!(report.preflight.passed());
        assert!(matches!(report.staging, StageOutcome::Failed(_)));
        assert_eq!(report.credential, StageOutcome::Skipped);
    }

    #[test]
    fn credential_present_is_reported() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let mut req = request(dir.path());
        req.env = OperatorEnv::from_pairs([("HF_TOKEN", "hf_test")]);

        let report = run_pipeline(&req, &mut ());
        assert!(report.succeeded());
        assert_eq!(
            report.credential,
            StageOutcome::Passed(CredentialStatus::Present)
        );
    }

    #[test]
    fn default_archive_written_next_to_staging() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let mut req = request(dir.path());
        req.archive = ArchiveTarget::Default;

        let report = run_pipeline(&req, &mut ());
        let summary = report.staging.as_passed().expect("staging passed");
        let archive = summary.archive.as_ref().expect("archive written");
        assert_eq!(archive.path, dir.path().join("test_hf_space.tar.gz"));
        assert!(archive.path.is_file());
    }

    #[test]
    fn archive_over_bootstrap_script_fails_staging() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let mut req = request(dir.path());
        req.archive = ArchiveTarget::Path(PathBuf::from("app_hf.py"));

        let report = run_pipeline(&req, &mut ());

        assert!(!report.succeeded());
        assert!(matches!(report.staging, StageOutcome::Failed(ref m) if m.contains("app_hf.py")));
        assert_eq!(report.credential, StageOutcome::Skipped);
        assert_eq!(fs::read(dir.path().join("app_hf.py")).expect("read"), b"boot\n");
    }

    #[test]
    fn absolute_archive_path_inside_staging_fails() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let mut req = request(dir.path());
        req.archive = ArchiveTarget::Path(dir.path().join("test_hf_space/out.tar.gz"));

        let report = run_pipeline(&req, &mut ());

        assert!(matches!(report.staging, StageOutcome::Failed(_)));
        assert!(!dir.path().join("test_hf_space/out.tar.gz").exists());
    }

    #[test]
    fn observer_sees_each_stage_and_step() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let mut recorder = Recorder::default();

        run_pipeline(&request(dir.path()), &mut recorder);

        assert_eq!(
            recorder.stages,
            vec![Stage::Preflight, Stage::Staging, Stage::Credential]
        );
        // reset, app dir, app files, manifest, build file, readme
        assert_eq!(recorder.steps, 6);
        assert!(recorder.failures.is_empty());
    }

    #[test]
    fn report_serializes_for_ci() {
        let dir = tempdir().expect("tempdir");
        let report = run_pipeline(&request(dir.path()), &mut ());
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["preflight"]["status"], "failed");
        assert_eq!(json["staging"]["status"], "skipped");
    }
}
