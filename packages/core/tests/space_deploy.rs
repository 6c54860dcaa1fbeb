//! End-to-end checks of provisioning and packaging through the public API.

use openhands_space_core::config::{OperatorEnv, schema};
use openhands_space_core::package::{
    ArchiveTarget, CredentialStatus, FrontMatter, PackageLayout, PipelineRequest, StageOutcome,
    run_pipeline,
};
use openhands_space_core::prepare_environment;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_project(root: &Path) {
    fs::create_dir_all(root.join("openhands")).expect("create app dir");
    fs::write(root.join("openhands/server.py"), "app = None\n").expect("write");
    fs::write(root.join("app_hf.py"), "import uvicorn\n").expect("write");
    fs::write(root.join("requirements.txt"), "uvicorn\nfastapi\n").expect("write");
    fs::write(root.join("Dockerfile_HF"), "FROM python:3.12-slim\n").expect("write");
    fs::write(root.join("README_HF.md"), "# OpenHands Backend\n\nAPI docs.\n").expect("write");
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

#[test]
fn complete_project_stages_and_reports_missing_token() {
    let dir = tempdir().expect("tempdir");
    write_project(dir.path());

    let report = run_pipeline(&request(dir.path()), &mut ());

    assert!(report.succeeded());
    let preflight = report.preflight.as_passed().expect("preflight passed");
    assert!(preflight.missing.is_empty());

    let summary = report.staging.as_passed().expect("staging passed");
    let staged: Vec<String> = summary
        .staging
        .files
        .iter()
        .map(|f| f.path.display().to_string().replace('\\', "/"))
        .collect();
    assert_eq!(
        staged,
        vec![
            "Dockerfile",
            "README.md",
            "app.py",
            "app_hf.py",
            "openhands/server.py",
            "requirements.txt",
        ]
    );

    let readme =
        fs::read_to_string(dir.path().join("test_hf_space/README.md")).expect("read readme");
    assert_eq!(
        readme,
        format!(
            "{}# OpenHands Backend\n\nAPI docs.\n",
            FrontMatter::default().render()
        )
    );

    assert_eq!(
        report.credential,
        StageOutcome::Passed(CredentialStatus::Missing)
    );
}

#[test]
fn env_template_adds_one_file() {
    let dir = tempdir().expect("tempdir");
    write_project(dir.path());
    fs::write(dir.path().join(".env.hf"), "LLM_API_KEY=changeme\n").expect("write");

    let report = run_pipeline(&request(dir.path()), &mut ());
    let summary = report.staging.as_passed().expect("staging passed");

    assert_eq!(summary.staging.files.len(), 7);
    assert!(summary.staging.env_template_staged);
    assert_eq!(
        fs::read(dir.path().join("test_hf_space/.env")).expect("read"),
        fs::read(dir.path().join(".env.hf")).expect("read")
    );
}

#[test]
fn second_run_replaces_previous_staging() {
    let dir = tempdir().expect("tempdir");
    write_project(dir.path());
    fs::write(dir.path().join(".env.hf"), "X=1\n").expect("write");

    assert!(run_pipeline(&request(dir.path()), &mut ()).succeeded());
    fs::remove_file(dir.path().join(".env.hf")).expect("remove");
    assert!(run_pipeline(&request(dir.path()), &mut ()).succeeded());

    assert!(!dir.path().join("test_hf_space/.env").exists());
}

#[test]
fn missing_files_are_all_listed() {
    let dir = tempdir().expect("tempdir");
    write_project(dir.path());
    fs::remove_file(dir.path().join("requirements.txt")).expect("remove");
    fs::remove_file(dir.path().join("README_HF.md")).expect("remove");

    let report = run_pipeline(&request(dir.path()), &mut ());

    assert!(!report.succeeded());
    match report.preflight {
        StageOutcome::Failed(message) => {
            assert!(message.contains("requirements.txt"));
            assert!(message.contains("README_HF.md"));
        }
        other => panic!("expected preflight failure, got {other:?}"),
    }
}

#[test]
fn provisioning_honors_operator_paths() {
    let dir = tempdir().expect("tempdir");
    let store = dir.path().join("store");
    let overrides = OperatorEnv::from_pairs([
        (schema::FILE_STORE_PATH, store.display().to_string()),
        (
            schema::CACHE_DIR,
            dir.path().join("cache").display().to_string(),
        ),
        (
            schema::WORKSPACE_BASE,
            dir.path().join("workspace").display().to_string(),
        ),
        (schema::JWT_SECRET, "operator-secret".to_string()),
    ]);

    let outcome = prepare_environment(&overrides).expect("provision");

    assert_eq!(outcome.file_store_path(), store);
    assert!(store.is_dir());
    assert_eq!(outcome.env.get(schema::JWT_SECRET), Some("operator-secret"));
    assert!(!outcome.env.secret_generated());
    assert_eq!(outcome.env.get(schema::OPENHANDS_RUNTIME), Some("local"));
}
