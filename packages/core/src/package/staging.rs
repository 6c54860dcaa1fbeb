//! Staging of the deployable file tree
//!
//! Staging is destructive: the scratch directory is deleted and recreated on
//! every run, so nothing from a previous run leaks into the next. Errors
//! abort the run and leave whatever was already copied in place for
//! inspection.

use super::error::StagingError;
use super::front_matter::FrontMatter;
use super::layout::PackageLayout;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A staging step, reported to the observer as it begins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingStep {
    Reset { path: PathBuf },
    CopyAppDir { from: PathBuf },
    CopyBootstrap { entry_point: PathBuf },
    CopyManifest,
    CopyBuildFile { target: PathBuf },
    WriteReadme { target: PathBuf },
    CopyEnvTemplate { target: PathBuf },
}

impl StagingStep {
    pub fn describe(&self) -> String {
        match self {
            StagingStep::Reset { path } => format!("Resetting {}", path.display()),
            StagingStep::CopyAppDir { from } => format!("Copying {} folder", from.display()),
            StagingStep::CopyBootstrap { entry_point } => {
                format!("Copying app files (entry point {})", entry_point.display())
            }
            StagingStep::CopyManifest => "Copying requirements".to_string(),
            StagingStep::CopyBuildFile { target } => {
                format!("Copying build file as {}", target.display())
            }
            StagingStep::WriteReadme { target } => {
                format!("Creating {} with metadata", target.display())
            }
            StagingStep::CopyEnvTemplate { target } => {
                format!("Copying environment template as {}", target.display())
            }
        }
    }
}

/// One regular file in the staging directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    /// Path relative to the staging directory
    pub path: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagingReport {
    pub staging_dir: PathBuf,
    /// Sorted by path
    pub files: Vec<StagedFile>,
    pub env_template_staged: bool,
}

impl StagingReport {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Stage the deployable tree under `layout.staging_dir`.
pub fn stage(
    root: &Path,
    layout: &PackageLayout,
    front_matter: &FrontMatter,
    mut on_step: impl FnMut(&StagingStep),
) -> Result<StagingReport, StagingError> {
    check_reset_target(root, &layout.staging_dir, &layout.app_dir)?;
    let staging = layout.staging_path(root);

    on_step(&StagingStep::Reset {
        path: staging.clone(),
    });
    reset_dir(&staging)?;

    on_step(&StagingStep::CopyAppDir {
        from: layout.app_dir.clone(),
    });
    copy_dir_recursive(&root.join(&layout.app_dir), &staging.join(&layout.app_dir))?;

    on_step(&StagingStep::CopyBootstrap {
        entry_point: layout.entry_point.clone(),
    });
    let bootstrap = root.join(&layout.bootstrap_script);
    copy_file(&bootstrap, &staging.join(&layout.bootstrap_script))?;
    copy_file(&bootstrap, &staging.join(&layout.entry_point))?;

    on_step(&StagingStep::CopyManifest);
    copy_file(&root.join(&layout.manifest), &staging.join(&layout.manifest))?;

    on_step(&StagingStep::CopyBuildFile {
        target: layout.build_file_target.clone(),
    });
    copy_file(
        &root.join(&layout.build_file),
        &staging.join(&layout.build_file_target),
    )?;

    on_step(&StagingStep::WriteReadme {
        target: layout.readme_target.clone(),
    });
    write_readme(
        &root.join(&layout.readme_template),
        &staging.join(&layout.readme_target),
        front_matter,
    )?;

    let env_template = root.join(&layout.env_template);
    let env_template_staged = env_template.is_file();
    if env_template_staged {
        on_step(&StagingStep::CopyEnvTemplate {
            target: layout.env_target.clone(),
        });
        copy_file(&env_template, &staging.join(&layout.env_target))?;
    }

    let files = list_staged_files(&staging)?;
    Ok(StagingReport {
        staging_dir: staging,
        files,
        env_template_staged,
    })
}

/// Reject staging targets whose removal would destroy the project.
///
/// `staging` and `app_dir` are resolved against the canonical `root`.
fn check_reset_target(root: &Path, staging: &Path, app_dir: &Path) -> Result<(), StagingError> {
    let root = fs::canonicalize(root).map_err(|source| StagingError::Reset {
        path: root.to_path_buf(),
        source,
    })?;
    let staging = lexical_absolute(&root, staging);
    let unsafe_dir = |reason| StagingError::UnsafeStagingDir {
        path: staging.clone(),
        reason,
    };

    if is_root_path(&staging) {
        return Err(unsafe_dir("it is the filesystem root"));
    }
    if root.starts_with(&staging) {
        return Err(unsafe_dir("it contains the project root"));
    }
    if staging.starts_with(lexical_absolute(&root, app_dir)) {
        return Err(unsafe_dir("it is inside the application directory"));
    }
    Ok(())
}

fn lexical_absolute(base: &Path, path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in base.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn is_root_path(path: &Path) -> bool {
    !path
        .components()
        .any(|component| matches!(component, Component::Normal(_)))
}

fn reset_dir(path: &Path) -> Result<(), StagingError> {
    let reset_err = |source| StagingError::Reset {
        path: path.to_path_buf(),
        source,
    };

    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => {
            debug!("Removing previous staging directory: {}", path.display());
            fs::remove_dir_all(path).map_err(reset_err)?;
        }
        Ok(_) => {
            debug!("Removing non-directory at staging path: {}", path.display());
            fs::remove_file(path).map_err(reset_err)?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(reset_err(e)),
    }

    fs::create_dir_all(path).map_err(reset_err)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), StagingError> {
    let copy_err = |source| StagingError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }
    debug!("Copying {} -> {}", from.display(), to.display());
    fs::copy(from, to).map_err(copy_err)?;
    Ok(())
}

/// Copy a directory tree. Symlinks are followed, so the staged tree holds
/// plain files.
fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), StagingError> {
    for entry in WalkDir::new(from).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            StagingError::Copy {
                from: path,
                to: to.to_path_buf(),
                source: e.into(),
            }
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|source| StagingError::Copy {
                from: entry.path().to_path_buf(),
                to: target.clone(),
                source,
            })?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}

fn write_readme(
    template: &Path,
    target: &Path,
    front_matter: &FrontMatter,
) -> Result<(), StagingError> {
    let body = fs::read(template).map_err(|source| StagingError::ReadTemplate {
        path: template.to_path_buf(),
        source,
    })?;
    fs::write(target, front_matter.prepend_to(&body)).map_err(|source| {
        StagingError::WriteDescriptor {
            path: target.to_path_buf(),
            source,
        }
    })
}

/// Every regular file below `staging`, sorted by relative path. Symlinks
/// are not followed.
pub fn list_staged_files(staging: &Path) -> Result<Vec<StagedFile>, StagingError> {
    let list_err = |e: walkdir::Error| {
        let path = e.path().unwrap_or(staging).to_path_buf();
        StagingError::List {
            path,
            source: e.into(),
        }
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(staging).sort_by_file_name() {
        let entry = entry.map_err(list_err)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = entry.metadata().map_err(list_err)?;
        let relative = entry.path().strip_prefix(staging).unwrap_or(entry.path());
        files.push(StagedFile {
            path: relative.to_path_buf(),
            size: metadata.len(),
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn project(root: &Path) {
        fs::create_dir_all(root.join("openhands/server")).expect("create app dir");
        fs::write(root.join("openhands/__init__.py"), "").expect("write");
        fs::write(root.join("openhands/server/app.py"), "app = object()\n").expect("write");
        fs::write(root.join("app_hf.py"), "print('boot')\n").expect("write");
        fs::write(root.join("requirements.txt"), "uvicorn\n").expect("write");
        fs::write(root.join("Dockerfile_HF"), "FROM python:3.12\n").expect("write");
        fs::write(root.join("README_HF.md"), "# OpenHands\n").expect("write");
    }

    fn staged_paths(report: &StagingReport) -> Vec<String> {
        report
            .files
            .iter()
            .map(|f| f.path.display().to_string().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn stages_expected_tree() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());

        let report =
            stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
                .expect("stage");

        assert_eq!(
            staged_paths(&report),
            vec![
                "Dockerfile",
                "README.md",
                "app.py",
                "app_hf.py",
                "openhands/__init__.py",
                "openhands/server/app.py",
                "requirements.txt",
            ]
        );
        assert!(!report.env_template_staged);
        assert!(!dir.path().join("test_hf_space/.env").exists());
    }

    #[test]
    fn entry_point_matches_bootstrap_script() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());

        stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
            .expect("stage");

        let staging = dir.path().join("test_hf_space");
        let original = fs::read(dir.path().join("app_hf.py")).expect("read");
        assert_eq!(fs::read(staging.join("app_hf.py")).expect("read"), original);
        assert_eq!(fs::read(staging.join("app.py")).expect("read"), original);
    }

    #[test]
    fn readme_is_front_matter_plus_template() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());

        stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
            .expect("stage");

        let readme = fs::read_to_string(dir.path().join("test_hf_space/README.md")).expect("read");
        let header = FrontMatter::default().render();
        assert!(readme.starts_with(&header));
        assert_eq!(&readme[header.len()..], "# OpenHands\n");
    }

    #[test]
    fn env_template_copied_when_present() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        fs::write(dir.path().join(".env.hf"), "LLM_API_KEY=\n").expect("write");

        let mut steps = Vec::new();
        let report = stage(
            dir.path(),
            &PackageLayout::default(),
            &FrontMatter::default(),
            |step| steps.push(step.clone()),
        )
        .expect("stage");

        assert!(report.env_template_staged);
        assert_eq!(
            fs::read(dir.path().join("test_hf_space/.env")).expect("read"),
            b"LLM_API_KEY=\n"
        );
        assert!(matches!(
            steps.last(),
            Some(StagingStep::CopyEnvTemplate { .. })
        ));
    }

    #[test]
    fn reset_removes_previous_contents() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        fs::create_dir_all(dir.path().join("test_hf_space/stale")).expect("create");
        fs::write(dir.path().join("test_hf_space/stale/old.txt"), "old").expect("write");

        let report =
            stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
                .expect("stage");

        assert!(!dir.path().join("test_hf_space/stale").exists());
        assert!(staged_paths(&report).iter().all(|p| !p.starts_with("stale")));
    }

    #[test]
    fn refuses_to_reset_project_root() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let layout = PackageLayout {
            staging_dir: PathBuf::from("."),
            ..PackageLayout::default()
        };

        let err = stage(dir.path(), &layout, &FrontMatter::default(), |_| {}).unwrap_err();
        assert!(matches!(err, StagingError::UnsafeStagingDir { .. }));
        assert!(dir.path().join("app_hf.py").exists());
    }

    #[test]
    fn refuses_to_reset_ancestor_of_root() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("project");
        fs::create_dir_all(&root).expect("create");
        project(&root);
        let layout = PackageLayout {
            staging_dir: PathBuf::from(".."),
            ..PackageLayout::default()
        };

        let err = stage(&root, &layout, &FrontMatter::default(), |_| {}).unwrap_err();
        assert!(matches!(err, StagingError::UnsafeStagingDir { .. }));
    }

    #[test]
    fn refuses_staging_inside_app_dir() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let layout = PackageLayout {
            staging_dir: PathBuf::from("openhands/out"),
            ..PackageLayout::default()
        };

        let err = stage(dir.path(), &layout, &FrontMatter::default(), |_| {}).unwrap_err();
        assert!(matches!(err, StagingError::UnsafeStagingDir { .. }));
    }

    #[test]
    fn missing_source_leaves_partial_output() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        fs::remove_file(dir.path().join("Dockerfile_HF")).expect("remove");

        let err = stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
            .unwrap_err();
        assert!(matches!(err, StagingError::Copy { .. }));
        // Files copied before the failure stay for inspection
        assert!(dir.path().join("test_hf_space/requirements.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_in_app_dir_are_staged_as_files() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        fs::write(dir.path().join("shared.py"), "SHARED = 1\n").expect("write");
        std::os::unix::fs::symlink(
            dir.path().join("shared.py"),
            dir.path().join("openhands/server/shared.py"),
        )
        .expect("symlink");

        let report =
            stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
                .expect("stage");

        let staged = dir.path().join("test_hf_space/openhands/server/shared.py");
        let metadata = fs::symlink_metadata(&staged).expect("metadata");
        assert!(metadata.file_type().is_file());
        assert_eq!(fs::read(&staged).expect("read"), b"SHARED = 1\n");
        assert!(staged_paths(&report).contains(&"openhands/server/shared.py".to_string()));
    }

    #[test]
    fn deep_app_tree_is_copied_and_listed_in_order() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());
        let deep = dir.path().join("openhands/a/b/c");
        fs::create_dir_all(&deep).expect("create");
        fs::write(deep.join("z.py"), "z").expect("write");
        fs::write(deep.join("m.py"), "mm").expect("write");
        fs::create_dir_all(dir.path().join("openhands/empty")).expect("create");

        let report =
            stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
                .expect("stage");

        assert!(dir.path().join("test_hf_space/openhands/empty").is_dir());
        let paths = staged_paths(&report);
        let m = paths.iter().position(|p| p == "openhands/a/b/c/m.py");
        let z = paths.iter().position(|p| p == "openhands/a/b/c/z.py");
        assert!(matches!((m, z), (Some(m), Some(z)) if m < z));
        let mut sorted = report.files.clone();
        sorted.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(sorted, report.files);
    }

    #[cfg(unix)]
    #[test]
    fn listing_does_not_follow_symlinks() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("real.txt"), "abc").expect("write");
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .expect("symlink");

        let files = list_staged_files(dir.path()).expect("list");
        assert_eq!(
            files,
            vec![StagedFile {
                path: PathBuf::from("real.txt"),
                size: 3,
            }]
        );
    }

    #[test]
    fn staged_sizes_match_sources() {
        let dir = tempdir().expect("tempdir");
        project(dir.path());

        let report =
            stage(dir.path(), &PackageLayout::default(), &FrontMatter::default(), |_| {})
                .expect("stage");
        let manifest = report
            .files
            .iter()
            .find(|f| f.path == Path::new("requirements.txt"))
            .expect("manifest staged");
        assert_eq!(manifest.size, "uvicorn\n".len() as u64);
        assert_eq!(
            report.total_bytes(),
            report.files.iter().map(|f| f.size).sum::<u64>()
        );
    }
}
