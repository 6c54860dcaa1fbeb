//! Gzipped tar archive of a staged tree.

use super::error::StagingError;
use super::staging::StagingReport;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tar::Builder as TarBuilder;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub size: u64,
}

/// Write every staged file to `archive_path`, named relative to the staging
/// directory. Headers are deterministic so identical trees produce
/// identical archives.
///
/// `sources` are the project files and directories staging reads from. The
/// archive may not land on or inside any of them, nor inside the staging
/// directory. Paths are compared after resolving symlinks and `..`.
pub fn write_archive(
    report: &StagingReport,
    archive_path: &Path,
    sources: &[PathBuf],
) -> Result<ArchiveReport, StagingError> {
    check_archive_target(report, archive_path, sources)?;

    let archive_err = |source| StagingError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };

    debug!(
        "Writing {} staged files to {}",
        report.files.len(),
        archive_path.display()
    );
    let file = File::create(archive_path).map_err(archive_err)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = TarBuilder::new(encoder);
    tar.mode(tar::HeaderMode::Deterministic);

    for staged in &report.files {
        tar.append_path_with_name(report.staging_dir.join(&staged.path), &staged.path)
            .map_err(archive_err)?;
    }

    let encoder = tar.into_inner().map_err(archive_err)?;
    encoder.finish().map_err(archive_err)?;

    let size = fs::metadata(archive_path).map_err(archive_err)?.len();
    Ok(ArchiveReport {
        path: archive_path.to_path_buf(),
        size,
    })
}

fn check_archive_target(
    report: &StagingReport,
    archive_path: &Path,
    sources: &[PathBuf],
) -> Result<(), StagingError> {
    let resolve_err = |source| StagingError::Archive {
        path: archive_path.to_path_buf(),
        source,
    };
    let target = resolve_archive_path(archive_path).map_err(resolve_err)?;
    let staging = fs::canonicalize(&report.staging_dir).map_err(resolve_err)?;
    if target.starts_with(&staging) {
        return Err(StagingError::ArchiveInsideStaging {
            path: archive_path.to_path_buf(),
        });
    }

    for source in sources {
        let Ok(source) = fs::canonicalize(source) else {
            continue;
        };
        if target.starts_with(&source) {
            return Err(StagingError::ArchiveOverwritesSource {
                path: archive_path.to_path_buf(),
                input: source,
            });
        }
    }
    Ok(())
}

/// `path` with symlinks and `..` resolved. The file itself need not exist
/// but its parent directory must.
fn resolve_archive_path(path: &Path) -> io::Result<PathBuf> {
    if let Ok(existing) = fs::canonicalize(path) {
        return Ok(existing);
    }
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "archive path has no file name")
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(fs::canonicalize(parent)?.join(name))
}
