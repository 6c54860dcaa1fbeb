//! Staging error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the staging stage. Partial output is left on disk.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Refusing to reset staging directory {}: {reason}", path.display())]
    UnsafeStagingDir { path: PathBuf, reason: &'static str },

    #[error("Failed to reset staging directory {}: {source}", path.display())]
    Reset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read README template {}: {source}", path.display())]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteDescriptor {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to list staged files in {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Refusing to write archive {} inside the staging directory", path.display())]
    ArchiveInsideStaging { path: PathBuf },

    #[error("Refusing to write archive {} over project file {}", path.display(), input.display())]
    ArchiveOverwritesSource { path: PathBuf, input: PathBuf },

    #[error("Failed to write archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
