//! Environment provisioning
//!
//! Resolves the configuration set, validates it, and materializes the
//! writable directories the backend expects before it starts serving.

use crate::config::{
    self, ConfigError, OperatorEnv, ResolvedEnv, SpaceConfig, ValidationError, ValidationWarning,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Mode used for directories the provisioner creates
pub const DIR_MODE: u32 = 0o755;

/// Fatal provisioning errors. The server must not start after any of these.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exists but is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

/// Result of a successful provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub env: ResolvedEnv,
    pub config: SpaceConfig,
    pub warnings: Vec<ValidationWarning>,
}

impl ProvisionOutcome {
    pub fn file_store_path(&self) -> &Path {
        &self.config.file_store_path
    }

    pub fn cache_dir(&self) -> &Path {
        &self.config.cache_dir
    }

    pub fn workspace_dir(&self) -> &Path {
        &self.config.workspace_base
    }
}

/// Resolve defaults, validate, and create the backend's directories.
///
/// Feeding `outcome.env.to_operator_env()` back in produces the same
/// configuration and never generates a second secret.
pub fn prepare_environment(overrides: &OperatorEnv) -> Result<ProvisionOutcome, ProvisionError> {
    let env = config::resolve_space_env(overrides);
    let space_config = env.to_config()?;
    let warnings = config::validate_config(&space_config)?;

    for dir in [
        &space_config.file_store_path,
        &space_config.cache_dir,
        &space_config.workspace_base,
    ] {
        ensure_dir(dir)?;
    }

    Ok(ProvisionOutcome {
        env,
        config: space_config,
        warnings,
    })
}

/// Create `path` and its parents if missing. Existing directories are fine.
pub fn ensure_dir(path: &Path) -> Result<(), ProvisionError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(ProvisionError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        debug!("Directory already exists: {}", path.display());
        return Ok(());
    }

    debug!("Creating directory: {}", path.display());
    dir_builder()
        .create(path)
        .map_err(|source| ProvisionError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

fn dir_builder() -> fs::DirBuilder {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
}
