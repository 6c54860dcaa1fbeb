//! Hugging Face Space packaging
//!
//! This module provides:
//! - The source/destination layout of a Space deployment
//! - Precondition checks that report every missing file at once
//! - Destructive staging into a scratch directory
//! - README front matter synthesis
//! - Optional tar.gz archiving of the staged tree
//! - The advisory deploy-token check
//! - The pipeline that runs these stages in order

mod archive;
mod credential;
mod error;
mod front_matter;
mod layout;
mod pipeline;
mod preflight;
mod staging;

pub use archive::{ArchiveReport, write_archive};
pub use credential::{CredentialStatus, HF_TOKEN, check_credential};
pub use error::StagingError;
pub use front_matter::FrontMatter;
pub use layout::{PackageLayout, PathKind, RequiredPath};
pub use pipeline::{
    ArchiveTarget, PipelineObserver, PipelineReport, PipelineRequest, Stage, StageOutcome,
    StagingSummary, run_pipeline,
};
pub use preflight::{PreflightReport, check_required_files};
pub use staging::{StagedFile, StagingReport, StagingStep, list_staged_files, stage};
