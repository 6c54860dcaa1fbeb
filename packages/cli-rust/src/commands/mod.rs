//! CLI command implementations
//!
//! This module contains the implementations for the serve, provision and
//! package commands.

mod package;
mod provision;
mod serve;

pub use package::{PackageArgs, cmd_package};
pub use provision::{ProvisionArgs, cmd_provision};
pub use serve::{ServeArgs, cmd_serve};
