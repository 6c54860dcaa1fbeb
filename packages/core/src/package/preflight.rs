//! Precondition check run before staging.

use super::layout::PackageLayout;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Which required paths were found. Every path is checked; nothing stops at
/// the first miss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreflightReport {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl PreflightReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check every required path of `layout` under `root`.
///
/// A directory where a file is expected (or the reverse) counts as missing.
pub fn check_required_files(root: &Path, layout: &PackageLayout) -> PreflightReport {
    let mut report = PreflightReport::default();

    for required in layout.required_paths() {
        let label = required.label();
        if required.is_satisfied_in(root) {
            debug!("Found required path: {label}");
            report.present.push(label);
        } else {
            debug!("Missing required path: {label}");
            report.missing.push(label);
        }
    }

    report
}
