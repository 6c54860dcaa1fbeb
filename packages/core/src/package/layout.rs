//! Source and destination names for a Space deployment.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where each deployable artifact lives in the project and where it lands in
/// the staging directory. All paths are relative to the project root unless
/// absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageLayout {
    /// Application code, copied recursively under the same name
    pub app_dir: PathBuf,
    /// Bootstrap script, staged under its own name and as `entry_point`
    pub bootstrap_script: PathBuf,
    /// Entry point name the platform runs
    pub entry_point: PathBuf,
    pub manifest: PathBuf,
    pub build_file: PathBuf,
    pub build_file_target: PathBuf,
    pub readme_template: PathBuf,
    pub readme_target: PathBuf,
    /// Optional; skipped silently when absent
    pub env_template: PathBuf,
    pub env_target: PathBuf,
    /// Scratch directory, wiped and recreated on every run
    pub staging_dir: PathBuf,
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("openhands"),
            bootstrap_script: PathBuf::from("app_hf.py"),
            entry_point: PathBuf::from("app.py"),
            manifest: PathBuf::from("requirements.txt"),
            build_file: PathBuf::from("Dockerfile_HF"),
            build_file_target: PathBuf::from("Dockerfile"),
            readme_template: PathBuf::from("README_HF.md"),
            readme_target: PathBuf::from("README.md"),
            env_template: PathBuf::from(".env.hf"),
            env_target: PathBuf::from(".env"),
            staging_dir: PathBuf::from("test_hf_space"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Dir,
    File,
}

/// A path that must exist before staging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPath {
    pub path: PathBuf,
    pub kind: PathKind,
}

impl RequiredPath {
    /// Name shown to operators; directories carry a trailing slash
    pub fn label(&self) -> String {
        match self.kind {
            PathKind::Dir => format!("{}/", self.path.display()),
            PathKind::File => self.path.display().to_string(),
        }
    }

    pub fn is_satisfied_in(&self, root: &Path) -> bool {
        let full = root.join(&self.path);
        match self.kind {
            PathKind::Dir => full.is_dir(),
            PathKind::File => full.is_file(),
        }
    }
}

impl PackageLayout {
    /// Preconditions in the order they are checked and reported
    pub fn required_paths(&self) -> Vec<RequiredPath> {
        vec![
            RequiredPath {
                path: self.app_dir.clone(),
                kind: PathKind::Dir,
            },
            RequiredPath {
                path: self.bootstrap_script.clone(),
                kind: PathKind::File,
            },
            RequiredPath {
                path: self.manifest.clone(),
                kind: PathKind::File,
            },
            RequiredPath {
                path: self.build_file.clone(),
                kind: PathKind::File,
            },
            RequiredPath {
                path: self.readme_template.clone(),
                kind: PathKind::File,
            },
        ]
    }

    /// Every project path staging reads from, joined onto `root`
    pub fn source_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.required_paths()
            .into_iter()
            .map(|required| root.join(required.path))
            .chain(std::iter::once(root.join(&self.env_template)))
            .collect()
    }

    pub fn staging_path(&self, root: &Path) -> PathBuf {
        root.join(&self.staging_dir)
    }

    /// Archive written next to the staging directory
    pub fn default_archive_path(&self, root: &Path) -> PathBuf {
        let staging = self.staging_path(root);
        let mut name = staging
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "space".into());
        name.push(".tar.gz");
        staging.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_required_labels() {
        let labels: Vec<_> = PackageLayout::default()
            .required_paths()
            .iter()
            .map(RequiredPath::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "openhands/",
                "app_hf.py",
                "requirements.txt",
                "Dockerfile_HF",
                "README_HF.md"
            ]
        );
    }

    #[test]
    fn env_template_is_not_required() {
        let layout = PackageLayout::default();
        assert!(
            layout
                .required_paths()
                .iter()
                .all(|p| p.path != layout.env_template)
        );
    }

    #[test]
    fn archive_sits_next_to_staging_dir() {
        let layout = PackageLayout::default();
        assert_eq!(
            layout.default_archive_path(Path::new("/work")),
            PathBuf::from("/work/test_hf_space.tar.gz")
        );
    }

    #[test]
    fn source_paths_include_optional_env_template() {
        let sources = PackageLayout::default().source_paths(Path::new("/work"));
        assert_eq!(sources.len(), 6);
        assert!(sources.contains(&PathBuf::from("/work/openhands")));
        assert!(sources.contains(&PathBuf::from("/work/.env.hf")));
        assert!(!sources.contains(&PathBuf::from("/work/test_hf_space")));
    }
}
