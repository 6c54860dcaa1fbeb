//! Set-if-absent resolution of the configuration set
//!
//! Resolution is a pure function of the operator's environment and a
//! defaults table. Nothing here reads or writes the process environment
//! except [`OperatorEnv::from_process`].

use super::ConfigError;
use super::schema::{self, EnvDefault, SpaceConfig};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::debug;

/// Snapshot of operator-supplied configuration values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorEnv {
    vars: BTreeMap<String, String>,
}

impl OperatorEnv {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped; the
    /// backend cannot read them as strings either.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Return a copy with `key` forced to `value` (used for CLI overrides).
    pub fn with_override(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }
}

/// The configuration set after defaults have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnv {
    vars: BTreeMap<String, String>,
    defaulted: BTreeSet<String>,
    secret_generated: bool,
}

impl ResolvedEnv {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// True if `key` is set to a non-empty value
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// Every resolved variable, operator values and defaults alike
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys whose value came from the defaults table in this resolution
    pub fn defaulted_keys(&self) -> impl Iterator<Item = &str> {
        self.defaulted.iter().map(String::as_str)
    }

    pub fn was_defaulted(&self, key: &str) -> bool {
        self.defaulted.contains(key)
    }

    /// Whether the session secret was generated during this resolution
    pub fn secret_generated(&self) -> bool {
        self.secret_generated
    }

    /// Feed this set back in as operator values.
    ///
    /// Resolving the result again changes nothing, which is what makes
    /// provisioning idempotent within a process.
    pub fn to_operator_env(&self) -> OperatorEnv {
        OperatorEnv {
            vars: self.vars.clone(),
        }
    }

    /// Build the typed configuration view
    pub fn to_config(&self) -> Result<SpaceConfig, ConfigError> {
        Ok(SpaceConfig {
            runtime: self.string(schema::OPENHANDS_RUNTIME),
            cors_allowed_origins: self.string(schema::CORS_ALLOWED_ORIGINS),
            serve_frontend: self.flag(schema::SERVE_FRONTEND),
            file_store_path: self.path(schema::FILE_STORE_PATH),
            cache_dir: self.path(schema::CACHE_DIR),
            workspace_base: self.path(schema::WORKSPACE_BASE),
            security_disabled: self.flag(schema::DISABLE_SECURITY),
            auth_disabled: self.flag(schema::OPENHANDS_DISABLE_AUTH),
            sandbox_container_image: self.string(schema::SANDBOX_RUNTIME_CONTAINER_IMAGE),
            sandbox_user_id: self.string(schema::SANDBOX_USER_ID),
            settings_store_type: self.string(schema::SETTINGS_STORE_TYPE),
            secrets_store_type: self.string(schema::SECRETS_STORE_TYPE),
            default_llm_model: self.string(schema::DEFAULT_LLM_MODEL),
            default_llm_base_url: self.string(schema::DEFAULT_LLM_BASE_URL),
            max_iterations: self.parsed(schema::MAX_ITERATIONS, "a whole number")?,
            max_budget_per_task: self.parsed(schema::MAX_BUDGET_PER_TASK, "a number")?,
            llm_api_key_present: self.is_set(schema::LLM_API_KEY),
            jwt_secret_present: self.is_set(schema::JWT_SECRET),
        })
    }

    fn string(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    fn path(&self, key: &str) -> PathBuf {
        PathBuf::from(self.get(key).unwrap_or_default())
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(parse_flag)
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str, expected: &str) -> Result<T, ConfigError> {
        let raw = self.get(key).unwrap_or_default();
        raw.trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
                expected: expected.to_string(),
            })
    }
}

/// Interpret a textual boolean the way the backend does
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Apply `defaults` to `overrides` with set-if-absent semantics.
///
/// Any key the operator set wins, even when set to an empty string. The
/// session secret is the exception: an empty `JWT_SECRET` is treated as
/// missing and `generate_secret` is called to fill it. `generate_secret` is
/// never called when a secret is already present.
pub fn resolve_env(
    overrides: &OperatorEnv,
    defaults: &[EnvDefault],
    generate_secret: impl FnOnce() -> String,
) -> ResolvedEnv {
    let mut vars = overrides.vars.clone();
    let mut defaulted = BTreeSet::new();

    for entry in defaults {
        if !vars.contains_key(entry.key) {
            debug!("Defaulting {} to {:?}", entry.key, entry.value);
            vars.insert(entry.key.to_string(), entry.value.to_string());
            defaulted.insert(entry.key.to_string());
        }
    }

    let secret_missing = vars
        .get(schema::JWT_SECRET)
        .is_none_or(|value| value.is_empty());
    if secret_missing {
        debug!("Generating {}", schema::JWT_SECRET);
        vars.insert(schema::JWT_SECRET.to_string(), generate_secret());
        defaulted.insert(schema::JWT_SECRET.to_string());
    }

    ResolvedEnv {
        vars,
        defaulted,
        secret_generated: secret_missing,
    }
}
