//! Configuration schema for openhands-space
//!
//! The backend is configured entirely through environment variables. This
//! module names every variable the provisioner knows about and holds the
//! table of defaults applied when the operator has not set one.

use serde::Serialize;
use std::path::PathBuf;

pub const OPENHANDS_RUNTIME: &str = "OPENHANDS_RUNTIME";
pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
pub const SERVE_FRONTEND: &str = "SERVE_FRONTEND";
pub const FILE_STORE_PATH: &str = "FILE_STORE_PATH";
pub const CACHE_DIR: &str = "CACHE_DIR";
pub const JWT_SECRET: &str = "JWT_SECRET";
pub const DISABLE_SECURITY: &str = "DISABLE_SECURITY";
pub const SANDBOX_RUNTIME_CONTAINER_IMAGE: &str = "SANDBOX_RUNTIME_CONTAINER_IMAGE";
pub const SANDBOX_USER_ID: &str = "SANDBOX_USER_ID";
pub const WORKSPACE_BASE: &str = "WORKSPACE_BASE";
pub const OPENHANDS_DISABLE_AUTH: &str = "OPENHANDS_DISABLE_AUTH";
pub const ENABLE_AUTO_LINT: &str = "ENABLE_AUTO_LINT";
pub const ENABLE_SECURITY_ANALYSIS: &str = "ENABLE_SECURITY_ANALYSIS";
pub const SETTINGS_STORE_TYPE: &str = "SETTINGS_STORE_TYPE";
pub const SECRETS_STORE_TYPE: &str = "SECRETS_STORE_TYPE";
pub const DEFAULT_LLM_MODEL: &str = "DEFAULT_LLM_MODEL";
pub const DEFAULT_LLM_BASE_URL: &str = "DEFAULT_LLM_BASE_URL";
pub const SKIP_SETTINGS_MODAL: &str = "SKIP_SETTINGS_MODAL";
pub const DEFAULT_AGENT: &str = "DEFAULT_AGENT";
pub const DEFAULT_LANGUAGE: &str = "DEFAULT_LANGUAGE";
pub const CONFIRMATION_MODE: &str = "CONFIRMATION_MODE";
pub const MAX_ITERATIONS: &str = "MAX_ITERATIONS";
pub const MAX_BUDGET_PER_TASK: &str = "MAX_BUDGET_PER_TASK";

/// Read-only variables reported in the status summary but never defaulted.
pub const PORT: &str = "PORT";
pub const LLM_API_KEY: &str = "LLM_API_KEY";
pub const LLM_MODEL: &str = "LLM_MODEL";
pub const LLM_BASE_URL: &str = "LLM_BASE_URL";

/// A single "set if absent" rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvDefault {
    pub key: &'static str,
    pub value: &'static str,
}

const fn default(key: &'static str, value: &'static str) -> EnvDefault {
    EnvDefault { key, value }
}

/// Defaults for a public Hugging Face Space deployment.
///
/// `JWT_SECRET` is absent on purpose: it is generated per process rather
/// than taken from a fixed table.
pub const SPACE_DEFAULTS: &[EnvDefault] = &[
    default(OPENHANDS_RUNTIME, "local"),
    default(CORS_ALLOWED_ORIGINS, "*"),
    default(SERVE_FRONTEND, "false"),
    default(FILE_STORE_PATH, "/tmp/openhands"),
    default(CACHE_DIR, "/tmp/cache"),
    default(DISABLE_SECURITY, "true"),
    default(SANDBOX_RUNTIME_CONTAINER_IMAGE, ""),
    default(SANDBOX_USER_ID, "1000"),
    default(WORKSPACE_BASE, "/tmp/workspace"),
    default(OPENHANDS_DISABLE_AUTH, "true"),
    default(ENABLE_AUTO_LINT, "false"),
    default(ENABLE_SECURITY_ANALYSIS, "false"),
    default(SETTINGS_STORE_TYPE, "memory"),
    default(SECRETS_STORE_TYPE, "memory"),
    default(
        DEFAULT_LLM_MODEL,
        "openrouter/anthropic/claude-3-haiku-20240307",
    ),
    default(DEFAULT_LLM_BASE_URL, "https://openrouter.ai/api/v1"),
    default(SKIP_SETTINGS_MODAL, "true"),
    default(DEFAULT_AGENT, "CodeActAgent"),
    default(DEFAULT_LANGUAGE, "en"),
    default(CONFIRMATION_MODE, "false"),
    default(MAX_ITERATIONS, "30"),
    default(MAX_BUDGET_PER_TASK, "10.0"),
];

/// Typed view over a resolved configuration set
///
/// Built once from [`super::ResolvedEnv`] and handed to the components that
/// need it. The session secret is intentionally not part of this view.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpaceConfig {
    /// Runtime the backend uses for agent actions ("local" disables Docker)
    pub runtime: String,

    /// Allowed web origins for the API
    pub cors_allowed_origins: String,

    /// Whether the backend also serves the web frontend
    pub serve_frontend: bool,

    pub file_store_path: PathBuf,
    pub cache_dir: PathBuf,
    pub workspace_base: PathBuf,

    pub security_disabled: bool,
    pub auth_disabled: bool,

    /// Empty string means container-based execution is disabled
    pub sandbox_container_image: String,
    pub sandbox_user_id: String,

    pub settings_store_type: String,
    pub secrets_store_type: String,

    pub default_llm_model: String,
    pub default_llm_base_url: String,

    pub max_iterations: u32,
    pub max_budget_per_task: f64,

    /// Whether `LLM_API_KEY` is set (the value itself is never kept)
    pub llm_api_key_present: bool,

    /// Whether a session secret is available after resolution
    pub jwt_secret_present: bool,
}

impl SpaceConfig {
    /// Whether the backend accepts requests from any origin
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.trim() == "*"
    }

    /// Whether container-based sandbox execution is turned off
    pub fn container_sandbox_disabled(&self) -> bool {
        self.sandbox_container_image.is_empty()
    }
}
