//! Where and how the backend is served.

use super::ServerError;
use crate::config::{ResolvedEnv, schema};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Hugging Face Spaces routes traffic to this port unless told otherwise.
pub const DEFAULT_PORT: u16 = 7860;

/// Bind to every interface so the platform's proxy can reach the server.
pub const BIND_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Import path of the backend's ASGI application object
pub const DEFAULT_APP_TARGET: &str = "openhands.server.app:app";

/// Interpreter used to run the ASGI server
pub const DEFAULT_PYTHON: &str = "python";

/// Endpoints the backend exposes, listed for operators in the status output
pub const API_ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/api/options/config"),
    ("POST", "/api/conversations"),
];

pub const HEALTH_PATH: &str = "/health";

/// A program plus arguments, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// Shell-like rendering for status output
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
    pub python: String,
    pub app_target: String,
}

impl ServerSettings {
    /// Resolve settings from the configuration set, reading `PORT`.
    pub fn from_env(env: &ResolvedEnv) -> Result<Self, ServerError> {
        Ok(Self {
            host: BIND_HOST,
            port: resolve_port(env.get(schema::PORT))?,
            python: DEFAULT_PYTHON.to_string(),
            app_target: DEFAULT_APP_TARGET.to_string(),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The uvicorn invocation that serves the application object
    pub fn command(&self) -> LaunchCommand {
        LaunchCommand {
            program: self.python.clone(),
            args: vec![
                "-m".to_string(),
                "uvicorn".to_string(),
                self.app_target.clone(),
                "--host".to_string(),
                self.host.to_string(),
                "--port".to_string(),
                self.port.to_string(),
                "--log-level".to_string(),
                "info".to_string(),
                "--access-log".to_string(),
            ],
        }
    }

    /// Health endpoint as reachable from this machine
    pub fn health_url(&self) -> String {
        let host = if self.host.is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
        };
        format!("http://{}{HEALTH_PATH}", SocketAddr::new(host, self.port))
    }
}

/// Parse a port value, falling back to [`DEFAULT_PORT`] when unset or blank.
pub fn resolve_port(raw: Option<&str>) -> Result<u16, ServerError> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(DEFAULT_PORT);
    };

    value
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ServerError::InvalidPort {
            value: value.to_string(),
        })
}
