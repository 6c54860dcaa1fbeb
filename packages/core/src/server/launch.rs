//! Hand-off to the backend server process
//!
//! The backend runs as a child process with the resolved configuration in
//! its environment. This process lives exactly as long as the child does.

use super::health::{ReadinessOutcome, probe_client, wait_until_ready};
use super::settings::LaunchCommand;
use super::ServerError;
use crate::config::ResolvedEnv;
use std::future::Future;
use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// How long the backend gets to exit on its own after a shutdown request
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Default time to wait for the health endpoint after launch
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(120);

pub const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Health URL to poll, or None to skip readiness probing
    pub health_url: Option<String>,
    pub ready_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            health_url: None,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }
}

/// Spawn the backend and wait for it to exit.
///
/// `on_ready` is called at most once, when readiness probing finishes.
/// Ctrl-C or SIGTERM is forwarded to the child as SIGTERM; it then gets
/// `options.shutdown_grace` to stop before it is killed.
pub async fn run_server(
    command: &LaunchCommand,
    env: &ResolvedEnv,
    options: &LaunchOptions,
    on_ready: impl FnMut(ReadinessOutcome),
) -> Result<ExitStatus, ServerError> {
    run_server_until(command, env, options, on_ready, shutdown_signal()).await
}

/// Like [`run_server`], with the shutdown request supplied by the caller
pub async fn run_server_until(
    command: &LaunchCommand,
    env: &ResolvedEnv,
    options: &LaunchOptions,
    mut on_ready: impl FnMut(ReadinessOutcome),
    shutdown: impl Future<Output = io::Result<()>>,
) -> Result<ExitStatus, ServerError> {
    let mut child = Command::new(&command.program)
        .args(&command.args)
        .envs(env.iter())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ServerError::Spawn {
            program: command.program.clone(),
            source,
        })?;
    info!(pid = ?child.id(), "Backend started: {}", command.display());

    let probe = match options.health_url.as_deref() {
        Some(_) => Some(probe_client()?),
        None => None,
    };
    let readiness = async {
        match (probe.as_ref(), options.health_url.as_deref()) {
            (Some(client), Some(url)) => {
                wait_until_ready(client, url, options.ready_timeout, READY_POLL_INTERVAL).await
            }
            _ => std::future::pending().await,
        }
    };
    tokio::pin!(readiness);
    tokio::pin!(shutdown);
    let mut probing = options.health_url.is_some();

    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(ServerError::Wait)?;
                debug!("Backend exited with {status}");
                return Ok(status);
            }
            outcome = &mut readiness, if probing => {
                probing = false;
                on_ready(outcome);
            }
            requested = &mut shutdown => {
                requested.map_err(ServerError::Signal)?;
                info!("Shutdown requested, waiting for backend to stop");
                return stop_child(&mut child, options.shutdown_grace).await;
            }
        }
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it
#[cfg(unix)]
async fn shutdown_signal() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            debug!("Received SIGINT");
            result
        }
        _ = terminate.recv() => {
            debug!("Received SIGTERM");
            Ok(())
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}

async fn stop_child(child: &mut Child, grace: Duration) -> Result<ExitStatus, ServerError> {
    request_stop(child);
    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status.map_err(ServerError::Wait),
        Err(_) => {
            warn!("Backend did not stop within {grace:?}, killing it");
            child.kill().await.map_err(ServerError::Wait)?;
            child.wait().await.map_err(ServerError::Wait)
        }
    }
}

#[cfg(unix)]
fn request_stop(child: &Child) {
    let Some(pid) = child.id().and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return;
    };
    // SAFETY: kill(2) only sends a signal; pid is our unreaped child
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        warn!(
            "Failed to send SIGTERM to backend (pid {pid}): {}",
            io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn request_stop(_child: &Child) {}
