//! Readiness probing for the launched backend.

use super::ServerError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Per-request timeout for a single probe
pub const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Raw outcome of one HTTP request against the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpProbe {
    Healthy,
    ConnectionRefused,
    Timeout,
    Unhealthy(u16),
    Failed,
}

/// What a probe says about the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessStatus {
    Ready,
    Starting,
    Unhealthy(u16),
    CheckFailed,
}

/// Final result of waiting for readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    Ready { elapsed: Duration },
    TimedOut { last: ReadinessStatus, waited: Duration },
}

pub fn map_readiness_status(probe: HttpProbe) -> ReadinessStatus {
    match probe {
        HttpProbe::Healthy => ReadinessStatus::Ready,
        HttpProbe::ConnectionRefused | HttpProbe::Timeout => ReadinessStatus::Starting,
        HttpProbe::Unhealthy(code) => ReadinessStatus::Unhealthy(code),
        HttpProbe::Failed => ReadinessStatus::CheckFailed,
    }
}

pub fn probe_client() -> Result<reqwest::Client, ServerError> {
    reqwest::Client::builder()
        .timeout(PROBE_REQUEST_TIMEOUT)
        .no_proxy()
        .build()
        .map_err(ServerError::ProbeClient)
}

/// Issue a single GET against `url`
pub async fn probe_once(client: &reqwest::Client, url: &str) -> HttpProbe {
    match client.get(url).send().await {
        Ok(response) if response.status().is_success() => HttpProbe::Healthy,
        Ok(response) => HttpProbe::Unhealthy(response.status().as_u16()),
        Err(e) if e.is_timeout() => HttpProbe::Timeout,
        Err(e) if e.is_connect() => HttpProbe::ConnectionRefused,
        Err(e) => {
            debug!("Health probe error: {e}");
            HttpProbe::Failed
        }
    }
}

/// Poll `url` every `interval` until it answers 2xx or `timeout` elapses.
pub async fn wait_until_ready(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    interval: Duration,
) -> ReadinessOutcome {
    let started = Instant::now();

    loop {
        let last = map_readiness_status(probe_once(client, url).await);
        if last == ReadinessStatus::Ready {
            return ReadinessOutcome::Ready {
                elapsed: started.elapsed(),
            };
        }
        debug!("Backend not ready yet: {last:?}");

        if started.elapsed() + interval > timeout {
            warn!("Backend did not become ready within {timeout:?}");
            return ReadinessOutcome::TimedOut {
                last,
                waited: started.elapsed(),
            };
        }
        tokio::time::sleep(interval).await;
    }
}
