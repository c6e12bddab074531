//! Bounded readiness polling for the map library

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Total probes, including the first (at least 1)
    pub attempts: u32,
    /// Delay between probes
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            attempts: 20,
            interval: Duration::from_millis(250),
        }
    }
}

/// Probe until `probe` reports ready or the attempts run out
///
/// Returns the number of probes used on success.
pub async fn wait_until_ready<F, Fut>(policy: ReadinessPolicy, mut probe: F) -> Result<u32, MapError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let attempts = policy.attempts.max(1);

    for attempt in 1..=attempts {
        if probe().await {
            debug!(attempt, "Map library ready");
            return Ok(attempt);
        }
        if attempt < attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    warn!(attempts, "Map library still not ready, giving up for now");
    Err(MapError::NotReady { attempts })
}
