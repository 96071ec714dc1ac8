//! Debounced readiness polling.
//!
//! A resource only counts as ready once it has reported [`AVAILABLE`] for
//! several consecutive samples. A single non-available sample resets the
//! count. The wait is bounded by a wall-clock deadline and can be cancelled
//! cooperatively through a [`CancellationToken`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backend::AVAILABLE;
use crate::fault::{self, ProviderError, ResourceKind};

/// Pause between two status samples.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Consecutive `available` samples required to confirm readiness.
pub const DEFAULT_REQUIRED_CONFIRMATIONS: u32 = 4;

/// How a wait phase ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadinessOutcome {
    /// The resource reported `available` for the required number of
    /// consecutive samples.
    Stable {
        /// Total number of samples taken, including resets.
        samples: u32,
    },
    /// The deadline elapsed before readiness was confirmed.
    TimedOut {
        /// Last status observed, if any sample was taken.
        last_status: Option<String>,
    },
    /// The cancellation token fired.
    Cancelled,
    /// The resource disappeared while being polled.
    Vanished,
    /// A status probe failed with a provider error.
    ProbeFailed(ProviderError),
}

impl ReadinessOutcome {
    /// Returns `true` only for [`ReadinessOutcome::Stable`].
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Stable { .. })
    }
}

impl fmt::Display for ReadinessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable { samples } => write!(f, "ready and stable after {samples} samples"),
            Self::TimedOut {
                last_status: Some(status),
            } => write!(f, "timed out, last status {status}"),
            Self::TimedOut { last_status: None } => f.write_str("timed out before any sample"),
            Self::Cancelled => f.write_str("wait cancelled"),
            Self::Vanished => f.write_str("resource disappeared while waiting"),
            Self::ProbeFailed(err) => write!(f, "status probe failed: {err}"),
        }
    }
}

/// Samples a resource's status until it is stably available.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadinessPoller {
    poll_interval: Duration,
    required_confirmations: u32,
}

impl Default for ReadinessPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_REQUIRED_CONFIRMATIONS)
    }
}

impl ReadinessPoller {
    /// Creates a poller. A confirmation count of zero is raised to one.
    #[must_use]
    pub fn new(poll_interval: Duration, required_confirmations: u32) -> Self {
        Self {
            poll_interval,
            required_confirmations: required_confirmations.max(1),
        }
    }

    /// Pause between samples.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Consecutive `available` samples required.
    #[must_use]
    pub const fn required_confirmations(&self) -> u32 {
        self.required_confirmations
    }

    /// Polls `probe` until the resource is stably available, the deadline
    /// `timeout` from now elapses, or `cancel` fires.
    ///
    /// The deadline and the token are checked before every sample, and the
    /// sleep between samples ends early on cancellation. A not-found fault
    /// from the probe ends the wait as [`ReadinessOutcome::Vanished`]; any
    /// other probe error ends it as [`ReadinessOutcome::ProbeFailed`].
    pub async fn wait_until_available<F, Fut>(
        &self,
        resource: ResourceKind,
        identifier: &str,
        timeout: Duration,
        cancel: &CancellationToken,
        mut probe: F,
    ) -> ReadinessOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, ProviderError>>,
    {
        let started = Instant::now();
        let deadline = started.checked_add(timeout);
        let mut confirmations = 0_u32;
        let mut samples = 0_u32;
        let mut last_status = None;

        loop {
            if cancel.is_cancelled() {
                warn!(%resource, identifier, "wait cancelled");
                return ReadinessOutcome::Cancelled;
            }
            if deadline.is_some_and(|limit| Instant::now() >= limit) {
                warn!(
                    %resource,
                    identifier,
                    elapsed_secs = started.elapsed().as_secs(),
                    last_status = last_status.as_deref().unwrap_or("none"),
                    "deadline expired before {resource} was confirmed ready"
                );
                return ReadinessOutcome::TimedOut { last_status };
            }

            samples = samples.saturating_add(1);
            let status = match probe().await {
                Ok(status) => status,
                Err(err) => {
                    let classified = fault::report(&err, resource, identifier, "describe");
                    if classified.is_not_found() {
                        return ReadinessOutcome::Vanished;
                    }
                    return ReadinessOutcome::ProbeFailed(err);
                }
            };

            if status == AVAILABLE {
                confirmations = confirmations.saturating_add(1);
                info!(
                    %resource,
                    identifier,
                    "{resource} ready test {confirmations}/{}",
                    self.required_confirmations
                );
                if confirmations >= self.required_confirmations {
                    info!(%resource, identifier, samples, "{resource} ready and stable");
                    return ReadinessOutcome::Stable { samples };
                }
            } else {
                if confirmations > 0 {
                    info!(
                        %resource,
                        identifier,
                        confirmations,
                        "confirmation count reset"
                    );
                }
                confirmations = 0;
                info!(%resource, identifier, status = %status, "{resource} not ready");
            }
            last_status = Some(status);

            tokio::select! {
                () = sleep(self.poll_interval) => {}
                () = cancel.cancelled() => {
                    warn!(%resource, identifier, "wait cancelled");
                    return ReadinessOutcome::Cancelled;
                }
            }
        }
    }
}
