//! Bounded retries with exponential backoff for calls into external collaborators.
//!
//! A [`RetryPolicy`] only decides *when* to try again. Whether an error is worth retrying at all is
//! decided per call by a predicate, so that known-permanent failures surface immediately.

use std::{future::Future, time::Duration};

use rand::Rng;
use tracing::{debug, warn};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Default upper bound (exclusive) of the random jitter added to every delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(100);

/// How many times and how far apart a failed call is retried.
///
/// The delay before retry `n` (0-based) is `initial_backoff * 2^n` plus a uniformly random jitter
/// in `[0, max_jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub max_retries: usize,

    /// Delay before the first retry.
    pub initial_backoff: Duration,

    /// Upper bound (exclusive) of the random jitter.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new policy.
    pub const fn new(max_retries: usize, initial_backoff: Duration, max_jitter: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            max_jitter,
        }
    }

    /// A policy that makes a single attempt.
    pub const fn no_retry() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// The delay to wait after the failed attempt number `attempt` (0-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        let factor = 1u32 << attempt.min(31);
        let backoff = self.initial_backoff.saturating_mul(factor);

        let max_jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if max_jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..max_jitter_ms))
        };

        backoff.saturating_add(jitter)
    }
}

/// Runs `generator` until it succeeds, `is_permanent` flags the error, or the policy runs out of
/// retries. The last error is returned.
pub async fn retry_with<A, E, Fut, Gen, P>(
    policy: &RetryPolicy,
    is_permanent: P,
    mut generator: Gen,
) -> Result<A, E>
where
    E: std::fmt::Display,
    Fut: Future<Output = Result<A, E>>,
    Gen: FnMut() -> Fut,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        debug!(%attempt, "making attempt");

        match generator().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if is_permanent(&error) {
                    debug!(%error, "permanent error, not retrying");
                    return Err(error);
                }

                if attempt >= policy.max_retries {
                    return Err(error);
                }

                let delay = policy.delay(attempt);
                warn!(%attempt, %error, ?delay, "attempt failed, retrying");

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
