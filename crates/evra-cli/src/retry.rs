use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Retry schedule for transient network failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

/// Runs `op` until it succeeds or the policy is exhausted, sleeping
/// between attempts with exponential backoff.
///
/// At least one attempt is always made, even with `max_attempts` of
/// zero. On exhaustion the last error is returned.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let attempts = policy.max_attempts.max(1);
    let mut delay = policy.delay;
    let mut last_error = None;

    for attempt in 1..=attempts {
        match op() {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt < attempts {
                    warn!(
                        "{label}: attempt {attempt}/{attempts} failed ({error}), \
                         retrying in {delay:?}"
                    );
                    thread::sleep(delay);
                    delay = delay.mul_f64(policy.backoff_multiplier);
                }
                last_error = Some(error);
            }
        }
    }

    Err(last_error.expect("at least one attempt was made"))
}
