//! Exponential backoff for RESTCONF reads.
//!
//! Only reads go through here. A mutation that timed out may still have been
//! applied, so PATCH/POST/DELETE are sent exactly once.

use std::thread;

use log::warn;

use crate::error::{Error, Result};
use crate::types::RetryConfig;

/// Notified before each retry of a read.
pub trait RetryCallback {
    /// Called after attempt `attempt` failed and before sleeping.
    ///
    /// # Arguments
    /// * `attempt` - Attempt that just failed (1-indexed)
    /// * `max_attempts` - Maximum number of attempts
    /// * `error` - The error that triggered the retry
    /// * `delay_ms` - Milliseconds until next attempt
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay_ms: u128);
}

/// Callback that logs retries at warn level.
pub struct LogCallback;

impl RetryCallback for LogCallback {
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay_ms: u128) {
        warn!("Attempt {attempt}/{max_attempts} failed: {error}. Retrying in {delay_ms}ms");
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts.
///
/// Only errors whose category is retryable are tried again; the delay grows by
/// `backoff_factor` up to `max_delay`.
///
/// # Returns
/// The first success, the first permanent error, or the last retryable one.
pub fn with_retry<T, F>(config: &RetryConfig, callback: Option<&dyn RetryCallback>, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error: Option<Error> = None;

    for attempt in 0..config.max_attempts {
        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }

                if attempt + 1 >= config.max_attempts {
                    last_error = Some(e);
                    break;
                }

                let delay = config.delay_for_attempt(attempt);
                if let Some(cb) = callback {
                    cb.on_retry(attempt + 1, config.max_attempts, &e, delay.as_millis());
                }

                thread::sleep(delay);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::http("no attempts made", None)))
}
