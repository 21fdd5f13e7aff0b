// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retry/backoff helper for provider calls (§5): exponential backoff with
//! jitter, an overall deadline, and per-attempt metadata for logging.

use std::future::Future;
use std::time::{Duration, Instant, SystemTime};

use orderflow_error::{ErrorCode, OrderFlowError};
use tracing::{debug, warn};

/// Configuration for retry behavior around a provider call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay cap for exponential backoff.
    pub max_delay: Duration,
    /// Overall wall-clock timeout across all attempts.
    pub overall_timeout: Duration,
    /// Jitter factor in `[0.0, 1.0]`. 0 = no jitter, 1 = full jitter.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            overall_timeout: Duration::from_secs(60),
            jitter_factor: 0.5,
        }
    }
}

/// Deadline for a text-extraction provider call (§5).
pub const TEXT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(40);
/// Deadline for a vision-extraction provider call (§5).
pub const VISION_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Record of a single failed attempt.
#[derive(Debug, Clone)]
pub struct RetryAttempt {
    /// Zero-indexed attempt number.
    pub attempt: u32,
    /// Error message from this attempt.
    pub error: String,
    /// Backoff delay applied before the next attempt.
    pub delay: Duration,
}

/// Metadata captured across all retry attempts, for AI call log enrichment.
#[derive(Debug, Clone, Default)]
pub struct RetryMetadata {
    /// Total number of attempts made (including the successful one).
    pub total_attempts: u32,
    /// Records of each failed attempt.
    pub failed_attempts: Vec<RetryAttempt>,
    /// Wall-clock time spanning all attempts.
    pub total_duration: Duration,
}

/// Result of a retry-enabled operation.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    /// The successfully produced value.
    pub value: T,
    /// Retry metadata (empty `failed_attempts` when the first attempt
    /// succeeds).
    pub metadata: RetryMetadata,
}

/// Compute the backoff delay for a given zero-indexed attempt number.
#[must_use]
pub fn compute_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    let delay_ms = (config.base_delay.as_millis() as u64).saturating_mul(exp);
    let capped_ms = delay_ms.min(config.max_delay.as_millis() as u64);

    let jitter_factor = config.jitter_factor.clamp(0.0, 1.0);
    if jitter_factor > 0.0 && capped_ms > 0 {
        let jitter_range = (capped_ms as f64 * jitter_factor) as u64;
        let nanos = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default().subsec_nanos() as u64;
        let pseudo = nanos.wrapping_mul(attempt as u64 + 1);
        let jitter = if jitter_range > 0 { pseudo % jitter_range } else { 0 };
        Duration::from_millis(capped_ms.saturating_sub(jitter))
    } else {
        Duration::from_millis(capped_ms)
    }
}

/// `true` if the error code represents a transient condition worth
/// retrying (§4.11 `ProviderTimeout`/`ProviderRateLimit`/`TransientStorage`).
#[must_use]
pub fn is_retryable(err: &OrderFlowError) -> bool {
    matches!(err.code, ErrorCode::ProviderTimeout | ErrorCode::ProviderRateLimit | ErrorCode::TransientStorage)
}

/// Generic retry loop. Calls `op` up to `max_retries + 1` times with
/// exponential backoff, returning the first successful result along with
/// metadata about failed attempts. A non-retryable error, or exhausting
/// the overall timeout, returns immediately.
pub async fn retry_async<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<RetryOutcome<T>, OrderFlowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OrderFlowError>>,
{
    let start = Instant::now();
    let max_attempts = config.max_retries + 1;
    let mut failed_attempts = Vec::new();

    for attempt in 0..max_attempts {
        if start.elapsed() >= config.overall_timeout {
            warn!(target: "orderflow.daemon.retry", attempt, "overall timeout exceeded");
            return Err(OrderFlowError::new(ErrorCode::ProviderTimeout, "retry overall timeout exceeded"));
        }

        debug!(target: "orderflow.daemon.retry", attempt, max_attempts, "attempting provider call");

        match op().await {
            Ok(value) => {
                let total_duration = start.elapsed();
                return Ok(RetryOutcome { value, metadata: RetryMetadata { total_attempts: attempt + 1, failed_attempts, total_duration } });
            }
            Err(err) => {
                let is_last = attempt + 1 >= max_attempts;

                if !is_retryable(&err) {
                    debug!(target: "orderflow.daemon.retry", error = %err, "non-retryable error, giving up");
                    return Err(err);
                }

                if is_last {
                    warn!(target: "orderflow.daemon.retry", error = %err, attempt, "max retries exhausted");
                    return Err(err);
                }

                let delay = compute_delay(config, attempt);
                warn!(target: "orderflow.daemon.retry", error = %err, attempt, delay_ms = delay.as_millis() as u64, "retryable error, backing off");
                failed_attempts.push(RetryAttempt { attempt, error: err.to_string(), delay });

                let remaining = config.overall_timeout.saturating_sub(start.elapsed());
                if delay > remaining {
                    return Err(OrderFlowError::new(ErrorCode::ProviderTimeout, "retry overall timeout exceeded"));
                }
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(OrderFlowError::new(ErrorCode::ProviderTimeout, "retry overall timeout exceeded"))
}

/// Run a provider call under a hard deadline (§5: 40s text / 60s vision),
/// surfacing a timeout as [`ErrorCode::ProviderTimeout`].
pub async fn with_deadline<T, Fut>(deadline: Duration, fut: Fut) -> Result<T, OrderFlowError>
where
    Fut: Future<Output = Result<T, OrderFlowError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(OrderFlowError::new(ErrorCode::ProviderTimeout, "provider call exceeded its deadline")
            .with_context("deadline_secs", deadline.as_secs().to_string())),
    }
}
