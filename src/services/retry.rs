use rand::Rng;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::error::AppError;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Calculate delay with exponential backoff and jitter
fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponential = config.exponential_base.powi(attempt.saturating_sub(1) as i32);
    let max_ms = config.max_delay.as_millis() as u64;
    let delay_ms = ((config.base_delay.as_millis() as f64 * exponential) as u64).min(max_ms);

    // ±25%
    let jitter = delay_ms / 4;
    let jittered = delay_ms - jitter + rand::thread_rng().gen_range(0..=jitter * 2);

    Duration::from_millis(jittered.min(max_ms))
}

/// Retry policy for specific error types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryDecision {
    Retry,
    Abort,
}

/// Blocked pages and transport failures are worth another try; anything
/// else will fail the same way again.
pub fn fetch_policy(error: &AppError) -> RetryDecision {
    if error.is_retryable() {
        RetryDecision::Retry
    } else {
        RetryDecision::Abort
    }
}

pub async fn retry_with_policy<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut f: F,
    policy: impl Fn(&E) -> RetryDecision,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let e = match f().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if policy(&e) == RetryDecision::Abort {
            log::warn!("{} aborted: {}", operation_name, e);
            return Err(e);
        }
        log::warn!(
            "{} failed (attempt {}/{}): {}",
            operation_name,
            attempt,
            max_attempts,
            e
        );
        if attempt >= max_attempts {
            return Err(e);
        }

        let delay = calculate_delay(config, attempt);
        log::info!("Retrying {} in {:?}...", operation_name, delay);
        sleep(delay).await;
        attempt += 1;
    }
}

/// Circuit breaker pattern
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: Duration,
    state: CircuitState,
    failures: u32,
    last_failure: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
            state: CircuitState::Closed,
            failures: 0,
            last_failure: None,
        }
    }

    pub fn can_execute(&mut self) -> bool {
        match self.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => match self.last_failure {
                Some(last) if last.elapsed() >= self.reset_timeout => {
                    self.state = CircuitState::HalfOpen;
                    true
                }
                _ => false,
            },
        }
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
        self.state = CircuitState::Closed;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.last_failure = Some(Instant::now());

        // A failed probe reopens immediately
        if self.failures >= self.failure_threshold || self.state == CircuitState::HalfOpen {
            self.state = CircuitState::Open;
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open
    }
}
