use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::constants::{BLOCKED_MARKERS, CIRCUIT_FAILURE_THRESHOLD, CIRCUIT_RESET_SECS, GYM_CONTEST_ID_START};
use crate::error::{AppError, AppResult};
use crate::models::ProblemKey;
use crate::services::parser::{ParseInput, ParseOutcome, StatementParser};
use crate::services::retry::{fetch_policy, retry_with_policy, CircuitBreaker, RetryConfig};

/// Whether a response body is a real page or an anti-bot interstitial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Usable,
    /// Carries the marker phrase that gave the interstitial away
    Blocked(&'static str),
}

pub fn classify_response(text: &str) -> SourceStatus {
    BLOCKED_MARKERS
        .iter()
        .find(|marker| text.contains(**marker))
        .map_or(SourceStatus::Usable, |marker| SourceStatus::Blocked(*marker))
}

/// Strict UTF-8 decoding of a response body.
pub fn decode_body(bytes: &[u8]) -> AppResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        AppError::InvalidEncoding(format!(
            "response is not valid UTF-8 (first bad byte at offset {})",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Anything that can hand over the raw markup of a problem page.
#[async_trait]
pub trait StatementSource: Send + Sync {
    async fn fetch_markup(&self, key: &ProblemKey) -> AppResult<String>;
    fn problem_url(&self, key: &ProblemKey) -> String;
}

pub struct CodeforcesClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
    breaker: Mutex<CircuitBreaker>,
}

impl CodeforcesClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.source_base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::with_attempts(config.fetch_max_attempts),
            breaker: Mutex::new(CircuitBreaker::new(
                CIRCUIT_FAILURE_THRESHOLD,
                Duration::from_secs(CIRCUIT_RESET_SECS),
            )),
        })
    }

    async fn fetch_once(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(url.to_string()));
        }
        let checked = response.error_for_status_ref().map(|_| ());
        let bytes = response.bytes().await?;

        // Interstitials usually come with 403/503, so look at the body first
        if let Err(err) = checked {
            if let SourceStatus::Blocked(marker) = classify_response(&String::from_utf8_lossy(&bytes)) {
                return Err(AppError::BlockedSource(marker.to_string()));
            }
            return Err(err.into());
        }

        let text = decode_body(&bytes)?;
        match classify_response(&text) {
            SourceStatus::Blocked(marker) => Err(AppError::BlockedSource(marker.to_string())),
            SourceStatus::Usable => Ok(text),
        }
    }
}

#[async_trait]
impl StatementSource for CodeforcesClient {
    async fn fetch_markup(&self, key: &ProblemKey) -> AppResult<String> {
        if !self.breaker.lock().await.can_execute() {
            return Err(AppError::BlockedSource(
                "too many consecutive failures, waiting before the next attempt".to_string(),
            ));
        }

        let url = self.problem_url(key);
        let operation = format!("fetch {}", key);
        let result = retry_with_policy(&self.retry, &operation, || self.fetch_once(&url), fetch_policy).await;

        let mut breaker = self.breaker.lock().await;
        match &result {
            Ok(text) => {
                breaker.record_success();
                log::info!("Fetched {} ({} bytes)", url, text.len());
            }
            Err(e) if e.is_retryable() => breaker.record_failure(),
            Err(_) => {}
        }
        result
    }

    fn problem_url(&self, key: &ProblemKey) -> String {
        let section = if key.contest_id >= GYM_CONTEST_ID_START {
            "gym"
        } else {
            "contest"
        };
        format!("{}/{}/{}/problem/{}", self.base_url, section, key.contest_id, key.index)
    }
}

/// Fetches one problem page and runs the extraction engine over it.
pub async fn fetch_and_parse(
    source: &dyn StatementSource,
    parser: &StatementParser,
    key: ProblemKey,
    tags: Vec<String>,
) -> AppResult<ParseOutcome> {
    let html = source.fetch_markup(&key).await?;
    let url = source.problem_url(&key);
    let input = ParseInput::new(key, html).with_tags(tags).with_source(url);
    Ok(parser.parse_with_diagnostics(&input))
}
