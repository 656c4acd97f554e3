//! JSON-over-HTTP with bounded retries, shared by the price feed and the chain reader.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::TransportError;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub retry_max: u32,
}

impl HttpConfig {
    pub const DEFAULT_TIMEOUT_MS: u64 = 3_000;
    pub const DEFAULT_RETRY_MAX: u32 = 2;
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            retry_max: Self::DEFAULT_RETRY_MAX,
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    cfg: HttpConfig,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(cfg: HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| TransportError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { cfg, client })
    }

    pub async fn get_json<T>(&self, op: &'static str, url: &str) -> Result<T, TransportError>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.send_with_retry(op, || self.client.get(url)).await
    }

    pub async fn post_json<T, B>(
        &self,
        op: &'static str,
        url: &str,
        body: &B,
    ) -> Result<T, TransportError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        self.send_with_retry(op, || self.client.post(url).json(body))
            .await
    }

    async fn send_with_retry<T, F>(&self, op: &'static str, make_req: F) -> Result<T, TransportError>
    where
        T: for<'de> Deserialize<'de>,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let attempts = self.cfg.retry_max.max(1);
        for attempt in 1..=attempts {
            info!(operation = op, attempt, "sending request");
            let resp = match make_req().send().await {
                Ok(resp) => resp,
                Err(err) => {
                    warn!(operation = op, attempt, error = %err, "request error");
                    if attempt == attempts || !is_retryable(&err) {
                        return Err(map_reqwest_error(err));
                    }
                    backoff(op, attempt).await;
                    continue;
                }
            };

            match map_response(op, resp).await {
                Ok(parsed) => return Ok(parsed),
                Err(TransportError::HttpStatus { status, .. })
                    if status >= 500 && attempt < attempts =>
                {
                    backoff(op, attempt).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(TransportError::Config(
            "retry loop exhausted unexpectedly".to_string(),
        ))
    }
}

async fn map_response<T>(op: &'static str, resp: reqwest::Response) -> Result<T, TransportError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| TransportError::Network(format!("{e}")))?;
    if !status.is_success() {
        warn!(operation = op, status = status.as_u16(), body = %body, "non-success status");
        return Err(TransportError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body)
        .map_err(|e| TransportError::Decode(format!("{e}")))
        .inspect(|_| debug!(operation = op, "response decoded"))
}

fn is_retryable(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_body() || err.is_decode() {
        return TransportError::Decode(err.to_string());
    }
    TransportError::Network(err.to_string())
}

async fn backoff(op: &str, attempt: u32) {
    let delay_ms = backoff_delay_ms(attempt);
    warn!(operation = op, attempt, delay_ms, "retrying after backoff");
    sleep(Duration::from_millis(delay_ms)).await;
}

/// 100ms doubling per attempt, capped at 2s.
fn backoff_delay_ms(attempt: u32) -> u64 {
    let exp = attempt.saturating_sub(1);
    let base = 100u64.saturating_mul(2u64.saturating_pow(exp));
    base.min(2_000)
}
