//! Rate-limited HTTP fetch client.
//!
//! One shared `reqwest::Client` (connection reuse) with the identification
//! headers the marketplace expects. Retry policy per request:
//!
//! - 200: pause `request_delay`, return the body
//! - 404: legitimate absence, return `None` at once
//! - 429: sleep `rate_limit_delay` and retry; does not use an attempt
//! - anything else (transport error, timeout, other status): sleep
//!   `retry_delay` and retry, up to `max_attempts` in total
//!
//! Network conditions are never reported as errors; `None` means
//! "cannot determine".

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::wire::Envelope;
use crate::config::FetchConfig;

pub struct FetchClient {
    http: Client,
    config: FetchConfig,
    requests_sent: AtomicU64,
    rate_limited: AtomicU64,
}

impl FetchClient {
    /// Build the shared client. Fails only on unusable header values.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("platform"),
            HeaderValue::from_str(&config.platform)
                .with_context(|| format!("Invalid platform header: {}", config.platform))?,
        );
        headers.insert(
            HeaderName::from_static("language"),
            HeaderValue::from_str(&config.language)
                .with_context(|| format!("Invalid language header: {}", config.language))?,
        );

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client for marketplace")?;

        Ok(Self {
            http,
            config,
            requests_sent: AtomicU64::new(0),
            rate_limited: AtomicU64::new(0),
        })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Requests put on the wire so far, retries included.
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    /// 429 responses seen so far.
    pub fn rate_limited(&self) -> u64 {
        self.rate_limited.load(Ordering::Relaxed)
    }

    /// GET `url` and return the response body, or `None` if unavailable.
    pub async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Option<String> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut failures = 0u32;

        loop {
            self.requests_sent.fetch_add(1, Ordering::Relaxed);
            let resp = self.http.get(url).query(params).send().await;

            match resp {
                Ok(response) => match response.status() {
                    StatusCode::OK => match response.text().await {
                        Ok(body) => {
                            tokio::time::sleep(self.config.request_delay()).await;
                            return Some(body);
                        }
                        Err(e) => {
                            warn!(url, error = %e, "Failed to read response body");
                        }
                    },
                    StatusCode::NOT_FOUND => {
                        debug!(url, "Not found upstream");
                        return None;
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        self.rate_limited.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            url,
                            cooldown_secs = self.config.rate_limit_delay_secs,
                            "Rate limited (429), cooling down"
                        );
                        tokio::time::sleep(self.config.rate_limit_delay()).await;
                        continue;
                    }
                    status => {
                        warn!(url, status = %status, attempt = failures + 1, "Unexpected upstream status");
                    }
                },
                Err(e) => {
                    warn!(url, attempt = failures + 1, error = %e, "Request failed");
                }
            }

            failures += 1;
            if failures >= max_attempts {
                warn!(url, attempts = failures, "Giving up after retries");
                return None;
            }
            tokio::time::sleep(self.config.retry_delay()).await;
        }
    }

    /// GET `{base_url}{path}` and decode the `data` field of the envelope.
    ///
    /// Missing `data` or a body that does not match `T` yields `None`.
    pub async fn fetch_data<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let url = format!("{}{}", self.base_url(), path);
        let body = self.fetch(&url, &[]).await?;

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => {
                if envelope.data.is_none() {
                    debug!(url = %url, "Response has no data payload");
                }
                envelope.data
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to decode upstream response");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
