use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;

use crate::config::ScraperConfig;
use crate::error::{FetchError, ScraperError};
use crate::utils::RateLimiter;

/// Anything the orchestrator can pull page markup from.
pub trait PageSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// reqwest-backed fetcher with a fixed identity and constant-delay retries.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    max_attempts: u32,
    backoff: RateLimiter,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            max_attempts: config.max_attempts.max(1),
            backoff: RateLimiter::from_millis(config.retry_delay_ms),
        })
    }

    pub fn with_retry(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = RateLimiter::from_millis(delay.as_millis() as u64);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// GET `url`, retrying up to `max_attempts` times with a fixed pause in between.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.fetch_once(url).await {
                Ok(body) => {
                    log::info!("Successfully fetched {}", url);
                    return Ok(body);
                }
                Err(e) => {
                    log::warn!("Attempt {} failed for {}: {:#}", attempt, url, e);
                    last_error = format!("{:#}", e);
                    if attempt < self.max_attempts {
                        log::debug!("Retrying {} in {:?}", url, self.backoff.delay());
                        self.backoff.wait().await;
                    }
                }
            }
        }

        log::error!("Failed to fetch {} after {} attempts", url, self.max_attempts);
        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            last_error,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .context("Failed to fetch page")?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response.text().await.context("Failed to read response body")
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_page(url).await
    }
}
