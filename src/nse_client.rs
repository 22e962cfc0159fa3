use anyhow::{Context, Result};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config;
use crate::models::{OptionChain, OptionChainSnapshot};

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct NseClient {
    client: Client,
    warmed_up: RwLock<bool>,
}

impl NseClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            warmed_up: RwLock::new(false),
        })
    }

    /// Warmup NSE session (only once per client). The option-chain API
    /// rejects requests without the cookies set by the home page.
    async fn warmup_if_needed(&self) -> Result<()> {
        // Check if already warmed up
        if *self.warmed_up.read().await {
            return Ok(());
        }

        // Acquire write lock and warmup
        let mut warmed = self.warmed_up.write().await;
        if !*warmed {
            let _ = self
                .client
                .get(config::NSE_BASE_URL)
                .header("Accept", "text/html")
                .send()
                .await
                .context("Failed to warm up NSE session")?;

            tokio::time::sleep(Duration::from_millis(config::WARMUP_DELAY_MS)).await;
            *warmed = true;
        }

        Ok(())
    }

    /// Generic retry fetch with better error handling
    async fn fetch_json(&self, url: &str) -> Result<String> {
        self.warmup_if_needed().await?;

        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self
                .client
                .get(url)
                .header("Referer", "https://www.nseindia.com/option-chain")
                .header("X-Requested-With", "XMLHttpRequest")
                .send()
                .await
                .context("Request send failed")?;

            let status = res.status();

            if status.is_success() {
                let text = res.text().await.context("Failed to read body")?;

                // NSE serves HTML interstitials with status 200; reject them
                let trimmed = text.trim();
                if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                    let preview: String = text.chars().take(200).collect();
                    anyhow::bail!("Non-JSON response: {}", preview);
                }

                Ok(text)
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                // Retry on server errors and rate limits
                anyhow::bail!("Retryable error: {}", status)
            } else {
                // Fail fast on client errors
                let body = res.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                anyhow::bail!("Client error {}: {}", status, preview)
            }
        })
        .await
    }

    // -----------------------------------------------
    // FETCH OPTION CHAIN FOR AN INDEX
    // -----------------------------------------------
    pub async fn fetch_option_chain(&self, symbol: &str) -> Result<OptionChain> {
        let url = config::nse_option_chain_url(symbol);

        let text = self.fetch_json(&url).await?;
        let chain: OptionChain =
            serde_json::from_str(&text).context("Failed to parse option chain")?;

        Ok(chain)
    }

    /// Fetch and collapse onto the strike grid in one step.
    pub async fn fetch_snapshot(&self, symbol: &str) -> Result<OptionChainSnapshot> {
        let chain = self.fetch_option_chain(symbol).await?;
        Ok(chain.to_snapshot())
    }
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    // Rotating Accept-Language headers (fingerprint avoidance)
    let lang = config::ACCEPT_LANGUAGES.choose(&mut thread_rng()).unwrap();
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Ok(Client::builder()
        .default_headers(headers)
        .cookie_store(true) // crucial for NSE
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?)
}
