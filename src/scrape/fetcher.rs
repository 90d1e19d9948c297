use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::{AppError, Result};

const USER_AGENT_STRING: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

pub struct PageFetcher {
    client: Client,
    source_url: String,
}

impl PageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT_STRING)
            .build()?;

        Ok(Self {
            client,
            source_url: config.source_url.clone(),
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Downloads the source page body. Non-2xx responses are errors.
    pub async fn fetch_page(&self) -> Result<String> {
        let response = self.client.get(&self.source_url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "{} returned HTTP {}",
                self.source_url,
                response.status()
            )));
        }

        let html = response.text().await?;
        tracing::debug!(bytes = html.len(), url = %self.source_url, "Fetched source page");
        Ok(html)
    }
}
