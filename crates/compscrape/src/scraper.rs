use crate::parser::parse_company_profile;
use crate::types::CompanyRecord;

use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Empty response for {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Result of fetching and extracting one worklist entry.
#[derive(Debug)]
pub struct PageOutcome {
    /// Zero-based position in the worklist.
    pub index: usize,
    pub total: usize,
    pub url: String,
    pub result: Result<CompanyRecord, ScraperError>,
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_config(ScraperConfig::default())
    }

    pub fn with_config(config: ScraperConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch_company(&self, url: &str) -> Result<CompanyRecord, ScraperError> {
        let html = self.get_html(url).await?;
        if html.trim().is_empty() {
            return Err(ScraperError::EmptyResponse(url.to_string()));
        }

        let record = parse_company_profile(&html);
        log::debug!("Extracted '{}' from {}", record.company_name, url);
        Ok(record)
    }

    /// Fetches every URL and yields one outcome per page, in worklist order.
    ///
    /// With `concurrency` of 1 the next request is only sent once the previous
    /// page has been extracted. Larger values keep up to that many requests in
    /// flight. Failed pages are reported and never retried.
    pub fn scrape_worklist<'a>(
        &'a self,
        urls: &'a [String],
        concurrency: usize,
    ) -> impl Stream<Item = PageOutcome> + 'a {
        let total = urls.len();
        stream::iter(urls.iter().enumerate())
            .map(move |(index, url)| async move {
                log::info!("Scraping page {} of {}: {}", index + 1, total, url);
                let result = self
                    .fetch_company(url)
                    .await
                    .inspect_err(|e| log::error!("Failed to scrape {}: {}", url, e));
                PageOutcome {
                    index,
                    total,
                    url: url.clone(),
                    result,
                }
            })
            .buffered(concurrency.max(1))
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}
