use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::domain::{Article, SearchOptions, TrendingPeriod};
use crate::errors::{ApiError, ApiResult, StarfieldError, StarfieldResult};
use crate::sources::traits::NewsSource;
use crate::sources::wire;

/// Maximum page size the newswire endpoint accepts
pub const RECENT_LIMIT: u32 = 100;

pub const NEWSWIRE_API: &str = "Newswire API";
pub const MOST_POPULAR_API: &str = "Most Popular API";
pub const ARTICLE_SEARCH_API: &str = "Article Search API";

/// Client for the NYT newswire, most-popular and article-search APIs.
pub struct NytSource {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    newswire_source: String,
}

impl NytSource {
    pub fn new(config: &Config) -> StarfieldResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| StarfieldError::Config(format!("HTTP client: {}", e)))?;

        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: &Config) -> StarfieldResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| StarfieldError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(StarfieldError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            newswire_source: config.newswire_source.clone(),
        })
    }

    /// Build `{base}/{segments...}` with the credential attached.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("api-key", key);
        }
        url
    }

    async fn get(&self, api: &'static str, url: Url) -> ApiResult<String> {
        debug!(api, path = url.path(), "Requesting");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::from_transport(api, &e))?;

        let status = response.status();
        // headers arrived; only the body broke
        let body = response.text().await.map_err(|e| ApiError::Unknown {
            api,
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let err = ApiError::from_status(api, status, &body);
            warn!(api, status = status.as_u16(), "Request failed: {}", err);
            return Err(err);
        }

        Ok(body)
    }

    /// Probe the credential with a cheap most-popular request.
    pub async fn check_credentials(&self) -> ApiResult<()> {
        info!("Testing API key with a simple request");
        self.fetch_trending(TrendingPeriod::Day).await.map(|_| ())
    }
}

#[async_trait]
impl NewsSource for NytSource {
    async fn fetch_recent(&self, section: &str) -> ApiResult<Vec<Article>> {
        let section = if section.is_empty() { "all" } else { section };
        let file = format!("{}.json", section);
        let mut url = self.endpoint(&["news", "v3", "content", &self.newswire_source, &file]);
        url.query_pairs_mut()
            .append_pair("limit", &RECENT_LIMIT.to_string());

        let body = self.get(NEWSWIRE_API, url).await?;
        let articles = wire::parse_results(NEWSWIRE_API, &body)?;
        info!(section, count = articles.len(), "Received latest articles");
        Ok(articles)
    }

    async fn fetch_trending(&self, period: TrendingPeriod) -> ApiResult<Vec<Article>> {
        let file = format!("{}.json", period.days());
        let url = self.endpoint(&["mostpopular", "v2", "viewed", &file]);

        let body = self.get(MOST_POPULAR_API, url).await?;
        let articles = wire::parse_results(MOST_POPULAR_API, &body)?;
        info!(days = period.days(), count = articles.len(), "Received popular articles");
        Ok(articles)
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> ApiResult<Vec<Article>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint(&["search", "v2", "articlesearch.json"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            for (name, value) in options.query_pairs() {
                pairs.append_pair(name, &value);
            }
        }

        let body = self.get(ARTICLE_SEARCH_API, url).await?;
        let articles = wire::parse_search(ARTICLE_SEARCH_API, &body)?;
        info!(query, count = articles.len(), "Received search results");
        Ok(articles)
    }
}
