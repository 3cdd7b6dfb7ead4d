use chrono::Utc;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::article::{Article, UpstreamArticle, UpstreamResponse};
use crate::config::NewsConfig;
use crate::error::FetchError;

/// Client for the news search API.
///
/// Every call is one fresh request: no retries, caching or pagination.
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl NewsClient {
    pub fn new(config: &NewsConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("CityPulse/1.0 (News Client)")
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// Articles matching `query`, in upstream order. Failures are logged and
    /// collapse to an empty list.
    pub async fn fetch_articles_for_query(&self, query: &str) -> Vec<Article> {
        match self.try_fetch_articles_for_query(query).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error fetching news for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    /// Latest articles with no query filter. Fails soft like
    /// [`fetch_articles_for_query`](Self::fetch_articles_for_query).
    pub async fn fetch_top_headlines(&self) -> Vec<Article> {
        match self.try_fetch_top_headlines().await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error fetching headlines: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn try_fetch_articles_for_query(
        &self,
        query: &str,
    ) -> Result<Vec<Article>, FetchError> {
        self.fetch_latest(Some(query)).await
    }

    pub async fn try_fetch_top_headlines(&self) -> Result<Vec<Article>, FetchError> {
        self.fetch_latest(None).await
    }

    async fn fetch_latest(&self, query: Option<&str>) -> Result<Vec<Article>, FetchError> {
        let mut params = vec![
            ("apikey", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        if let Some(q) = query {
            params.push(("q", q));
        }

        let url = format!("{}/latest", self.base_url);
        debug!("Requesting {} (q={:?})", url, query);

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        Self::parse_response(&body)
    }

    /// Decode a response body into articles. A non-success status or a
    /// missing result list is an empty result, not an error.
    pub fn parse_response(body: &str) -> Result<Vec<Article>, FetchError> {
        let response: UpstreamResponse = serde_json::from_str(body)?;

        if !response.is_success() {
            warn!(
                "News API returned status '{}': {}",
                response.status,
                response.error_message().unwrap_or("no message")
            );
            return Ok(Vec::new());
        }

        let records: Vec<UpstreamArticle> = match response.results {
            Some(results @ serde_json::Value::Array(_)) => serde_json::from_value(results)?,
            _ => Vec::new(),
        };

        let now = Utc::now();
        let total = records.len();
        let articles: Vec<Article> = records
            .into_iter()
            .filter_map(|record| {
                let title = record.title.clone();
                let article = Article::from_upstream(record, now);
                if article.is_none() {
                    warn!("Skipping article with no link: {:?}", title);
                }
                article
            })
            .collect();

        info!(
            "News API response: {} of {} results usable (total reported: {:?})",
            articles.len(),
            total,
            response.total_results
        );
        Ok(articles)
    }
}
