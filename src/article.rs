//! The normalized article model and the upstream shapes it is built from.
//!
//! Upstream records are untrusted: every field may be missing, `null` or
//! empty. [`Article::from_upstream`] is the only place that branches on
//! those cases.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "No title";

/// A news item as the rest of the crate sees it. `url` is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Empty when the article has no image
    #[serde(default)]
    pub image: String,
    pub url: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Set when `date` is the fetch time rather than a publish date
    #[serde(default, skip_serializing_if = "is_false")]
    pub date_estimated: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One record of the news API's `results` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
}

/// Response envelope. `results` stays untyped until `status` says success,
/// since error responses put an object there.
#[derive(Debug, Deserialize)]
pub struct UpstreamResponse {
    pub status: String,
    #[serde(default, rename = "totalResults")]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub results: Option<serde_json::Value>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Message carried by an error envelope, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.results
            .as_ref()
            .and_then(|r| r.get("message"))
            .and_then(|m| m.as_str())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Timestamp in the `2024-01-01T12:00:00.000Z` form.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Article {
    /// Normalize an upstream record. Returns `None` when the record has no
    /// link, since such an article has no identity.
    pub fn from_upstream(record: UpstreamArticle, now: DateTime<Utc>) -> Option<Self> {
        let url = record.link.filter(|l| !l.trim().is_empty())?;
        let pub_date = non_empty(record.pub_date);

        Some(Self {
            title: non_empty(record.title).unwrap_or_else(|| UNTITLED.to_string()),
            description: non_empty(record.description).unwrap_or_default(),
            image: non_empty(record.image_url).unwrap_or_default(),
            url,
            date_estimated: pub_date.is_none(),
            date: pub_date.unwrap_or_else(|| timestamp(now)),
            source: non_empty(record.source_name).or_else(|| non_empty(record.source_id)),
        })
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}
