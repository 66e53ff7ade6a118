//! External news source integration.
//!
//! Talks to a NewsAPI-compatible `everything` endpoint. Articles without a
//! title or URL, and the `[Removed]` placeholders NewsAPI returns for taken
//! down stories, are dropped before storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::ExternalArticle;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::NewsConfig;
use crate::error::ApiError;

const REMOVED_MARKER: &str = "[Removed]";
const PAGE_SIZE: &str = "20";

#[derive(Debug, Error)]
pub enum NewsSourceError {
    #[error("News source API key not configured")]
    NotConfigured,

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("News source returned {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response from news source: {0}")]
    InvalidResponse(String),
}

impl From<NewsSourceError> for ApiError {
    fn from(err: NewsSourceError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

/// Supplies articles for `fetch_external`.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ExternalArticle>, NewsSourceError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<NewsApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<DateTime<Utc>>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != REMOVED_MARKER)
}

impl NewsApiArticle {
    fn into_article(self, fetched_at: DateTime<Utc>) -> Option<ExternalArticle> {
        let title = non_blank(self.title)?;
        let external_url = non_blank(self.url)?;
        Some(ExternalArticle {
            title: title.chars().take(255).collect(),
            summary: non_blank(self.description),
            content: non_blank(self.content),
            image_url: non_blank(self.url_to_image),
            author: non_blank(self.author),
            external_url,
            source_name: self.source.and_then(|s| non_blank(s.name)),
            published_at: self.published_at.unwrap_or(fetched_at),
        })
    }
}

/// Converts a NewsAPI payload into storable articles.
fn parse_response(body: &str, fetched_at: DateTime<Utc>) -> Result<Vec<ExternalArticle>, NewsSourceError> {
    let parsed: NewsApiResponse =
        serde_json::from_str(body).map_err(|e| NewsSourceError::InvalidResponse(e.to_string()))?;

    if parsed.status != "ok" {
        return Err(NewsSourceError::InvalidResponse(
            parsed.message.unwrap_or_else(|| format!("status {}", parsed.status)),
        ));
    }

    Ok(parsed
        .articles
        .into_iter()
        .filter_map(|a| a.into_article(fetched_at))
        .collect())
}

pub struct NewsApiClient {
    client: Client,
    config: NewsConfig,
}

impl NewsApiClient {
    pub fn new(config: NewsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch(&self) -> Result<Vec<ExternalArticle>, NewsSourceError> {
        if self.config.api_key.is_empty() {
            return Err(NewsSourceError::NotConfigured);
        }

        let response = self
            .client
            .get(&self.config.source_url)
            .header("X-Api-Key", &self.config.api_key)
            .query(&[
                ("q", self.config.query.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", PAGE_SIZE),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NewsSourceError::Timeout(self.config.timeout_ms)
                } else {
                    NewsSourceError::Http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, "News source request failed");
            return Err(NewsSourceError::ServiceError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let articles = parse_response(&body, Utc::now())?;
        debug!(count = articles.len(), "Fetched external articles");
        Ok(articles)
    }
}
