//! News feed models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub external_url: Option<String>,
    pub source_name: Option<String>,
    pub published_at: DateTime<Utc>,
    pub is_published: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

/// Admin payload for authoring an item.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateNewsRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    pub summary: Option<String>,

    pub content: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Category must be between 1 and 50 characters"))]
    #[serde(default = "default_category")]
    pub category: String,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    #[validate(length(max = 100, message = "Author must be at most 100 characters"))]
    pub author: Option<String>,

    #[validate(url(message = "External URL must be a valid URL"))]
    pub external_url: Option<String>,

    pub published_at: Option<DateTime<Utc>>,

    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsListQuery {
    pub id: Option<i64>,
    pub action: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl NewsListQuery {
    /// Returns `(limit, offset)` with limit clamped to `1..=50`.
    pub fn page_bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(10).clamp(1, 50);
        let page = self.page.unwrap_or(1).max(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

/// An article pulled from the external news source, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalArticle {
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub author: Option<String>,
    pub external_url: String,
    pub source_name: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: usize,
    pub inserted: usize,
}
