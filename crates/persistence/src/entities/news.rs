//! News and newsletter entities.

use chrono::{DateTime, Utc};
use domain::models::SubscriberStatus;
use sqlx::FromRow;
use std::str::FromStr;

/// Database row mapping for the news table.
#[derive(Debug, Clone, FromRow)]
pub struct NewsEntity {
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

impl From<NewsEntity> for domain::models::NewsItem {
    fn from(entity: NewsEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            summary: entity.summary,
            content: entity.content,
            category: entity.category,
            image_url: entity.image_url,
            author: entity.author,
            external_url: entity.external_url,
            source_name: entity.source_name,
            published_at: entity.published_at,
            is_published: entity.is_published,
            views: entity.views,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the newsletter_subscribers table.
#[derive(Debug, Clone, FromRow)]
pub struct SubscriberEntity {
    pub id: i64,
    pub email: String,
    pub status: String,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub source_ip: Option<String>,
}

impl SubscriberEntity {
    pub fn is_active(&self) -> bool {
        self.status == SubscriberStatus::Active.as_str()
    }
}

impl From<SubscriberEntity> for domain::models::NewsletterSubscriber {
    fn from(entity: SubscriberEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            status: SubscriberStatus::from_str(&entity.status)
                .unwrap_or(SubscriberStatus::Unsubscribed),
            subscribed_at: entity.subscribed_at,
            unsubscribed_at: entity.unsubscribed_at,
            source_ip: entity.source_ip,
        }
    }
}
