//! News feed.
//!
//! GET  /api/news[?category=][&page=][&limit=]
//! GET  /api/news?id=                      (increments the view counter)
//! GET  /api/news?action=fetch_external    (admin)
//! POST /api/news                          (admin)

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use domain::models::{CreateNewsRequest, FetchSummary, NewsItem, NewsListQuery};
use persistence::repositories::NewsRepository;
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::auth::authenticate_admin;
use crate::extractors::AdminUser;
use crate::response::{ApiResponse, Page};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NewsData {
    One(NewsItem),
    List(Page<NewsItem>),
    Fetched(FetchSummary),
}

pub async fn get_news(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NewsListQuery>,
) -> Result<ApiResponse<NewsData>, ApiError> {
    let repo = NewsRepository::new(state.pool.clone());

    match query.action.as_deref() {
        None => {}
        Some("fetch_external") => {
            let admin = authenticate_admin(&headers, &state).await?;
            let articles = state.news_source.fetch().await?;
            let inserted = repo
                .insert_external(&articles, &state.config.news.category)
                .await?;
            let summary = FetchSummary {
                fetched: articles.len(),
                inserted,
            };
            tracing::info!(
                admin_id = admin.id,
                fetched = summary.fetched,
                inserted = summary.inserted,
                "External news fetched"
            );
            return Ok(ApiResponse::ok(NewsData::Fetched(summary)));
        }
        Some(other) => return Err(ApiError::Validation(format!("Invalid action: {}", other))),
    }

    if let Some(id) = query.id {
        let item = repo
            .view(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("News item not found".to_string()))?;
        return Ok(ApiResponse::ok(NewsData::One(item.into())));
    }

    let (limit, offset) = query.page_bounds();
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let (items, total) = repo.list_published(category, limit, offset).await?;
    let items = items.into_iter().map(Into::into).collect();

    Ok(ApiResponse::ok(NewsData::List(Page::new(
        items, total, limit, offset,
    ))))
}

pub async fn create_news(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateNewsRequest>,
) -> Result<ApiResponse<NewsItem>, ApiError> {
    request.validate()?;

    let item: NewsItem = NewsRepository::new(state.pool.clone())
        .create(&request)
        .await?
        .into();

    tracing::info!(admin_id = admin.id, news_id = item.id, category = %item.category, "News item created");
    Ok(ApiResponse::created(item))
}
