//! Integration tests for news items and external fetching.

mod common;

use std::sync::Arc;

use aq_platform_api::{
    app::{create_app, AppState},
    services::{NewsSource, NewsSourceError},
};
use async_trait::async_trait;
use axum::{
    http::{Method, StatusCode},
    Router,
};
use chrono::Utc;
use common::{
    authed_json_request, authed_request, create_admin, create_user, get_request, send, setup,
    test_config,
};
use domain::models::ExternalArticle;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Returns a fixed article list, or fails like an unreachable provider.
struct StubNewsSource {
    articles: Vec<ExternalArticle>,
    fail: bool,
}

#[async_trait]
impl NewsSource for StubNewsSource {
    async fn fetch(&self) -> Result<Vec<ExternalArticle>, NewsSourceError> {
        if self.fail {
            return Err(NewsSourceError::ServiceError {
                status: 503,
                message: "provider down".to_string(),
            });
        }
        Ok(self.articles.clone())
    }
}

fn app_with_source(pool: PgPool, source: StubNewsSource) -> Router {
    let state = AppState::new(test_config(), pool)
        .expect("Failed to build application state")
        .with_news_source(Arc::new(source));
    create_app(state)
}

fn article(title: &str) -> ExternalArticle {
    ExternalArticle {
        title: title.to_string(),
        summary: Some("Fine dust levels rose overnight".to_string()),
        content: None,
        image_url: None,
        author: Some("Newsroom".to_string()),
        external_url: format!("https://news.test/{}", Uuid::new_v4()),
        source_name: Some("News Test".to_string()),
        published_at: Utc::now(),
    }
}

fn unique_category() -> String {
    format!("t{}", Uuid::new_v4().simple())
}

#[tokio::test]
async fn test_admin_creates_and_lists_news() {
    let (pool, app) = setup().await;
    let admin = create_admin(&app, &pool).await;
    let category = unique_category();

    for (title, published) in [("Smog season begins", true), ("Draft story", false)] {
        let (status, body) = send(
            &app,
            authed_json_request(
                Method::POST,
                "/api/news",
                &admin.token,
                json!({"title": title, "category": category, "is_published": published}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        assert_eq!(body["data"]["views"], 0);
    }

    let (status, body) = send(&app, get_request(&format!("/api/news?category={}", category))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "Smog season begins");
}

#[tokio::test]
async fn test_view_increments_counter() {
    let (pool, app) = setup().await;
    let admin = create_admin(&app, &pool).await;

    let (_, body) = send(
        &app,
        authed_json_request(
            Method::POST,
            "/api/news",
            &admin.token,
            json!({"title": "Masks recommended", "category": unique_category()}),
        ),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    for expected in [1, 2] {
        let (status, body) = send(&app, get_request(&format!("/api/news?id={}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["views"], expected);
    }

    let (status, _) = send(&app, get_request("/api/news?id=999999999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_admin() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;

    let (status, _) = send(
        &app,
        authed_json_request(Method::POST, "/api/news", &user.token, json!({"title": "Nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_fetch_external_skips_known_urls() {
    let (pool, _) = setup().await;
    let app = app_with_source(
        pool.clone(),
        StubNewsSource {
            articles: vec![article("Hanoi AQI spikes"), article("Rain clears the air")],
            fail: false,
        },
    );
    let admin = create_admin(&app, &pool).await;

    let (status, body) = send(
        &app,
        authed_request(Method::GET, "/api/news?action=fetch_external", &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "fetch failed: {}", body);
    assert_eq!(body["data"]["fetched"], 2);
    assert_eq!(body["data"]["inserted"], 2);

    let (status, body) = send(
        &app,
        authed_request(Method::GET, "/api/news?action=fetch_external", &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fetched"], 2);
    assert_eq!(body["data"]["inserted"], 0);
}

#[tokio::test]
async fn test_fetch_external_upstream_failure() {
    let (pool, _) = setup().await;
    let app = app_with_source(
        pool.clone(),
        StubNewsSource {
            articles: Vec::new(),
            fail: true,
        },
    );
    let admin = create_admin(&app, &pool).await;
    let user = create_user(&app).await;

    let (status, _) = send(
        &app,
        authed_request(Method::GET, "/api/news?action=fetch_external", &user.token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        authed_request(Method::GET, "/api/news?action=fetch_external", &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}
