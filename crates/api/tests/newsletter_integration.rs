//! Integration tests for newsletter subscriptions.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{
    authed_request, create_admin, create_user, json_request, send, setup, test_config,
    unique_email,
};
use serde_json::json;
use shared::crypto::unsubscribe_token;

#[tokio::test]
async fn test_subscribe_records_source_ip() {
    let (pool, app) = setup().await;
    let email = unique_email();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/newsletter")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::from(json!({"email": email.to_uppercase()}).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED, "subscribe failed: {}", body);
    assert_eq!(body["data"]["email"], email);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["already_subscribed"], false);
    assert_eq!(body["data"]["reactivated"], false);

    let ip: Option<String> =
        sqlx::query_scalar("SELECT source_ip FROM newsletter_subscribers WHERE email = $1")
            .bind(&email)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(ip.as_deref(), Some("203.0.113.9"));
}

#[tokio::test]
async fn test_resubscribe_semantics() {
    let (_pool, app) = setup().await;
    let email = unique_email();
    let subscribe = || json_request(Method::POST, "/api/newsletter", json!({"email": email}));

    let (status, _) = send(&app, subscribe()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, subscribe()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["already_subscribed"], true);

    let token = unsubscribe_token(&test_config().jwt.secret, &email).unwrap();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/newsletter?action=unsubscribe",
            json!({"email": email, "token": token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unsubscribe failed: {}", body);
    assert_eq!(body["data"]["status"], "unsubscribed");
    assert!(body["data"]["unsubscribed_at"].is_string());

    let (status, body) = send(&app, subscribe()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reactivated"], true);
    assert_eq!(body["data"]["status"], "active");
}

#[tokio::test]
async fn test_concurrent_first_subscribes() {
    let (pool, app) = setup().await;
    let email = unique_email();
    let subscribe = || json_request(Method::POST, "/api/newsletter", json!({"email": email}));

    let (first, second) = tokio::join!(send(&app, subscribe()), send(&app, subscribe()));
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CREATED]);

    let already = [&first.1, &second.1]
        .iter()
        .filter(|body| body["data"]["already_subscribed"] == true)
        .count();
    assert_eq!(already, 1);

    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM newsletter_subscribers WHERE email = $1")
            .bind(&email)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_unsubscribe_rejects_bad_token() {
    let (_pool, app) = setup().await;
    let email = unique_email();
    let other = unique_email();

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/newsletter", json!({"email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let wrong = unsubscribe_token(&test_config().jwt.secret, &other).unwrap();
    for token in [wrong.as_str(), "zz-not-hex"] {
        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/newsletter?action=unsubscribe",
                json!({"email": email, "token": token}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid unsubscribe token");
    }
}

#[tokio::test]
async fn test_unsubscribe_unknown_email() {
    let (_pool, app) = setup().await;
    let email = unique_email();
    let token = unsubscribe_token(&test_config().jwt.secret, &email).unwrap();

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/newsletter?action=unsubscribe",
            json!({"email": email, "token": token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Subscriber not found");
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let (_pool, app) = setup().await;

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/newsletter", json!({"email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_admin_lists_subscribers_with_tokens() {
    let (pool, app) = setup().await;
    let admin = create_admin(&app, &pool).await;
    let user = create_user(&app).await;
    let email = unique_email();

    let (status, _) = send(
        &app,
        json_request(Method::POST, "/api/newsletter", json!({"email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        authed_request(Method::GET, "/api/newsletter", &user.token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        authed_request(Method::GET, "/api/newsletter?status=active", &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entry = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["email"] == email.as_str())
        .cloned()
        .expect("subscriber listed");
    assert_eq!(entry["status"], "active");

    let token = entry["unsubscribe_token"].as_str().unwrap();
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/newsletter?action=unsubscribe",
            json!({"email": email, "token": token}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
