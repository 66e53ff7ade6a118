//! Integration tests for citizen pollution reports and their review.

mod common;

use axum::{
    http::{Method, StatusCode},
    Router,
};
use common::{
    authed_json_request, authed_request, create_admin, create_test_app, create_user, get_request,
    send, setup, test_config, TestUser,
};
use serde_json::{json, Value};
use uuid::Uuid;

fn report_body(description: &str) -> Value {
    json!({
        "district": "Cầu Giấy",
        "address": "12 Xuân Thủy",
        "pollution_type": "Burning",
        "description": description,
        "latitude": 21.036,
        "longitude": 105.79
    })
}

async fn file_report(app: &Router, user: &TestUser) -> i64 {
    let description = format!("Smoke from open burning {}", Uuid::new_v4());
    let (status, body) = send(
        app,
        authed_json_request(Method::POST, "/api/reports", &user.token, report_body(&description)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "report failed: {}", body);
    body["data"]["id"].as_i64().unwrap()
}

// ============================================================================
// Filing
// ============================================================================

#[tokio::test]
async fn test_create_report() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;

    let (status, body) = send(
        &app,
        authed_json_request(
            Method::POST,
            "/api/reports",
            &user.token,
            report_body("  Thick smoke near the market  "),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let report = &body["data"];
    assert_eq!(report["user_id"], user.id);
    assert_eq!(report["district_name"], "Cầu Giấy");
    assert_eq!(report["pollution_type_code"], "burning");
    assert_eq!(report["description"], "Thick smoke near the market");
    assert_eq!(report["status"], "pending");
    assert!(report["verified_by"].is_null());
}

#[tokio::test]
async fn test_duplicate_report_rejected() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;
    let body = report_body(&format!("Dust cloud {}", Uuid::new_v4()));

    let (status, first) = send(
        &app,
        authed_json_request(Method::POST, "/api/reports", &user.token, body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, second) = send(
        &app,
        authed_json_request(Method::POST, "/api/reports", &user.token, body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        second["error"],
        format!(
            "Duplicate report: identical report #{} was just submitted",
            first["data"]["id"]
        )
    );
}

#[tokio::test]
async fn test_other_type_requires_custom_type() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;
    let mut body = report_body("Strange chemical smell");
    body["pollution_type"] = json!("other");

    let (status, response) = send(
        &app,
        authed_json_request(Method::POST, "/api/reports", &user.token, body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["error"],
        "Custom type is required when pollution type is other"
    );

    body["custom_type"] = json!("Chemical odour");
    body["description"] = json!(format!("Strange chemical smell {}", Uuid::new_v4()));
    let (status, response) = send(
        &app,
        authed_json_request(Method::POST, "/api/reports", &user.token, body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["data"]["custom_type"], "Chemical odour");
}

#[tokio::test]
async fn test_unknown_district_rejected() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;
    let mut body = report_body("Burning tyres");
    body["district"] = json!("Gotham");

    let (status, response) = send(
        &app,
        authed_json_request(Method::POST, "/api/reports", &user.token, body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Unknown district: Gotham");
}

#[tokio::test]
async fn test_create_requires_login() {
    let (_pool, app) = setup().await;

    let (status, _) = send(
        &app,
        common::json_request(Method::POST, "/api/reports", report_body("Smoke")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_pollution_types_are_public() {
    let (_pool, app) = setup().await;

    let (status, body) = send(&app, get_request("/api/reports?action=types")).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["code"].as_str())
        .collect();
    assert!(codes.contains(&"burning"));
    assert!(codes.contains(&"other"));
}

#[tokio::test]
async fn test_users_see_only_their_reports() {
    let (pool, app) = setup().await;
    let alice = create_user(&app).await;
    let bob = create_user(&app).await;
    let admin = create_admin(&app, &pool).await;
    let report_id = file_report(&app, &alice).await;

    let (status, body) = send(&app, authed_request(Method::GET, "/api/reports", &bob.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let (status, body) = send(
        &app,
        authed_request(Method::GET, &format!("/api/reports?id={}", report_id), &bob.token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can only view your own reports");

    let (status, body) = send(&app, authed_request(Method::GET, "/api/reports", &alice.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], report_id);

    let (status, body) = send(
        &app,
        authed_request(Method::GET, &format!("/api/reports?id={}", report_id), &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], alice.username);
}

// ============================================================================
// Review
// ============================================================================

#[tokio::test]
async fn test_verify_then_reject_permissive() {
    let (pool, app) = setup().await;
    let user = create_user(&app).await;
    let admin = create_admin(&app, &pool).await;
    let id = file_report(&app, &user).await;

    let (status, body) = send(
        &app,
        authed_request(Method::PUT, &format!("/api/reports?id={}&action=verify", id), &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {}", body);
    assert_eq!(body["data"]["status"], "verified");
    assert_eq!(body["data"]["verified_by"], admin.id);
    assert!(body["data"]["rejection_reason"].is_null());

    let (status, body) = send(
        &app,
        authed_json_request(
            Method::PUT,
            &format!("/api/reports?id={}&action=reject", id),
            &admin.token,
            json!({"reason": "Duplicate of an older report"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");
    assert_eq!(body["data"]["rejection_reason"], "Duplicate of an older report");
}

#[tokio::test]
async fn test_enforced_transitions_reject_reviewed_report() {
    let (pool, _) = setup().await;
    let mut config = test_config();
    config.reports.enforce_transitions = true;
    let app = create_test_app(config, pool.clone());

    let user = create_user(&app).await;
    let admin = create_admin(&app, &pool).await;
    let id = file_report(&app, &user).await;

    let uri = format!("/api/reports?id={}&action=verify", id);
    let (status, _) = send(&app, authed_request(Method::PUT, &uri, &admin.token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        authed_request(Method::PUT, &format!("/api/reports?id={}&action=reject", id), &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Report is already verified");
}

#[tokio::test]
async fn test_review_missing_report() {
    let (pool, app) = setup().await;
    let admin = create_admin(&app, &pool).await;

    let (status, _) = send(
        &app,
        authed_request(Method::PUT, "/api/reports?id=999999999&action=verify", &admin.token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_requires_admin() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;
    let id = file_report(&app, &user).await;

    let (status, _) = send(
        &app,
        authed_request(Method::PUT, &format!("/api/reports?id={}&action=verify", id), &user.token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bulk_transition() {
    let (pool, app) = setup().await;
    let user = create_user(&app).await;
    let admin = create_admin(&app, &pool).await;
    let first = file_report(&app, &user).await;
    let second = file_report(&app, &user).await;

    let (status, body) = send(
        &app,
        authed_json_request(
            Method::PUT,
            "/api/reports",
            &admin.token,
            json!({"ids": [first, second, first], "status": "rejected", "reason": "Spam"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "bulk failed: {}", body);
    assert_eq!(body["data"]["updated"], 2);
    assert_eq!(body["data"]["status"], "rejected");

    let (_, body) = send(
        &app,
        authed_request(Method::GET, "/api/reports?status=rejected", &user.token),
    )
    .await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn test_bulk_rejects_pending_target_and_empty_ids() {
    let (pool, app) = setup().await;
    let admin = create_admin(&app, &pool).await;

    for body in [
        json!({"ids": [1], "status": "pending"}),
        json!({"ids": [], "status": "verified"}),
        json!({"ids": [0, -3], "status": "verified"}),
    ] {
        let (status, _) = send(
            &app,
            authed_json_request(Method::PUT, "/api/reports", &admin.token, body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
