//! Integration tests for per-user settings.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    authed_json_request, authed_request, create_user, district_id, get_request, send, setup,
};
use serde_json::json;

#[tokio::test]
async fn test_defaults_created_on_first_read() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;

    let (status, body) = send(&app, authed_request(Method::GET, "/api/settings", &user.token)).await;
    assert_eq!(status, StatusCode::OK);
    let settings = &body["data"];
    assert_eq!(settings["user_id"], user.id);
    assert_eq!(settings["alert_threshold"], 150);
    assert_eq!(settings["email_alerts"], true);
    assert_eq!(settings["sms_alerts"], false);
    assert_eq!(settings["locale"], "vi");
    assert_eq!(settings["temperature_unit"], "celsius");
    assert!(settings["district_id"].is_null());
    assert!(settings["phone"].is_null());
}

#[tokio::test]
async fn test_settings_require_login() {
    let (_pool, app) = setup().await;

    let (status, _) = send(&app, get_request("/api/settings")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;

    let (status, body) = send(
        &app,
        authed_json_request(
            Method::PUT,
            "/api/settings",
            &user.token,
            json!({"alert_threshold": 100, "locale": "en"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["data"]["alert_threshold"], 100);
    assert_eq!(body["data"]["locale"], "en");
    assert_eq!(body["data"]["email_alerts"], true);

    let (status, body) = send(
        &app,
        authed_json_request(
            Method::PUT,
            "/api/settings",
            &user.token,
            json!({"temperature_unit": "fahrenheit"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["alert_threshold"], 100);
    assert_eq!(body["data"]["temperature_unit"], "fahrenheit");
}

#[tokio::test]
async fn test_district_by_name_or_id_and_null_clears() {
    let (pool, app) = setup().await;
    let user = create_user(&app).await;
    let dong_da = district_id(&pool, "Đống Đa").await;
    let tay_ho = district_id(&pool, "Tây Hồ").await;

    let (status, body) = send(
        &app,
        authed_json_request(Method::PUT, "/api/settings", &user.token, json!({"district": " Đống Đa "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["data"]["district_id"], dong_da);
    assert_eq!(body["data"]["district_name"], "Đống Đa");

    let (status, body) = send(
        &app,
        authed_json_request(Method::PUT, "/api/settings", &user.token, json!({"district": tay_ho})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["district_id"], tay_ho);

    let (status, body) = send(
        &app,
        authed_json_request(Method::PUT, "/api/settings", &user.token, json!({"locale": "en"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["district_id"], tay_ho);

    let (status, body) = send(
        &app,
        authed_json_request(Method::PUT, "/api/settings", &user.token, json!({"district": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["district_id"].is_null());
}

#[tokio::test]
async fn test_phone_set_and_cleared() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;

    let (status, body) = send(
        &app,
        authed_json_request(
            Method::PUT,
            "/api/settings",
            &user.token,
            json!({"phone": "+84912345678", "sms_alerts": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], "+84912345678");
    assert_eq!(body["data"]["sms_alerts"], true);

    let (status, body) = send(
        &app,
        authed_json_request(Method::PUT, "/api/settings", &user.token, json!({"phone": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["phone"].is_null());
}

#[tokio::test]
async fn test_invalid_values_rejected() {
    let (_pool, app) = setup().await;
    let user = create_user(&app).await;

    for (payload, message) in [
        (json!({"locale": "fr"}), "Locale must be 'vi' or 'en'"),
        (json!({"alert_threshold": 900}), "Alert threshold must be between 0 and 500"),
        (json!({"district": "Springfield"}), "Unknown district: Springfield"),
        (json!({"phone": "12ab"}), "Phone number must contain 8-15 digits"),
    ] {
        let (status, body) = send(
            &app,
            authed_json_request(Method::PUT, "/api/settings", &user.token, payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }
}
