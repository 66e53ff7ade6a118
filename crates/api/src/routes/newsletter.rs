//! Newsletter subscriptions.
//!
//! POST /api/newsletter                      `{email}`
//! POST /api/newsletter?action=unsubscribe   `{email, token}`
//! GET  /api/newsletter[?status=]            (admin)

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::newsletter::normalize_email;
use domain::models::{
    NewsletterSubscriber, SubscribeOutcome, SubscribeRequest, SubscribeResponse,
    SubscriberStatus, UnsubscribeRequest,
};
use persistence::repositories::NewsletterRepository;
use serde::{Deserialize, Serialize};
use shared::crypto::{unsubscribe_token, verify_unsubscribe_token};
use validator::Validate;

use super::parse_body;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminUser, ClientIp};
use crate::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct NewsletterQuery {
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NewsletterData {
    Subscribed(SubscribeResponse),
    Unsubscribed(NewsletterSubscriber),
}

pub async fn post_newsletter(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<NewsletterQuery>,
    Json(body): Json<serde_json::Value>,
) -> Result<ApiResponse<NewsletterData>, ApiError> {
    match query.action.as_deref() {
        None | Some("subscribe") => {
            let request: SubscribeRequest = parse_body(body)?;
            request.validate()?;
            subscribe(&state, &request.email, ip.as_deref()).await
        }
        Some("unsubscribe") => {
            let request: UnsubscribeRequest = parse_body(body)?;
            request.validate()?;
            unsubscribe(&state, &request).await
        }
        Some(other) => Err(ApiError::Validation(format!("Invalid action: {}", other))),
    }
}

async fn subscribe(
    state: &AppState,
    email: &str,
    ip: Option<&str>,
) -> Result<ApiResponse<NewsletterData>, ApiError> {
    let email = normalize_email(email);
    let (subscriber, outcome) = NewsletterRepository::new(state.pool.clone())
        .subscribe(&email, ip)
        .await?;

    tracing::info!(
        subscriber_id = subscriber.id,
        outcome = ?outcome,
        source_ip = ?ip,
        "Newsletter subscription"
    );

    if outcome != SubscribeOutcome::AlreadySubscribed {
        send_welcome(state, &email).await;
    }

    let response = NewsletterData::Subscribed(SubscribeResponse::new(email, outcome));
    Ok(match outcome {
        SubscribeOutcome::Created => ApiResponse::created(response),
        _ => ApiResponse::ok(response),
    })
}

async fn send_welcome(state: &AppState, email: &str) {
    let Some(token) = unsubscribe_token(&state.config.jwt.secret, email) else {
        tracing::warn!("Unsubscribe token could not be derived, welcome email skipped");
        return;
    };
    let message = state.email.newsletter_welcome(email, &token);
    if let Err(e) = state.email.send(message).await {
        tracing::warn!(error = %e, "Failed to send newsletter welcome email");
    }
}

async fn unsubscribe(
    state: &AppState,
    request: &UnsubscribeRequest,
) -> Result<ApiResponse<NewsletterData>, ApiError> {
    let email = normalize_email(&request.email);
    if !verify_unsubscribe_token(&state.config.jwt.secret, &email, &request.token) {
        return Err(ApiError::Forbidden("Invalid unsubscribe token".to_string()));
    }

    let subscriber: NewsletterSubscriber = NewsletterRepository::new(state.pool.clone())
        .unsubscribe(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscriber not found".to_string()))?
        .into();

    tracing::info!(subscriber_id = subscriber.id, "Newsletter unsubscribe");
    Ok(ApiResponse::ok(NewsletterData::Unsubscribed(subscriber)))
}

#[derive(Debug, Deserialize)]
pub struct SubscriberListQuery {
    pub status: Option<SubscriberStatus>,
}

/// Subscriber row as shown to admins, with the link token for support use.
#[derive(Debug, Serialize)]
pub struct SubscriberView {
    #[serde(flatten)]
    pub subscriber: NewsletterSubscriber,
    pub unsubscribe_token: Option<String>,
}

pub async fn list_subscribers(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<SubscriberListQuery>,
) -> Result<ApiResponse<Vec<SubscriberView>>, ApiError> {
    let secret = &state.config.jwt.secret;
    let subscribers = NewsletterRepository::new(state.pool.clone())
        .list(query.status.as_ref().map(SubscriberStatus::as_str))
        .await?
        .into_iter()
        .map(|entity| {
            let subscriber: NewsletterSubscriber = entity.into();
            let unsubscribe_token = unsubscribe_token(secret, &subscriber.email);
            SubscriberView {
                subscriber,
                unsubscribe_token,
            }
        })
        .collect();
    Ok(ApiResponse::ok(subscribers))
}
