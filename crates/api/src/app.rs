use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use domain::services::AlertNotifier;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    json_error_envelope, maintenance_guard, metrics_handler, metrics_middleware, not_found,
    security_headers_middleware, trace_id,
};
use crate::routes::{
    air_quality, alerts, auth, health, news, newsletter, reports, settings, status,
    system_settings, upload, users,
};
use crate::services::{EmailAlertNotifier, EmailService, NewsApiClient, NewsSource};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("JWT configuration error: {0}")]
    Jwt(#[from] JwtError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub email: EmailService,
    pub notifier: Arc<dyn AlertNotifier>,
    pub news_source: Arc<dyn NewsSource>,
}

impl AppState {
    /// Builds the state with the production email notifier and news client.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, AppInitError> {
        let jwt = JwtConfig::with_leeway(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let email = EmailService::new(config.email.clone(), http);
        let notifier = EmailAlertNotifier::new(email.clone(), config.email.base_url.clone());
        let news_source = NewsApiClient::new(config.news.clone())?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            email,
            notifier: Arc::new(notifier),
            news_source: Arc::new(news_source),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_news_source(mut self, news_source: Arc<dyn NewsSource>) -> Self {
        self.news_source = news_source;
        self
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Development default
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let api_routes = Router::new()
        .route("/api/auth", get(auth::get_auth).post(auth::post_auth))
        .route(
            "/api/air_quality",
            get(air_quality::get_air_quality).post(air_quality::post_air_quality),
        )
        .route("/api/upload", axum::routing::post(upload::upload_csv))
        .route(
            "/api/reports",
            get(reports::get_reports)
                .post(reports::create_report)
                .put(reports::update_reports),
        )
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route(
            "/api/system_settings",
            get(system_settings::get_system_settings).put(system_settings::update_system_settings),
        )
        .route(
            "/api/users",
            get(users::get_users)
                .post(users::create_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/health",
            get(health::list_health_logs).post(health::create_health_log),
        )
        .route("/api/news", get(news::get_news).post(news::create_news))
        .route(
            "/api/newsletter",
            get(newsletter::list_subscribers).post(newsletter::post_newsletter),
        )
        .route("/api/alerts", axum::routing::post(alerts::run_alerts));

    let public_routes = Router::new()
        .route("/api/status/live", get(status::live))
        .route("/api/status/ready", get(status::ready))
        .route("/metrics", get(metrics_handler));

    // Layers listed bottom-up: the last one added runs first.
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(state.clone(), maintenance_guard))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(json_error_envelope))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
