pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod repo;
pub mod roles;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::rate_limit::LoginRateLimiter;
use crate::repo::PgRepository;
use crate::state::{AppState, SharedState};

/// Wire the Postgres repository into shared state.
pub fn build_state(pool: PgPool, config: Config) -> SharedState {
    let repo = Arc::new(PgRepository::new(pool));

    Arc::new(AppState {
        config,
        users: repo.clone(),
        notes: repo.clone(),
        sessions: repo,
        login_limiter: LoginRateLimiter::new(),
    })
}

pub fn build_app(state: SharedState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_size))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                )),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
