use axum::{middleware, Router};
use reqwest::Client;
use sqlx::PgPool;
use std::time::Duration;

use crate::config::Config;
use crate::middleware::audit::audit_log;

pub mod discord;
pub mod health;
pub mod test_control;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub http: Client,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.webhook_timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { db, config, http }
    }
}

/// Builds the full application router: Discord-impersonation routes under
/// `/api/v10` and `/oauth2`, test-control routes under `/_test`, health
/// checks unprefixed, and the audit-logging middleware wrapping everything
/// except the routes it excludes itself (paths ending in `/audit-logs`).
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(discord::router())
        .nest("/_test", test_control::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), audit_log))
        .with_state(state)
}

async fn not_found() -> axum::response::Response {
    use axum::{http::StatusCode, response::IntoResponse, Json};
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": "404: Not Found" })),
    )
        .into_response()
}
