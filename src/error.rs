use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Every error shape the impersonation and test-control surfaces can return.
///
/// Each variant carries exactly the fields needed to reproduce its JSON body rather
/// than funneling through one generic shape, since the real surface mixes
/// `{"message": ...}` and `{"error": ...}` bodies depending on endpoint.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing/unparseable Authorization header on a bot- or bearer-requiring
    /// endpoint, or the header's token doesn't resolve to a tenant.
    #[error("401: Unauthorized")]
    Unauthorized,

    #[error("invalid_client")]
    OAuthInvalidClient,

    #[error("invalid_grant")]
    OAuthInvalidGrant,

    #[error("redirect_uri mismatch")]
    OAuthRedirectMismatch,

    #[error("Unknown client_id")]
    UnknownClientId,

    /// `"Unknown Channel"`, `"Unknown Message"`, `"Unknown Guild"`,
    /// `"Unknown Application"`.
    #[error("Unknown {0}")]
    UnknownEntity(&'static str),

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Invalid request body")]
    InvalidRequestBody,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("client_id mismatch")]
    ClientIdMismatch,

    /// `"botToken already in use"` / `"clientId already in use"`.
    #[error("{0}")]
    Conflict(String),

    #[error("Webhook request failed: {0}")]
    WebhookFailed(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "401: Unauthorized" }),
            ),
            AppError::OAuthInvalidClient => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "invalid_client" }),
            ),
            AppError::OAuthInvalidGrant => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "invalid_grant" }),
            ),
            AppError::OAuthRedirectMismatch => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "invalid_request",
                    "error_description": "redirect_uri mismatch",
                }),
            ),
            AppError::UnknownClientId => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Unknown client_id" }),
            ),
            AppError::UnknownEntity(entity) => (
                StatusCode::NOT_FOUND,
                json!({ "message": format!("Unknown {entity}") }),
            ),
            AppError::TenantNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Tenant not found" }),
            ),
            AppError::InvalidRequestBody => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid request body" }),
            ),
            AppError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": format!("Missing required field: {field}") }),
            ),
            AppError::ClientIdMismatch => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "client_id mismatch" }),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::WebhookFailed(detail) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": format!("Webhook request failed: {detail}") }),
            ),
            AppError::Database(e) => {
                tracing::error!(error = ?e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
