use axum::{
    body::Bytes,
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::Value;

use crate::error::Result;
use crate::handlers::discord as h;
use crate::middleware::audit::TenantContext;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/oauth2/authorize", get(authorize))
        .route("/api/v10/oauth2/token", post(exchange_token))
        .route("/api/v10/users/@me", get(get_current_user))
        .route("/api/v10/channels/{id}", get(get_channel))
        .route("/api/v10/channels/{id}/messages", post(send_message))
        .route(
            "/api/v10/channels/{channel_id}/messages/{message_id}",
            patch(edit_message),
        )
        .route(
            "/api/v10/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me",
            put(add_reaction),
        )
        .route(
            "/api/v10/webhooks/{client_id}/{token}/messages/@original",
            patch(edit_interaction_response),
        )
        .route(
            "/api/v10/webhooks/{client_id}/{token}",
            post(send_followup),
        )
        .route(
            "/api/v10/applications/{client_id}/guilds/{guild_id}/commands",
            put(bulk_overwrite_commands),
        )
}

async fn authorize(
    State(state): State<AppState>,
    Query(query): Query<h::AuthorizeQuery>,
) -> Result<Response> {
    let result = h::authorize(&state.db, query).await?;
    Ok(Redirect::to(&result.redirect_to).into_response())
}

async fn exchange_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<h::TokenExchangeResponse>> {
    let form = h::parse_form_body(&headers, &body)?;
    let response = h::exchange_token(&state.db, form).await?;
    Ok(Json(response))
}

async fn get_current_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let user = h::get_current_user(&state.db, &ctx, &headers).await?;
    Ok(Json(user))
}

async fn get_channel(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let channel = h::get_channel(&state.db, &ctx, &headers, &id).await?;
    Ok(Json(channel))
}

async fn send_message(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>> {
    let response = h::send_message(&state.db, &ctx, &headers, &id, &body).await?;
    Ok(Json(response))
}

async fn edit_message(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
    Path((channel_id, message_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>> {
    let response =
        h::edit_message(&state.db, &ctx, &headers, &channel_id, &message_id, &body).await?;
    Ok(Json(response))
}

async fn add_reaction(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
    Path((channel_id, message_id, emoji)): Path<(String, String, String)>,
) -> Result<StatusCode> {
    h::add_reaction(&state.db, &ctx, &headers, &channel_id, &message_id, &emoji).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn edit_interaction_response(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
    Path((client_id, token)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>> {
    let response =
        h::edit_interaction_response(&state.db, &ctx, &headers, &client_id, &token, &body).await?;
    Ok(Json(response))
}

async fn send_followup(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
    Path((client_id, token)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>> {
    let response =
        h::send_followup(&state.db, &ctx, &headers, &client_id, &token, &body).await?;
    Ok(Json(response))
}

async fn bulk_overwrite_commands(
    State(state): State<AppState>,
    Extension(ctx): Extension<TenantContext>,
    headers: HeaderMap,
    Path((client_id, guild_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>> {
    let response =
        h::bulk_overwrite_commands(&state.db, &ctx, &headers, &client_id, &guild_id, &body).await?;
    Ok(Json(response))
}
