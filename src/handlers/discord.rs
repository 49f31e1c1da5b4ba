//! Handlers for the ten Discord-shaped endpoints. Each resolves a tenant,
//! checks endpoint-specific preconditions, then mutates or reads the store.
//! Kept free of axum extractor types (besides `HeaderMap`, which is the
//! plain `http` crate type) so they can be exercised directly from tests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;

use axum::http::{header::CONTENT_TYPE, HeaderMap};

use crate::error::{AppError, Result};
use crate::middleware::audit::TenantContext;
use crate::resolver;
use crate::store;

fn content_type_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| {
            s.split(';')
                .next()
                .unwrap_or("")
                .trim()
                .eq_ignore_ascii_case(expected)
        })
        .unwrap_or(false)
}

fn parse_json_body(headers: &HeaderMap, body: &[u8]) -> Result<Value> {
    if !content_type_matches(headers, "application/json") {
        return Err(AppError::InvalidRequestBody);
    }
    serde_json::from_slice(body).map_err(|_| AppError::InvalidRequestBody)
}

/// Validates the content type and deserializes an `application/
/// x-www-form-urlencoded` body. Used instead of axum's `Form` extractor so a
/// missing/wrong content type or unparseable body maps to the same 400
/// `Invalid request body` every other handler in this file returns, rather
/// than axum's own `FormRejection`.
pub fn parse_form_body<T: serde::de::DeserializeOwned>(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<T> {
    if !content_type_matches(headers, "application/x-www-form-urlencoded") {
        return Err(AppError::InvalidRequestBody);
    }
    serde_urlencoded::from_bytes(body).map_err(|_| AppError::InvalidRequestBody)
}

/// `body.content ?? ""` — a missing key and an explicit `null` both fall
/// back to the empty string.
fn content_or_empty(payload: &Value) -> Value {
    match payload.get("content") {
        Some(Value::Null) | None => json!(""),
        Some(v) => v.clone(),
    }
}

fn bot_tenant(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

// ---------------------------------------------------------------------
// OAuth authorize
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub client_id: String,
    pub redirect_uri: String,
    pub state: Option<String>,
}

pub struct AuthorizeResult {
    pub redirect_to: String,
}

pub async fn authorize(pool: &PgPool, query: AuthorizeQuery) -> Result<AuthorizeResult> {
    let tenant = resolver::by_client_id(pool, &query.client_id)
        .await?
        .ok_or(AppError::UnknownClientId)?;

    let guild = store::guilds::first_guild(pool, tenant.id)
        .await?
        .ok_or(AppError::UnknownClientId)?;

    let code = store::auth::create_auth_code(pool, tenant.id, &guild.id, &query.redirect_uri).await?;

    let mut redirect_to = format!(
        "{}?code={}&guild_id={}",
        query.redirect_uri,
        urlencoding::encode(&code),
        urlencoding::encode(&guild.id),
    );
    if let Some(state) = query.state {
        redirect_to.push_str(&format!("&state={}", urlencoding::encode(&state)));
    } else {
        redirect_to.push_str("&state=");
    }

    Ok(AuthorizeResult { redirect_to })
}

// ---------------------------------------------------------------------
// OAuth token exchange
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TokenExchangeForm {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

pub async fn exchange_token(
    pool: &PgPool,
    form: TokenExchangeForm,
) -> Result<TokenExchangeResponse> {
    let client_id = form.client_id.ok_or(AppError::OAuthInvalidClient)?;
    let tenant = resolver::by_client_id(pool, &client_id)
        .await?
        .ok_or(AppError::OAuthInvalidClient)?;

    if form.client_secret.as_deref() != Some(tenant.client_secret.as_str()) {
        return Err(AppError::OAuthInvalidClient);
    }

    let code = form.code.ok_or(AppError::OAuthInvalidGrant)?;
    let auth_code = store::auth::consume_auth_code(pool, &code)
        .await?
        .ok_or(AppError::OAuthInvalidGrant)?;

    if auth_code.tenant_id != tenant.id {
        return Err(AppError::OAuthInvalidGrant);
    }

    let redirect_uri = form.redirect_uri.ok_or(AppError::OAuthRedirectMismatch)?;
    if redirect_uri != auth_code.redirect_uri {
        return Err(AppError::OAuthRedirectMismatch);
    }

    let access_token = store::auth::create_access_token(pool, tenant.id).await?;

    Ok(TokenExchangeResponse {
        access_token,
        token_type: "Bearer",
        // The store never expires access tokens; the advertised value is
        // preserved for client compatibility with callers that read it.
        expires_in: 604_800,
    })
}

// ---------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------

pub async fn get_current_user(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
) -> Result<Value> {
    let tenant = resolver::by_bearer_token(pool, bot_tenant(headers))
        .await?
        .ok_or(AppError::Unauthorized)?;
    ctx.set(tenant.id);

    Ok(json!({
        "id": format!("fake-user-{}", tenant.id),
        "username": "fakeuser",
        "global_name": format!("Fake User ({})", tenant.id),
        "discriminator": "0",
    }))
}

// ---------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------

pub async fn get_channel(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
    channel_id: &str,
) -> Result<Value> {
    let tenant = resolver::by_bot_token(pool, bot_tenant(headers))
        .await?
        .ok_or(AppError::Unauthorized)?;
    ctx.set(tenant.id);

    let channel = store::guilds::get_channel(pool, tenant.id, channel_id)
        .await?
        .ok_or(AppError::UnknownEntity("Channel"))?;

    Ok(json!({
        "id": channel.id,
        "guild_id": channel.guild_id,
        "name": channel.name,
        "type": 0,
    }))
}

// ---------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------

pub async fn send_message(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
    channel_id: &str,
    body: &[u8],
) -> Result<Value> {
    let tenant = resolver::by_bot_token(pool, bot_tenant(headers))
        .await?
        .ok_or(AppError::Unauthorized)?;
    ctx.set(tenant.id);

    store::guilds::get_channel(pool, tenant.id, channel_id)
        .await?
        .ok_or(AppError::UnknownEntity("Channel"))?;

    let payload = parse_json_body(headers, body)?;

    let id = store::tenants::generate_id(pool, tenant.id, "msg").await?;
    let content = content_or_empty(&payload);

    let message = store::messages::create_message(pool, tenant.id, &id, channel_id, payload).await?;

    Ok(json!({
        "id": message.id,
        "channel_id": message.channel_id,
        "content": content,
    }))
}

pub async fn edit_message(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
    channel_id: &str,
    message_id: &str,
    body: &[u8],
) -> Result<Value> {
    let tenant = resolver::by_bot_token(pool, bot_tenant(headers))
        .await?
        .ok_or(AppError::Unauthorized)?;
    ctx.set(tenant.id);

    store::messages::get_message(pool, tenant.id, message_id)
        .await?
        .ok_or(AppError::UnknownEntity("Message"))?;

    let payload = parse_json_body(headers, body)?;
    let content = content_or_empty(&payload);

    let message = store::messages::edit_message(pool, tenant.id, message_id, payload)
        .await?
        .ok_or(AppError::UnknownEntity("Message"))?;

    let _ = channel_id;
    Ok(json!({
        "id": message.id,
        "channel_id": message.channel_id,
        "content": content,
    }))
}

pub async fn add_reaction(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
    channel_id: &str,
    message_id: &str,
    emoji: &str,
) -> Result<()> {
    let tenant = resolver::by_bot_token(pool, bot_tenant(headers))
        .await?
        .ok_or(AppError::Unauthorized)?;
    ctx.set(tenant.id);

    store::guilds::get_channel(pool, tenant.id, channel_id)
        .await?
        .ok_or(AppError::UnknownEntity("Channel"))?;

    store::messages::get_message(pool, tenant.id, message_id)
        .await?
        .ok_or(AppError::UnknownEntity("Message"))?;

    store::messages::add_reaction(pool, tenant.id, channel_id, message_id, emoji).await?;

    Ok(())
}

// ---------------------------------------------------------------------
// Interaction responses and followups
// ---------------------------------------------------------------------

pub async fn edit_interaction_response(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
    client_id: &str,
    token: &str,
    body: &[u8],
) -> Result<Value> {
    let tenant = resolver::by_client_id(pool, client_id)
        .await?
        .ok_or(AppError::UnknownEntity("Application"))?;
    ctx.set(tenant.id);

    let payload = parse_json_body(headers, body)?;
    let content = content_or_empty(&payload);

    let response_id = store::tenants::generate_id(pool, tenant.id, "resp").await?;
    let response =
        store::interactions::upsert_interaction_response(pool, tenant.id, token, &response_id, payload)
            .await?;

    Ok(json!({
        "id": response.response_id,
        "content": content,
    }))
}

pub async fn send_followup(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
    client_id: &str,
    token: &str,
    body: &[u8],
) -> Result<Value> {
    let tenant = resolver::by_client_id(pool, client_id)
        .await?
        .ok_or(AppError::UnknownEntity("Application"))?;
    ctx.set(tenant.id);

    let payload = parse_json_body(headers, body)?;
    let content = content_or_empty(&payload);

    let id = store::tenants::generate_id(pool, tenant.id, "followup").await?;
    let followup = store::interactions::add_followup(pool, tenant.id, &id, token, payload).await?;

    Ok(json!({
        "id": followup.id,
        "channel_id": "chan-followup",
        "content": content,
    }))
}

// ---------------------------------------------------------------------
// Bulk command overwrite
// ---------------------------------------------------------------------

pub async fn bulk_overwrite_commands(
    pool: &PgPool,
    ctx: &TenantContext,
    headers: &HeaderMap,
    client_id: &str,
    guild_id: &str,
    body: &[u8],
) -> Result<Value> {
    let tenant = resolver::by_bot_token(pool, bot_tenant(headers))
        .await?
        .ok_or(AppError::Unauthorized)?;
    ctx.set(tenant.id);

    if tenant.client_id != client_id {
        return Err(AppError::ClientIdMismatch);
    }

    store::guilds::get_guild(pool, tenant.id, guild_id)
        .await?
        .ok_or(AppError::UnknownEntity("Guild"))?;

    let payload = parse_json_body(headers, body)?;
    let items = payload.as_array().ok_or(AppError::InvalidRequestBody)?;

    let mut pending = Vec::with_capacity(items.len());
    for item in items {
        let id = store::tenants::generate_id(pool, tenant.id, "cmd").await?;
        pending.push((id, item.clone()));
    }

    let commands =
        store::commands::bulk_overwrite_commands(pool, tenant.id, guild_id, pending).await?;

    let response: Vec<Value> = commands
        .into_iter()
        .map(|c| {
            let mut item = c.payload;
            if let Value::Object(ref mut map) = item {
                map.insert("id".into(), json!(c.id));
                map.insert("application_id".into(), json!(client_id));
                map.insert("guild_id".into(), json!(c.guild_id));
            }
            item
        })
        .collect();

    Ok(json!(response))
}
