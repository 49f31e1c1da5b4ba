//! Handlers behind the `/_test` namespace: tenant lifecycle management,
//! getters over everything the Discord-impersonation surface writes, and the
//! signed-interaction helper scripted tests use to drive webhooks.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use axum::http::{header::CONTENT_TYPE, HeaderMap};

use crate::error::{AppError, Result};
use crate::models::{
    Channel, CreateAuthCodeRequest, CreateAuthCodeResponse, CreateTenantRequest, GuildWithChannels,
    Tenant, TenantResponse,
};
use crate::resolver;
use crate::signer;
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

/// Validates the content type and deserializes the body the same way the
/// Discord-impersonation surface does, so a missing/wrong content type or
/// unparseable JSON maps to the same 400 `Invalid request body` rather than
/// a framework-chosen `JsonRejection` body.
pub fn parse_json_body<T: serde::de::DeserializeOwned>(
    headers: &HeaderMap,
    body: &[u8],
) -> Result<T> {
    if !content_type_matches(headers, "application/json") {
        return Err(AppError::InvalidRequestBody);
    }
    serde_json::from_slice(body).map_err(|_| AppError::InvalidRequestBody)
}

fn tenant_response(tenant: Tenant, guilds: Vec<(crate::models::Guild, Vec<Channel>)>) -> TenantResponse {
    TenantResponse {
        id: tenant.id,
        bot_token: tenant.bot_token,
        client_id: tenant.client_id,
        client_secret: tenant.client_secret,
        public_key: tenant.public_key,
        private_key: tenant.private_key,
        created_at: tenant.created_at,
        guilds: guilds
            .into_iter()
            .map(|(guild, channels)| GuildWithChannels {
                id: guild.id,
                name: guild.name,
                channels,
            })
            .collect(),
    }
}

pub async fn create_tenant(pool: &PgPool, req: CreateTenantRequest) -> Result<TenantResponse> {
    let tenant = store::tenants::create_tenant(pool, req).await?;
    let guilds = store::guilds::list_guilds_with_channels(pool, tenant.id).await?;
    Ok(tenant_response(tenant, guilds))
}

pub async fn get_tenant(pool: &PgPool, id: Uuid) -> Result<TenantResponse> {
    let tenant = store::tenants::get_tenant(pool, id)
        .await?
        .ok_or(AppError::TenantNotFound)?;
    let guilds = store::guilds::list_guilds_with_channels(pool, tenant.id).await?;
    Ok(tenant_response(tenant, guilds))
}

pub async fn delete_tenant(pool: &PgPool, id: Uuid) -> Result<()> {
    if store::tenants::delete_tenant(pool, id).await? {
        Ok(())
    } else {
        Err(AppError::TenantNotFound)
    }
}

pub async fn reset_tenant(pool: &PgPool, id: Uuid) -> Result<()> {
    if store::tenants::reset_tenant(pool, id).await? {
        Ok(())
    } else {
        Err(AppError::TenantNotFound)
    }
}

pub async fn list_tenants(pool: &PgPool) -> Result<Vec<crate::models::TenantSummary>> {
    store::tenants::list_tenants(pool).await
}

async fn require_tenant(pool: &PgPool, id: Uuid) -> Result<Tenant> {
    resolver::by_tenant_id(pool, id)
        .await?
        .ok_or(AppError::TenantNotFound)
}

pub async fn create_auth_code(
    pool: &PgPool,
    tenant_id: Uuid,
    req: CreateAuthCodeRequest,
) -> Result<CreateAuthCodeResponse> {
    require_tenant(pool, tenant_id).await?;
    store::guilds::get_guild(pool, tenant_id, &req.guild_id)
        .await?
        .ok_or(AppError::UnknownEntity("Guild"))?;

    let code = store::auth::create_auth_code(pool, tenant_id, &req.guild_id, &req.redirect_uri).await?;
    Ok(CreateAuthCodeResponse { code })
}

pub async fn get_messages(
    pool: &PgPool,
    tenant_id: Uuid,
    channel_id: &str,
) -> Result<Vec<crate::models::MessageWithHistory>> {
    require_tenant(pool, tenant_id).await?;
    store::messages::list_messages_with_history(pool, tenant_id, channel_id).await
}

pub async fn get_reactions(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<crate::models::Reaction>> {
    require_tenant(pool, tenant_id).await?;
    store::messages::list_reactions(pool, tenant_id).await
}

pub async fn get_interaction_response(
    pool: &PgPool,
    tenant_id: Uuid,
    token: &str,
) -> Result<Option<crate::models::InteractionResponse>> {
    require_tenant(pool, tenant_id).await?;
    store::interactions::get_interaction_response(pool, tenant_id, token).await
}

pub async fn get_followups(
    pool: &PgPool,
    tenant_id: Uuid,
    token: &str,
) -> Result<Vec<crate::models::Followup>> {
    require_tenant(pool, tenant_id).await?;
    store::interactions::list_followups(pool, tenant_id, token).await
}

pub async fn get_commands(
    pool: &PgPool,
    tenant_id: Uuid,
    guild_id: &str,
) -> Result<Vec<crate::models::RegisteredCommand>> {
    require_tenant(pool, tenant_id).await?;
    store::commands::list_commands(pool, tenant_id, guild_id).await
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn get_audit_logs(
    pool: &PgPool,
    tenant_id: Uuid,
    query: AuditLogQuery,
) -> Result<crate::models::AuditLogPage> {
    require_tenant(pool, tenant_id).await?;
    let limit = query.limit.unwrap_or(100).clamp(0, 1000);
    let offset = query.offset.unwrap_or(0).max(0);
    let (data, total) = store::audit::list_audit_logs(pool, tenant_id, limit, offset).await?;
    Ok(crate::models::AuditLogPage { data, total })
}

// ---------------------------------------------------------------------
// Send signed interaction
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInteractionRequest {
    pub webhook_url: String,
    pub interaction: Value,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInteractionResponse {
    pub status_code: u16,
    pub body: Value,
}

pub async fn send_interaction(
    pool: &PgPool,
    http: &reqwest::Client,
    tenant_id: Uuid,
    req: SendInteractionRequest,
) -> Result<SendInteractionResponse> {
    let tenant = require_tenant(pool, tenant_id).await?;

    let timestamp = Utc::now().timestamp().to_string();
    let body = serde_json::to_string(&req.interaction)
        .map_err(|e| AppError::Internal(anyhow::Error::from(e)))?;
    let signature = signer::sign(&tenant.private_key, &timestamp, &body)?;

    let response = http
        .post(&req.webhook_url)
        .header("X-Signature-Ed25519", signature)
        .header("X-Signature-Timestamp", timestamp)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| AppError::WebhookFailed(e.to_string()))?;

    let status_code = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::WebhookFailed(e.to_string()))?;
    let body = serde_json::from_str::<Value>(&text).unwrap_or(json!(text));

    Ok(SendInteractionResponse { status_code, body })
}
