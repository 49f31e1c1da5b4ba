use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub bot_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub public_key: String,
    pub private_key: String,
    pub next_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Guild {
    pub tenant_id: Uuid,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub tenant_id: Uuid,
    pub id: String,
    pub guild_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuthCode {
    pub code: String,
    pub tenant_id: Uuid,
    pub guild_id: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub token: String,
    pub tenant_id: Uuid,
}

/// Request body for `POST /_test/tenants`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub bot_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    pub guilds: Option<Vec<CreateGuildRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateGuildRequest {
    pub id: String,
    pub name: String,
    pub channels: Vec<CreateChannelRequest>,
}

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantResponse {
    pub id: Uuid,
    pub bot_token: String,
    pub client_id: String,
    pub client_secret: String,
    pub public_key: String,
    pub private_key: String,
    pub created_at: DateTime<Utc>,
    pub guilds: Vec<GuildWithChannels>,
}

#[derive(Debug, Serialize)]
pub struct GuildWithChannels {
    pub id: String,
    pub name: String,
    pub channels: Vec<Channel>,
}

/// Summary row for the tenant browse listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: Uuid,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
    pub guild_count: i64,
    pub channel_count: i64,
}

/// Request body for `POST /_test/:id/auth-code`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthCodeRequest {
    pub guild_id: String,
    pub redirect_uri: String,
}

#[derive(Debug, Serialize)]
pub struct CreateAuthCodeResponse {
    pub code: String,
}
