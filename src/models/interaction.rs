use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub tenant_id: Uuid,
    pub interaction_token: String,
    pub response_id: String,
    pub payload: serde_json::Value,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Followup {
    pub tenant_id: Uuid,
    pub id: String,
    pub interaction_token: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
