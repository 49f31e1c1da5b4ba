use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredCommand {
    pub tenant_id: Uuid,
    pub id: String,
    pub guild_id: String,
    pub payload: serde_json::Value,
    pub registered_at: DateTime<Utc>,
}
