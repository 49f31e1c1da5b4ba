use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub tenant_id: Uuid,
    pub id: String,
    pub channel_id: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageEdit {
    pub id: i64,
    pub tenant_id: Uuid,
    pub message_id: String,
    pub payload: serde_json::Value,
    pub edited_at: DateTime<Utc>,
}

/// A message joined with its edit history, oldest edit first, as returned by
/// the test-control `GET /_test/:id/messages/:channel` getter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithHistory {
    #[serde(flatten)]
    pub message: Message,
    pub edit_history: Vec<MessageEdit>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: i64,
    pub tenant_id: Uuid,
    pub channel_id: String,
    pub message_id: String,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}
