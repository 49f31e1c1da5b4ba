use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: i64,
    pub tenant_id: Option<Uuid>,
    pub method: String,
    pub url: String,
    pub request_body: Option<String>,
    pub response_status: i32,
    pub response_body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogPage {
    pub data: Vec<AuditLogEntry>,
    pub total: i64,
}
