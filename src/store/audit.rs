use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::AuditLogEntry;

pub struct NewAuditLogEntry {
    pub tenant_id: Option<Uuid>,
    pub method: String,
    pub url: String,
    pub request_body: Option<String>,
    pub response_status: i32,
    pub response_body: Option<String>,
}

pub async fn insert_audit_log(pool: &PgPool, entry: NewAuditLogEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (tenant_id, method, url, request_body, response_status, response_body)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.tenant_id)
    .bind(entry.method)
    .bind(entry.url)
    .bind(entry.request_body)
    .bind(entry.response_status)
    .bind(entry.response_body)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_audit_logs(
    pool: &PgPool,
    tenant_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<(Vec<AuditLogEntry>, i64)> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(pool)
            .await?;

    let data = sqlx::query_as::<_, AuditLogEntry>(
        "SELECT * FROM audit_logs WHERE tenant_id = $1 ORDER BY created_at LIMIT $2 OFFSET $3",
    )
    .bind(tenant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((data, total))
}
