use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{AuthCode, Tenant};

pub async fn create_auth_code(
    pool: &PgPool,
    tenant_id: Uuid,
    guild_id: &str,
    redirect_uri: &str,
) -> Result<String> {
    let code = Uuid::new_v4().simple().to_string();
    sqlx::query(
        "INSERT INTO auth_codes (code, tenant_id, guild_id, redirect_uri) VALUES ($1, $2, $3, $4)",
    )
    .bind(&code)
    .bind(tenant_id)
    .bind(guild_id)
    .bind(redirect_uri)
    .execute(pool)
    .await?;
    Ok(code)
}

/// Atomically reads and deletes the auth code in one statement (`DELETE …
/// RETURNING`) so two concurrent redemptions can never both succeed.
pub async fn consume_auth_code(pool: &PgPool, code: &str) -> Result<Option<AuthCode>> {
    let row = sqlx::query_as::<_, AuthCode>("DELETE FROM auth_codes WHERE code = $1 RETURNING *")
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create_access_token(pool: &PgPool, tenant_id: Uuid) -> Result<String> {
    let token = Uuid::new_v4().simple().to_string();
    sqlx::query("INSERT INTO access_tokens (token, tenant_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(tenant_id)
        .execute(pool)
        .await?;
    Ok(token)
}

pub async fn tenant_by_access_token(pool: &PgPool, token: &str) -> Result<Option<Tenant>> {
    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        SELECT t.* FROM tenants t
        JOIN access_tokens a ON a.tenant_id = t.id
        WHERE a.token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(tenant)
}
