use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{CreateTenantRequest, Tenant, TenantSummary};

fn validate_create_request(req: &CreateTenantRequest) -> Result<()> {
    if req.bot_token.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::MissingField("botToken".into()));
    }
    if req.client_id.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::MissingField("clientId".into()));
    }
    if req.client_secret.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::MissingField("clientSecret".into()));
    }
    if req.public_key.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::MissingField("publicKey".into()));
    }
    if req.private_key.as_deref().unwrap_or("").is_empty() {
        return Err(AppError::MissingField("privateKey".into()));
    }
    let guilds = req
        .guilds
        .as_ref()
        .filter(|g| !g.is_empty())
        .ok_or_else(|| AppError::MissingField("guilds".into()))?;
    for guild in guilds {
        if guild.channels.is_empty() {
            return Err(AppError::MissingField(format!(
                "guilds[{}].channels",
                guild.id
            )));
        }
    }
    Ok(())
}

/// Maps a unique-constraint violation on `tenants` to the appropriate 409
/// body; the store's unique index is the single authority for the race in
/// concurrent tenant creation, never an application-level check.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(c) if c.contains("bot_token") => {
                    AppError::Conflict("botToken already in use".into())
                }
                Some(c) if c.contains("client_id") => {
                    AppError::Conflict("clientId already in use".into())
                }
                _ => AppError::Conflict("already in use".into()),
            };
        }
    }
    AppError::Database(err)
}

pub async fn create_tenant(pool: &PgPool, req: CreateTenantRequest) -> Result<Tenant> {
    validate_create_request(&req)?;

    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        INSERT INTO tenants (id, bot_token, client_id, client_secret, public_key, private_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.bot_token.unwrap())
    .bind(req.client_id.unwrap())
    .bind(req.client_secret.unwrap())
    .bind(req.public_key.unwrap())
    .bind(req.private_key.unwrap())
    .fetch_one(&mut *tx)
    .await
    .map_err(map_unique_violation)?;

    for guild in req.guilds.unwrap_or_default() {
        sqlx::query("INSERT INTO guilds (tenant_id, id, name) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&guild.id)
            .bind(&guild.name)
            .execute(&mut *tx)
            .await?;

        for channel in guild.channels {
            sqlx::query(
                "INSERT INTO channels (tenant_id, id, guild_id, name) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(&channel.id)
            .bind(&guild.id)
            .bind(&channel.name)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(tenant)
}

pub async fn get_tenant(pool: &PgPool, id: Uuid) -> Result<Option<Tenant>> {
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(tenant)
}

pub async fn delete_tenant(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes all mutable rows for `id` and resets `next_id` to 1 in a single
/// transaction. Guild/channel topology and tenant credentials survive.
pub async fn reset_tenant(pool: &PgPool, id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tenants WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        tx.rollback().await?;
        return Ok(false);
    }

    for table in [
        "followups",
        "interaction_responses",
        "registered_commands",
        "reactions",
        "message_edits",
        "messages",
        "access_tokens",
        "auth_codes",
        "audit_logs",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE tenant_id = $1"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("UPDATE tenants SET next_id = 1 WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Atomically increments and returns the tenant's `next_id`, in a single
/// `UPDATE ... RETURNING` statement so concurrent generators for the same
/// tenant observe distinct, contiguous values.
pub async fn generate_id(pool: &PgPool, tenant_id: Uuid, prefix: &str) -> Result<String> {
    let (next,): (i64,) = sqlx::query_as(
        "UPDATE tenants SET next_id = next_id + 1 WHERE id = $1 RETURNING next_id",
    )
    .bind(tenant_id)
    .fetch_one(pool)
    .await?;

    Ok(format!("{prefix}-{}", next - 1))
}

pub async fn list_tenants(pool: &PgPool) -> Result<Vec<TenantSummary>> {
    let rows: Vec<(Uuid, String, DateTime<Utc>, i64, i64)> = sqlx::query_as(
        r#"
        SELECT
            t.id,
            t.client_id,
            t.created_at,
            COUNT(DISTINCT g.id) AS guild_count,
            COUNT(DISTINCT c.id) AS channel_count
        FROM tenants t
        LEFT JOIN guilds g ON g.tenant_id = t.id
        LEFT JOIN channels c ON c.tenant_id = t.id
        GROUP BY t.id, t.client_id, t.created_at
        ORDER BY t.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, client_id, created_at, guild_count, channel_count)| TenantSummary {
                id,
                client_id,
                created_at,
                guild_count,
                channel_count,
            },
        )
        .collect())
}
