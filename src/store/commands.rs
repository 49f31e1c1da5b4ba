use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::RegisteredCommand;

/// Replaces the entire `(tenant, guild)` command set in one transaction — a
/// concurrent reader sees either the old set or the new set, never a partial
/// one.
pub async fn bulk_overwrite_commands(
    pool: &PgPool,
    tenant_id: Uuid,
    guild_id: &str,
    commands: Vec<(String, serde_json::Value)>,
) -> Result<Vec<RegisteredCommand>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM registered_commands WHERE tenant_id = $1 AND guild_id = $2")
        .bind(tenant_id)
        .bind(guild_id)
        .execute(&mut *tx)
        .await?;

    let mut out = Vec::with_capacity(commands.len());
    for (id, payload) in commands {
        let command = sqlx::query_as::<_, RegisteredCommand>(
            r#"
            INSERT INTO registered_commands (tenant_id, id, guild_id, payload)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&id)
        .bind(guild_id)
        .bind(payload)
        .fetch_one(&mut *tx)
        .await?;
        out.push(command);
    }

    tx.commit().await?;
    Ok(out)
}

pub async fn list_commands(
    pool: &PgPool,
    tenant_id: Uuid,
    guild_id: &str,
) -> Result<Vec<RegisteredCommand>> {
    let commands = sqlx::query_as::<_, RegisteredCommand>(
        "SELECT * FROM registered_commands WHERE tenant_id = $1 AND guild_id = $2 ORDER BY registered_at",
    )
    .bind(tenant_id)
    .bind(guild_id)
    .fetch_all(pool)
    .await?;
    Ok(commands)
}
