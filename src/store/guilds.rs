use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Channel, Guild};

/// The guild with the lexicographically smallest id, used by OAuth authorize
/// to pick the guild a new auth code is scoped to.
pub async fn first_guild(pool: &PgPool, tenant_id: Uuid) -> Result<Option<Guild>> {
    let guild = sqlx::query_as::<_, Guild>(
        "SELECT * FROM guilds WHERE tenant_id = $1 ORDER BY id ASC LIMIT 1",
    )
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;
    Ok(guild)
}

pub async fn get_guild(pool: &PgPool, tenant_id: Uuid, guild_id: &str) -> Result<Option<Guild>> {
    let guild = sqlx::query_as::<_, Guild>("SELECT * FROM guilds WHERE tenant_id = $1 AND id = $2")
        .bind(tenant_id)
        .bind(guild_id)
        .fetch_optional(pool)
        .await?;
    Ok(guild)
}

pub async fn get_channel(
    pool: &PgPool,
    tenant_id: Uuid,
    channel_id: &str,
) -> Result<Option<Channel>> {
    let channel = sqlx::query_as::<_, Channel>(
        "SELECT * FROM channels WHERE tenant_id = $1 AND id = $2",
    )
    .bind(tenant_id)
    .bind(channel_id)
    .fetch_optional(pool)
    .await?;
    Ok(channel)
}

pub async fn list_guilds_with_channels(
    pool: &PgPool,
    tenant_id: Uuid,
) -> Result<Vec<(Guild, Vec<Channel>)>> {
    let guilds = sqlx::query_as::<_, Guild>("SELECT * FROM guilds WHERE tenant_id = $1 ORDER BY id")
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;

    let mut out = Vec::with_capacity(guilds.len());
    for guild in guilds {
        let channels = sqlx::query_as::<_, Channel>(
            "SELECT * FROM channels WHERE tenant_id = $1 AND guild_id = $2 ORDER BY id",
        )
        .bind(tenant_id)
        .bind(&guild.id)
        .fetch_all(pool)
        .await?;
        out.push((guild, channels));
    }
    Ok(out)
}
