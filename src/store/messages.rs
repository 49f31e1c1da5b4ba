use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Message, MessageEdit, MessageWithHistory, Reaction};

pub async fn create_message(
    pool: &PgPool,
    tenant_id: Uuid,
    id: &str,
    channel_id: &str,
    payload: serde_json::Value,
) -> Result<Message> {
    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (tenant_id, id, channel_id, payload)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(id)
    .bind(channel_id)
    .bind(payload)
    .fetch_one(pool)
    .await?;
    Ok(message)
}

pub async fn get_message(
    pool: &PgPool,
    tenant_id: Uuid,
    message_id: &str,
) -> Result<Option<Message>> {
    let message = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE tenant_id = $1 AND id = $2",
    )
    .bind(tenant_id)
    .bind(message_id)
    .fetch_optional(pool)
    .await?;
    Ok(message)
}

/// Captures the pre-edit payload into `message_edits` and updates the message
/// in one transaction: insert the pre-image, then update, never reading the
/// payload into application memory and writing it back. Returns `None` if the
/// message doesn't exist, so the caller can map that to 404.
pub async fn edit_message(
    pool: &PgPool,
    tenant_id: Uuid,
    message_id: &str,
    new_payload: serde_json::Value,
) -> Result<Option<Message>> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO message_edits (tenant_id, message_id, payload, edited_at)
        SELECT tenant_id, id, payload, now()
        FROM messages
        WHERE tenant_id = $1 AND id = $2
        "#,
    )
    .bind(tenant_id)
    .bind(message_id)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    let updated = sqlx::query_as::<_, Message>(
        r#"
        UPDATE messages SET payload = $3
        WHERE tenant_id = $1 AND id = $2
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(message_id)
    .bind(new_payload)
    .fetch_optional(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn list_messages_with_history(
    pool: &PgPool,
    tenant_id: Uuid,
    channel_id: &str,
) -> Result<Vec<MessageWithHistory>> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE tenant_id = $1 AND channel_id = $2 ORDER BY created_at",
    )
    .bind(tenant_id)
    .bind(channel_id)
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(messages.len());
    for message in messages {
        let edit_history = sqlx::query_as::<_, MessageEdit>(
            "SELECT * FROM message_edits WHERE tenant_id = $1 AND message_id = $2 ORDER BY edited_at",
        )
        .bind(tenant_id)
        .bind(&message.id)
        .fetch_all(pool)
        .await?;

        out.push(MessageWithHistory {
            message,
            edit_history,
        });
    }
    Ok(out)
}

pub async fn add_reaction(
    pool: &PgPool,
    tenant_id: Uuid,
    channel_id: &str,
    message_id: &str,
    emoji: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO reactions (tenant_id, channel_id, message_id, emoji) VALUES ($1, $2, $3, $4)",
    )
    .bind(tenant_id)
    .bind(channel_id)
    .bind(message_id)
    .bind(emoji)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_reactions(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Reaction>> {
    let reactions = sqlx::query_as::<_, Reaction>(
        "SELECT * FROM reactions WHERE tenant_id = $1 ORDER BY created_at",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    Ok(reactions)
}
