use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Followup, InteractionResponse};

/// Upserts the single response row for `(tenant, token)` via `INSERT …
/// ON CONFLICT DO UPDATE` — never a select-then-branch.
pub async fn upsert_interaction_response(
    pool: &PgPool,
    tenant_id: Uuid,
    token: &str,
    response_id: &str,
    payload: serde_json::Value,
) -> Result<InteractionResponse> {
    let response = sqlx::query_as::<_, InteractionResponse>(
        r#"
        INSERT INTO interaction_responses (tenant_id, interaction_token, response_id, payload, responded_at)
        VALUES ($1, $2, $3, $4, now())
        ON CONFLICT (tenant_id, interaction_token)
        DO UPDATE SET response_id = EXCLUDED.response_id,
                      payload = EXCLUDED.payload,
                      responded_at = EXCLUDED.responded_at
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(token)
    .bind(response_id)
    .bind(payload)
    .fetch_one(pool)
    .await?;
    Ok(response)
}

pub async fn get_interaction_response(
    pool: &PgPool,
    tenant_id: Uuid,
    token: &str,
) -> Result<Option<InteractionResponse>> {
    let response = sqlx::query_as::<_, InteractionResponse>(
        "SELECT * FROM interaction_responses WHERE tenant_id = $1 AND interaction_token = $2",
    )
    .bind(tenant_id)
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(response)
}

pub async fn add_followup(
    pool: &PgPool,
    tenant_id: Uuid,
    id: &str,
    token: &str,
    payload: serde_json::Value,
) -> Result<Followup> {
    let followup = sqlx::query_as::<_, Followup>(
        r#"
        INSERT INTO followups (tenant_id, id, interaction_token, payload)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(tenant_id)
    .bind(id)
    .bind(token)
    .bind(payload)
    .fetch_one(pool)
    .await?;
    Ok(followup)
}

pub async fn list_followups(
    pool: &PgPool,
    tenant_id: Uuid,
    token: &str,
) -> Result<Vec<Followup>> {
    let followups = sqlx::query_as::<_, Followup>(
        "SELECT * FROM followups WHERE tenant_id = $1 AND interaction_token = $2 ORDER BY created_at",
    )
    .bind(tenant_id)
    .bind(token)
    .fetch_all(pool)
    .await?;
    Ok(followups)
}
