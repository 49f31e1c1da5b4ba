//! Pure lookup functions mapping an inbound request to a tenant.
//!
//! None of these functions authorize the request — they only answer "which
//! tenant, if any, does this credential belong to". Callers are responsible
//! for comparing the resolved tenant against request context (e.g. the
//! `client_id` path/body cross-check on bulk command overwrite).

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Tenant;
use crate::store;

/// Extracts the token from an `Authorization: Bot <token>` header value.
pub fn parse_bot_token(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix("Bot ").map(str::trim)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer_token(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix("Bearer ").map(str::trim)
}

pub async fn by_bot_token(pool: &PgPool, header: Option<&str>) -> Result<Option<Tenant>> {
    let Some(token) = parse_bot_token(header) else {
        return Ok(None);
    };
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE bot_token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(tenant)
}

pub async fn by_bearer_token(pool: &PgPool, header: Option<&str>) -> Result<Option<Tenant>> {
    let Some(token) = parse_bearer_token(header) else {
        return Ok(None);
    };
    store::auth::tenant_by_access_token(pool, token).await
}

pub async fn by_client_id(pool: &PgPool, client_id: &str) -> Result<Option<Tenant>> {
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE client_id = $1")
        .bind(client_id)
        .fetch_optional(pool)
        .await?;
    Ok(tenant)
}

pub async fn by_tenant_id(pool: &PgPool, id: Uuid) -> Result<Option<Tenant>> {
    store::tenants::get_tenant(pool, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bot_token() {
        assert_eq!(parse_bot_token(Some("Bot abc123")), Some("abc123"));
        assert_eq!(parse_bot_token(Some("Bearer abc123")), None);
        assert_eq!(parse_bot_token(None), None);
    }

    #[test]
    fn parses_bearer_token() {
        assert_eq!(parse_bearer_token(Some("Bearer xyz")), Some("xyz"));
        assert_eq!(parse_bearer_token(Some("Bot xyz")), None);
    }
}
