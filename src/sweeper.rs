//! The hourly expiry sweeper: reclaims tenants whose `created_at` is older
//! than the configured max age, using the same cascade as delete-tenant.

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::store;

#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub deleted: usize,
    pub checked: bool,
}

/// Deletes every tenant created before `now - max_age`. Safe to run
/// concurrently with all other traffic: each tenant is removed by its own
/// `DELETE ... WHERE id = $1`, cascading to child tables via foreign keys,
/// the same path `DELETE /_test/tenants/:id` takes.
pub async fn cleanup_old_tenants(pool: &PgPool, max_age: Duration) -> Result<SweepSummary> {
    let cutoff = Utc::now() - max_age;

    let stale: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM tenants WHERE created_at < $1")
            .bind(cutoff)
            .fetch_all(pool)
            .await?;

    let mut deleted = 0;
    for (id,) in stale {
        if store::tenants::delete_tenant(pool, id).await? {
            deleted += 1;
        }
    }

    Ok(SweepSummary {
        deleted,
        checked: true,
    })
}
