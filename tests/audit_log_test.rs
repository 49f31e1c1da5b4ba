mod common;

use common::{cleanup_test_data, init_test_logging, setup_test_db};
use fakecord::handlers::test_control::{self, AuditLogQuery};
use fakecord::models::{CreateChannelRequest, CreateGuildRequest, CreateTenantRequest};
use fakecord::store::audit::{insert_audit_log, NewAuditLogEntry};

async fn bootstrap(pool: &sqlx::PgPool) -> fakecord::models::TenantResponse {
    let req = CreateTenantRequest {
        bot_token: Some("bot-audit".into()),
        client_id: Some("client-audit".into()),
        client_secret: Some("secret".into()),
        public_key: Some("pub".into()),
        private_key: Some("priv".into()),
        guilds: Some(vec![CreateGuildRequest {
            id: "g".into(),
            name: "Guild".into(),
            channels: vec![CreateChannelRequest {
                id: "c".into(),
                name: "general".into(),
            }],
        }]),
    };
    test_control::create_tenant(pool, req).await.unwrap()
}

#[tokio::test]
async fn audit_log_listing_does_not_grow_from_being_read() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool).await;

    insert_audit_log(
        &pool,
        NewAuditLogEntry {
            tenant_id: Some(tenant.id),
            method: "POST".into(),
            url: "/api/v10/channels/c/messages".into(),
            request_body: Some(r#"{"content":"hi"}"#.into()),
            response_status: 200,
            response_body: Some(r#"{"id":"msg-1"}"#.into()),
        },
    )
    .await
    .unwrap();

    let first = test_control::get_audit_logs(
        &pool,
        tenant.id,
        AuditLogQuery {
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(first.total, 1);

    let second = test_control::get_audit_logs(
        &pool,
        tenant.id,
        AuditLogQuery {
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(second.total, 1);

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn audit_log_oversized_limit_request_still_succeeds() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool).await;

    let page = test_control::get_audit_logs(
        &pool,
        tenant.id,
        AuditLogQuery {
            limit: Some(10_000),
            offset: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 0);

    cleanup_test_data(&pool).await;
}
