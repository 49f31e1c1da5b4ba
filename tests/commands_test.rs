mod common;

use common::{cleanup_test_data, init_test_logging, setup_test_db};
use fakecord::error::AppError;
use fakecord::handlers::discord;
use fakecord::handlers::test_control;
use fakecord::middleware::audit::TenantContext;
use fakecord::models::{CreateChannelRequest, CreateGuildRequest, CreateTenantRequest};

async fn bootstrap(pool: &sqlx::PgPool) -> fakecord::models::TenantResponse {
    let req = CreateTenantRequest {
        bot_token: Some("bot-cmd".into()),
        client_id: Some("client-cmd".into()),
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

fn bot_headers() -> axum::http::HeaderMap {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        "Bot bot-cmd".parse().unwrap(),
    );
    headers.insert(axum::http::header::CONTENT_TYPE, "application/json".parse().unwrap());
    headers
}

#[tokio::test]
async fn bulk_overwrite_replaces_rather_than_merges() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool).await;
    let ctx = TenantContext::default();
    let headers = bot_headers();

    discord::bulk_overwrite_commands(
        &pool,
        &ctx,
        &headers,
        "client-cmd",
        "g",
        br#"[{"name":"old","type":1,"description":"x"}]"#,
    )
    .await
    .unwrap();

    discord::bulk_overwrite_commands(
        &pool,
        &ctx,
        &headers,
        "client-cmd",
        "g",
        br#"[{"name":"new","type":1,"description":"y"}]"#,
    )
    .await
    .unwrap();

    let commands = test_control::get_commands(&pool, tenant.id, "g").await.unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].payload["name"], "new");

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn bulk_overwrite_rejects_client_id_mismatch() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    bootstrap(&pool).await;
    let ctx = TenantContext::default();
    let headers = bot_headers();

    let result = discord::bulk_overwrite_commands(
        &pool,
        &ctx,
        &headers,
        "not-the-right-client",
        "g",
        br#"[]"#,
    )
    .await;
    assert!(matches!(result, Err(AppError::ClientIdMismatch)));

    cleanup_test_data(&pool).await;
}
