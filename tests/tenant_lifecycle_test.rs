mod common;

use common::{cleanup_test_data, init_test_logging, setup_test_db};
use fakecord::error::AppError;
use fakecord::handlers::test_control;
use fakecord::models::{CreateChannelRequest, CreateGuildRequest, CreateTenantRequest};

fn sample_request(bot_token: &str, client_id: &str) -> CreateTenantRequest {
    CreateTenantRequest {
        bot_token: Some(bot_token.into()),
        client_id: Some(client_id.into()),
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
    }
}

#[tokio::test]
async fn create_tenant_persists_guilds_and_channels() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = test_control::create_tenant(&pool, sample_request("bot-1", "client-1"))
        .await
        .unwrap();

    assert_eq!(tenant.guilds.len(), 1);
    assert_eq!(tenant.guilds[0].channels.len(), 1);
    assert_eq!(tenant.guilds[0].channels[0].id, "c");

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn create_tenant_rejects_guild_without_channels() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let mut req = sample_request("bot-2", "client-2");
    req.guilds.as_mut().unwrap()[0].channels.clear();

    let result = test_control::create_tenant(&pool, req).await;
    assert!(matches!(result, Err(AppError::MissingField(_))));

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn duplicate_bot_token_conflicts() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    test_control::create_tenant(&pool, sample_request("bot-dup", "client-a"))
        .await
        .unwrap();

    let second = test_control::create_tenant(&pool, sample_request("bot-dup", "client-b")).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn delete_tenant_cascades_child_tables() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = test_control::create_tenant(&pool, sample_request("bot-3", "client-3"))
        .await
        .unwrap();

    test_control::delete_tenant(&pool, tenant.id).await.unwrap();

    let channel_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM channels WHERE tenant_id = $1")
        .bind(tenant.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(channel_count, 0);

    let result = test_control::get_tenant(&pool, tenant.id).await;
    assert!(matches!(result, Err(AppError::TenantNotFound)));

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn reset_tenant_clears_mutable_state_but_keeps_topology() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = test_control::create_tenant(&pool, sample_request("bot-4", "client-4"))
        .await
        .unwrap();

    fakecord::store::messages::create_message(
        &pool,
        tenant.id,
        "msg-1",
        "c",
        serde_json::json!({"content": "hi"}),
    )
    .await
    .unwrap();

    test_control::reset_tenant(&pool, tenant.id).await.unwrap();

    let messages = test_control::get_messages(&pool, tenant.id, "c").await.unwrap();
    assert!(messages.is_empty());

    let refreshed = test_control::get_tenant(&pool, tenant.id).await.unwrap();
    assert_eq!(refreshed.guilds.len(), 1);
    assert_eq!(refreshed.guilds[0].channels.len(), 1);

    cleanup_test_data(&pool).await;
}
