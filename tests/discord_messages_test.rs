mod common;

use axum::http::HeaderMap;
use common::{cleanup_test_data, init_test_logging, setup_test_db};
use fakecord::handlers::discord;
use fakecord::handlers::test_control;
use fakecord::middleware::audit::TenantContext;
use fakecord::models::{CreateChannelRequest, CreateGuildRequest, CreateTenantRequest};

async fn bootstrap(pool: &sqlx::PgPool, bot_token: &str, client_id: &str) -> fakecord::models::TenantResponse {
    let req = CreateTenantRequest {
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
    };
    test_control::create_tenant(pool, req).await.unwrap()
}

fn bot_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        format!("Bot {token}").parse().unwrap(),
    );
    headers.insert(axum::http::header::CONTENT_TYPE, "application/json".parse().unwrap());
    headers
}

#[tokio::test]
async fn send_then_fetch_message_with_empty_history() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool, "bot-send", "client-send").await;
    let ctx = TenantContext::default();
    let headers = bot_headers("bot-send");

    let response = discord::send_message(&pool, &ctx, &headers, "c", br#"{"content":"Hi"}"#)
        .await
        .unwrap();
    assert_eq!(response["content"], "Hi");
    assert_eq!(ctx.get(), Some(tenant.id));

    let messages = test_control::get_messages(&pool, tenant.id, "c").await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message.payload["content"], "Hi");
    assert!(messages[0].edit_history.is_empty());

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn edit_message_captures_pre_image_in_history() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool, "bot-edit", "client-edit").await;
    let ctx = TenantContext::default();
    let headers = bot_headers("bot-edit");

    discord::send_message(&pool, &ctx, &headers, "c", br#"{"content":"v1"}"#)
        .await
        .unwrap();

    let messages = test_control::get_messages(&pool, tenant.id, "c").await.unwrap();
    let message_id = messages[0].message.id.clone();

    discord::edit_message(&pool, &ctx, &headers, "c", &message_id, br#"{"content":"v2"}"#)
        .await
        .unwrap();

    let messages = test_control::get_messages(&pool, tenant.id, "c").await.unwrap();
    assert_eq!(messages[0].message.payload["content"], "v2");
    assert_eq!(messages[0].edit_history.len(), 1);
    assert_eq!(messages[0].edit_history[0].payload["content"], "v1");

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn add_reaction_unknown_message_is_not_found() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    bootstrap(&pool, "bot-react", "client-react").await;
    let ctx = TenantContext::default();
    let headers = bot_headers("bot-react");

    let result = discord::add_reaction(&pool, &ctx, &headers, "c", "missing-msg", "%F0%9F%91%8D").await;
    assert!(result.is_err());

    cleanup_test_data(&pool).await;
}
