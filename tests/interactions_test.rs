mod common;

use common::{cleanup_test_data, init_test_logging, setup_test_db};
use fakecord::handlers::discord;
use fakecord::handlers::test_control;
use fakecord::middleware::audit::TenantContext;
use fakecord::models::{CreateChannelRequest, CreateGuildRequest, CreateTenantRequest};

async fn bootstrap(pool: &sqlx::PgPool) -> fakecord::models::TenantResponse {
    let req = CreateTenantRequest {
        bot_token: Some("bot-interact".into()),
        client_id: Some("client-interact".into()),
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

fn json_headers() -> axum::http::HeaderMap {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(axum::http::header::CONTENT_TYPE, "application/json".parse().unwrap());
    headers
}

#[tokio::test]
async fn editing_interaction_response_twice_upserts_not_duplicates() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool).await;
    let ctx = TenantContext::default();
    let headers = json_headers();

    discord::edit_interaction_response(
        &pool,
        &ctx,
        &headers,
        "client-interact",
        "tok-1",
        br#"{"content":"first"}"#,
    )
    .await
    .unwrap();

    let second = discord::edit_interaction_response(
        &pool,
        &ctx,
        &headers,
        "client-interact",
        "tok-1",
        br#"{"content":"second"}"#,
    )
    .await
    .unwrap();
    assert_eq!(second["content"], "second");

    let stored = test_control::get_interaction_response(&pool, tenant.id, "tok-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.payload["content"], "second");

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn followups_accumulate_per_token() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool).await;
    let ctx = TenantContext::default();
    let headers = json_headers();

    discord::send_followup(
        &pool,
        &ctx,
        &headers,
        "client-interact",
        "tok-2",
        br#"{"content":"one"}"#,
    )
    .await
    .unwrap();
    discord::send_followup(
        &pool,
        &ctx,
        &headers,
        "client-interact",
        "tok-2",
        br#"{"content":"two"}"#,
    )
    .await
    .unwrap();

    let followups = test_control::get_followups(&pool, tenant.id, "tok-2").await.unwrap();
    assert_eq!(followups.len(), 2);

    cleanup_test_data(&pool).await;
}
