mod common;

use axum::http::HeaderMap;
use common::{cleanup_test_data, init_test_logging, setup_test_db};
use fakecord::error::AppError;
use fakecord::handlers::discord;
use fakecord::handlers::test_control;
use fakecord::middleware::audit::TenantContext;
use fakecord::models::{
    CreateAuthCodeRequest, CreateChannelRequest, CreateGuildRequest, CreateTenantRequest,
};

async fn bootstrap(pool: &sqlx::PgPool) -> fakecord::models::TenantResponse {
    let req = CreateTenantRequest {
        bot_token: Some("bot-oauth".into()),
        client_id: Some("client-oauth".into()),
        client_secret: Some("top-secret".into()),
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
async fn authorize_issues_a_code_scoped_to_the_first_guild() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    bootstrap(&pool).await;

    let result = discord::authorize(
        &pool,
        discord::AuthorizeQuery {
            client_id: "client-oauth".into(),
            redirect_uri: "https://example.com/callback".into(),
            state: Some("xyz".into()),
        },
    )
    .await
    .unwrap();

    assert!(result.redirect_to.starts_with("https://example.com/callback?code="));
    assert!(result.redirect_to.contains("guild_id=g"));
    assert!(result.redirect_to.contains("state=xyz"));

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn replayed_auth_code_is_rejected_on_second_exchange() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool).await;
    let code = test_control::create_auth_code(
        &pool,
        tenant.id,
        CreateAuthCodeRequest {
            guild_id: "g".into(),
            redirect_uri: "https://example.com/callback".into(),
        },
    )
    .await
    .unwrap()
    .code;

    let form = discord::TokenExchangeForm {
        client_id: Some("client-oauth".into()),
        client_secret: Some("top-secret".into()),
        code: Some(code.clone()),
        redirect_uri: Some("https://example.com/callback".into()),
    };

    let first = discord::exchange_token(&pool, form).await.unwrap();
    assert_eq!(first.token_type, "Bearer");

    let second = discord::exchange_token(
        &pool,
        discord::TokenExchangeForm {
            client_id: Some("client-oauth".into()),
            client_secret: Some("top-secret".into()),
            code: Some(code),
            redirect_uri: Some("https://example.com/callback".into()),
        },
    )
    .await;
    assert!(matches!(second, Err(AppError::OAuthInvalidGrant)));

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        format!("Bearer {}", first.access_token).parse().unwrap(),
    );
    let ctx = TenantContext::default();
    let user = discord::get_current_user(&pool, &ctx, &headers).await.unwrap();
    assert_eq!(user["id"], format!("fake-user-{}", tenant.id));

    cleanup_test_data(&pool).await;
}

#[tokio::test]
async fn token_exchange_rejects_redirect_uri_mismatch() {
    init_test_logging();
    let pool = setup_test_db().await;
    cleanup_test_data(&pool).await;

    let tenant = bootstrap(&pool).await;
    let code = test_control::create_auth_code(
        &pool,
        tenant.id,
        CreateAuthCodeRequest {
            guild_id: "g".into(),
            redirect_uri: "https://example.com/callback".into(),
        },
    )
    .await
    .unwrap()
    .code;

    let form = discord::TokenExchangeForm {
        client_id: Some("client-oauth".into()),
        client_secret: Some("top-secret".into()),
        code: Some(code),
        redirect_uri: Some("https://example.com/wrong".into()),
    };

    let result = discord::exchange_token(&pool, form).await;
    assert!(matches!(result, Err(AppError::OAuthRedirectMismatch)));

    cleanup_test_data(&pool).await;
}
