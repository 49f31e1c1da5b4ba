use std::net::SocketAddr;

use chrono::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fakecord::{config, db, routes, sweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fakecord=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Starting server with config: {:?}", config);

    // Initialize database
    let pool = db::init_db(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Build application state
    let state = routes::AppState::new(pool.clone(), config.clone());

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Start server address (extract before state is moved)
    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port).parse()?;

    let scheduler = build_scheduler(pool, config.tenant_max_age_hours, &config.sweeper_cron).await?;
    scheduler.start().await?;

    // Build router
    let app = routes::app_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Registers the hourly expiry sweeper as a cron job. The job closure has no
/// error path back to the caller, so a failed sweep is logged and left for
/// the next tick rather than propagated.
async fn build_scheduler(
    pool: sqlx::PgPool,
    max_age_hours: i64,
    cron: &str,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pool = pool.clone();
        Box::pin(async move {
            match sweeper::cleanup_old_tenants(&pool, Duration::hours(max_age_hours)).await {
                Ok(summary) => tracing::info!(deleted = summary.deleted, "expiry sweep complete"),
                Err(err) => tracing::error!(error = ?err, "expiry sweep failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(scheduler)
}
