use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_enrichment_api::config::Config;
use user_enrichment_api::db::Database;
use user_enrichment_api::enrichment::HttpEnricher;
use user_enrichment_api::handlers::AppState;
use user_enrichment_api::repository::PgUserRepository;
use user_enrichment_api::routes::build_router;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, connects to the database,
/// synchronizes the schema, wires the repository and enrichment client into
/// the shared state, and serves the router.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_enrichment_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");
    db.sync_schema().await?;

    let enricher = HttpEnricher::from_config(&config)?;
    tracing::info!(
        "Enrichment client initialized (timeout {}s)",
        config.enrichment_timeout_secs
    );

    let app_state = Arc::new(AppState {
        repo: Arc::new(PgUserRepository::new(db.pool.clone())),
        enricher: Arc::new(enricher),
        config: config.clone(),
    });

    let app = build_router(app_state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
