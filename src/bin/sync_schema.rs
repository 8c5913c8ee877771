//! Creates the `users` table and its indexes without starting the server.

use user_enrichment_api::db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_enrichment_api=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("DBurl"))
        .map_err(|_| anyhow::anyhow!("DATABASE_URL (or DBurl) must be set"))?;

    let db = Database::new(&database_url).await?;
    db.sync_schema().await?;

    let columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT column_name, data_type FROM information_schema.columns WHERE table_name = 'users' ORDER BY ordinal_position",
    )
    .fetch_all(&db.pool)
    .await?;

    println!("users:");
    for (col, type_) in columns {
        println!("  - {}: {}", col, type_);
    }

    Ok(())
}
