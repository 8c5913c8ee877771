use sqlx::{postgres::PgPoolOptions, PgPool};

/// Statements creating the `users` table and its indexes. Each is idempotent.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id          BIGSERIAL PRIMARY KEY,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        deleted_at  TIMESTAMPTZ,
        name        TEXT NOT NULL,
        surname     TEXT NOT NULL,
        age         INTEGER NOT NULL DEFAULT 0,
        gender      TEXT NOT NULL DEFAULT '',
        nationality TEXT NOT NULL DEFAULT ''
    )",
    "CREATE INDEX IF NOT EXISTS idx_users_deleted_at ON users (deleted_at)",
    "CREATE INDEX IF NOT EXISTS idx_users_gender ON users (gender)",
    "CREATE INDEX IF NOT EXISTS idx_users_nationality ON users (nationality)",
    "CREATE INDEX IF NOT EXISTS idx_users_age ON users (age)",
];

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates the `users` table if it does not exist yet.
    pub async fn sync_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Database schema synchronized");
        Ok(())
    }
}
