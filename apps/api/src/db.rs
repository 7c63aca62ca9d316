use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the analysis tables if they do not exist yet.
/// Idempotent so the service can start against a fresh database.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS heuristic_analyses (
            id UUID PRIMARY KEY,
            submission_id UUID NOT NULL,
            role_name TEXT NOT NULL,
            keyword_score INT NOT NULL,
            section_score INT NOT NULL,
            format_score INT NOT NULL,
            ats_score INT NOT NULL,
            found_skills TEXT[] NOT NULL DEFAULT '{}',
            missing_skills TEXT[] NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ai_analyses (
            id UUID PRIMARY KEY,
            submission_id UUID NOT NULL,
            role_name TEXT NOT NULL,
            model_used TEXT NOT NULL,
            resume_score INT NOT NULL,
            ats_score INT NOT NULL,
            strengths TEXT[] NOT NULL DEFAULT '{}',
            weaknesses TEXT[] NOT NULL DEFAULT '{}',
            suggestions TEXT[] NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
