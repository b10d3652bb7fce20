use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Tables backing the study resource, created if missing at startup.
/// Users are written by the login service; this service only reads them.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS studies (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        message TEXT NOT NULL,
        link TEXT NOT NULL,
        cards JSONB NOT NULL,
        sort_type TEXT NOT NULL DEFAULT 'open',
        categories JSONB NOT NULL DEFAULT '{}'::jsonb,
        is_live BOOLEAN NOT NULL DEFAULT TRUE,
        abandoned_no INTEGER NOT NULL DEFAULT 0,
        completed_no INTEGER NOT NULL DEFAULT 0,
        created_date TIMESTAMPTZ NOT NULL,
        launched_date TIMESTAMPTZ NOT NULL,
        edit_date TIMESTAMPTZ NOT NULL,
        end_date TIMESTAMPTZ
    )
    "#,
    "CREATE INDEX IF NOT EXISTS studies_user_id_idx ON studies (user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS clusters (
        id UUID PRIMARY KEY,
        study_id UUID NOT NULL REFERENCES studies(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        cards JSONB NOT NULL DEFAULT '[]'::jsonb,
        created_date TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS clusters_study_id_idx ON clusters (study_id)",
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Study schema verified ({} statements)", STATEMENTS.len());
    Ok(())
}
