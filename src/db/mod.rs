//! SQLite storage layer.
//!
//! The database handle is explicitly constructed and injected into the
//! pipeline components; there is no global singleton. Open at process start,
//! close at shutdown.

pub mod records;
pub mod sessions;
pub mod unmatched;

use crate::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Shared database handle.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and initialize the schema.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&db_url)
            .await?;

        let db = Self { pool };
        db.init().await?;
        tracing::info!("Opened database: {}", db_path.display());
        Ok(db)
    }

    /// Open an in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        // A single connection keeps the in-memory database alive and visible
        // to every query.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        // WAL allows concurrent readers while a batch is writing.
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&self.pool)
            .await?;

        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&self.pool)
            .await?;

        self.create_schema().await?;
        Ok(())
    }

    /// Create tables if needed. Idempotent.
    async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS import_sessions (
                id              TEXT PRIMARY KEY,
                status          TEXT NOT NULL,
                total           INTEGER NOT NULL DEFAULT 0,
                processed       INTEGER NOT NULL DEFAULT 0,
                auto_resolved   INTEGER NOT NULL DEFAULT 0,
                manual_resolved INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS unmatched_items (
                id             TEXT PRIMARY KEY,
                session_id     TEXT NOT NULL
                               REFERENCES import_sessions(id) ON DELETE CASCADE,
                title          TEXT NOT NULL,
                original_title TEXT,
                row_payload    TEXT NOT NULL,
                error          TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_unmatched_session
             ON unmatched_items(session_id)",
        )
        .execute(&self.pool)
        .await?;

        // UNIQUE on title and tmdb_id is the idempotency guarantee that makes
        // re-imports safe; the in-pipeline existence checks are a fast path.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL UNIQUE COLLATE NOCASE,
                tmdb_id         INTEGER NOT NULL UNIQUE,
                imdb_id         TEXT,
                kind            TEXT NOT NULL,
                year            INTEGER,
                runtime         INTEGER,
                overview        TEXT,
                rating          REAL,
                imdb_rating     REAL,
                rotten_tomatoes TEXT,
                trailer         TEXT,
                poster_file     TEXT,
                backdrop_file   TEXT,
                created_at      TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS record_cast (
                record_id  TEXT NOT NULL REFERENCES records(id) ON DELETE CASCADE,
                name       TEXT NOT NULL,
                character  TEXT,
                bill_order INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS record_crew (
                record_id TEXT NOT NULL REFERENCES records(id) ON DELETE CASCADE,
                name      TEXT NOT NULL,
                job       TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool. Further queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
