//! Import session repository.
//!
//! Counters are monotonically non-decreasing and only move inside the same
//! transaction as the row/unmatched-item outcome that causes the change.

use crate::db::Database;
use crate::models::session::{ImportSession, SessionStatus};
use crate::Result;
use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

/// Repository over the `import_sessions` table.
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Create a new session in the `pending` state.
    pub async fn create(&self) -> Result<ImportSession> {
        let now = Utc::now();
        let session = ImportSession {
            id: Uuid::new_v4().to_string(),
            status: SessionStatus::Pending,
            total: 0,
            processed: 0,
            auto_resolved: 0,
            manual_resolved: 0,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO import_sessions
                (id, status, total, processed, auto_resolved, manual_resolved,
                 created_at, updated_at)
            VALUES (?1, ?2, 0, 0, 0, 0, ?3, ?3)
            "#,
        )
        .bind(&session.id)
        .bind(session.status.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<ImportSession>> {
        let row = sqlx::query("SELECT * FROM import_sessions WHERE id = ?1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            let status: String = row.get("status");
            Ok(ImportSession {
                id: row.get("id"),
                status: status.parse()?,
                total: row.get("total"),
                processed: row.get("processed"),
                auto_resolved: row.get("auto_resolved"),
                manual_resolved: row.get("manual_resolved"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
        })
        .transpose()
    }

    /// List sessions, most recent first.
    pub async fn list(&self) -> Result<Vec<ImportSession>> {
        let rows = sqlx::query("SELECT * FROM import_sessions ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let status: String = row.get("status");
                Ok(ImportSession {
                    id: row.get("id"),
                    status: status.parse()?,
                    total: row.get("total"),
                    processed: row.get("processed"),
                    auto_resolved: row.get("auto_resolved"),
                    manual_resolved: row.get("manual_resolved"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                })
            })
            .collect()
    }

    /// Move a session between states, guarded by the allowed predecessors.
    ///
    /// Returns whether the transition happened. A caller observing `false`
    /// raced another transition; the status never regresses.
    pub async fn transition(
        &self,
        session_id: &str,
        from: &[SessionStatus],
        to: SessionStatus,
    ) -> Result<bool> {
        let placeholders: Vec<String> = (0..from.len()).map(|i| format!("?{}", i + 3)).collect();
        let sql = format!(
            "UPDATE import_sessions SET status = ?1, updated_at = ?2
             WHERE id = ?{} AND status IN ({})",
            from.len() + 3,
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql).bind(to.as_str()).bind(Utc::now());
        for status in from {
            query = query.bind(status.as_str());
        }
        query = query.bind(session_id);

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// `pending -> processing`, recording the row total.
    pub async fn begin_processing(&self, session_id: &str, total: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE import_sessions SET status = ?1, total = ?2, updated_at = ?3
             WHERE id = ?4 AND status = ?5",
        )
        .bind(SessionStatus::Processing.as_str())
        .bind(total)
        .bind(Utc::now())
        .bind(session_id)
        .bind(SessionStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Advance counters for one completed batch.
    pub async fn record_batch(
        tx: &mut Transaction<'_, Sqlite>,
        session_id: &str,
        processed_delta: i64,
        auto_resolved_delta: i64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE import_sessions
             SET processed = processed + ?1,
                 auto_resolved = auto_resolved + ?2,
                 updated_at = ?3
             WHERE id = ?4",
        )
        .bind(processed_delta)
        .bind(auto_resolved_delta)
        .bind(Utc::now())
        .bind(session_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Count a manual resolution.
    ///
    /// `processed` already covers rows that became unmatched items during the
    /// batch phase, so the increment is clamped at `total` to keep
    /// `processed <= total` at every snapshot.
    pub async fn record_manual_resolution(
        tx: &mut Transaction<'_, Sqlite>,
        session_id: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE import_sessions
             SET manual_resolved = manual_resolved + 1,
                 processed = MIN(processed + 1, total),
                 updated_at = ?1
             WHERE id = ?2",
        )
        .bind(Utc::now())
        .bind(session_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Count an explicit ignore. Bumps `processed` only, never
    /// `manual_resolved`; the row was deliberately not imported.
    pub async fn record_ignore(
        tx: &mut Transaction<'_, Sqlite>,
        session_id: &str,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE import_sessions
             SET processed = MIN(processed + 1, total),
                 updated_at = ?1
             WHERE id = ?2",
        )
        .bind(Utc::now())
        .bind(session_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
