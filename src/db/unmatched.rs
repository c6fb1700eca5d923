//! Unmatched item store.
//!
//! Durable holding area for rows the resolver could not confidently resolve.
//! Delete-by-id reports whether a row was actually removed; "0 rows affected"
//! is the no-op signal that another action already consumed the item.

use crate::db::Database;
use crate::models::session::UnmatchedItem;
use crate::Result;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

/// A not-yet-persisted unmatched item.
#[derive(Debug, Clone)]
pub struct NewUnmatchedItem {
    pub title: String,
    pub original_title: Option<String>,
    pub row_payload: HashMap<String, String>,
    pub error: Option<String>,
}

/// Repository over the `unmatched_items` table.
#[derive(Clone)]
pub struct UnmatchedRepository {
    pool: SqlitePool,
}

impl UnmatchedRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    fn item_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<UnmatchedItem> {
        let payload: String = row.get("row_payload");
        Ok(UnmatchedItem {
            id: row.get("id"),
            session_id: row.get("session_id"),
            title: row.get("title"),
            original_title: row.get("original_title"),
            row_payload: serde_json::from_str(&payload)?,
            error: row.get("error"),
        })
    }

    /// Insert an item inside an existing transaction.
    pub async fn create(
        tx: &mut Transaction<'_, Sqlite>,
        session_id: &str,
        item: &NewUnmatchedItem,
    ) -> Result<UnmatchedItem> {
        let id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(&item.row_payload)?;

        sqlx::query(
            r#"
            INSERT INTO unmatched_items
                (id, session_id, title, original_title, row_payload, error)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(session_id)
        .bind(&item.title)
        .bind(&item.original_title)
        .bind(&payload)
        .bind(&item.error)
        .execute(&mut **tx)
        .await?;

        Ok(UnmatchedItem {
            id,
            session_id: session_id.to_string(),
            title: item.title.clone(),
            original_title: item.original_title.clone(),
            row_payload: item.row_payload.clone(),
            error: item.error.clone(),
        })
    }

    pub async fn list_by_session(&self, session_id: &str) -> Result<Vec<UnmatchedItem>> {
        let rows = sqlx::query(
            "SELECT * FROM unmatched_items WHERE session_id = ?1 ORDER BY rowid",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::item_from_row).collect()
    }

    /// Titles are not unique within a session; the first matching item (in
    /// insertion order) is returned.
    pub async fn find_by_session_and_title(
        &self,
        session_id: &str,
        title: &str,
    ) -> Result<Option<UnmatchedItem>> {
        let row = sqlx::query(
            "SELECT * FROM unmatched_items
             WHERE session_id = ?1 AND title = ?2
             ORDER BY rowid LIMIT 1",
        )
        .bind(session_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::item_from_row).transpose()
    }

    pub async fn count_by_session(&self, session_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM unmatched_items WHERE session_id = ?1")
                .bind(session_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete an item inside an existing transaction.
    ///
    /// Returns whether a row was deleted.
    pub async fn delete_by_id(
        tx: &mut Transaction<'_, Sqlite>,
        item_id: &str,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM unmatched_items WHERE id = ?1")
            .bind(item_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
