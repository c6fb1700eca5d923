//! Record repository: the persisted catalog collection.

use crate::db::Database;
use crate::models::media::{CanonicalRecord, EnrichedRecord, MediaKind};
use crate::services::provider::RecordStore;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;
use uuid::Uuid;

/// Repository over the `records` table (plus cast/crew child tables).
#[derive(Clone)]
pub struct RecordRepository {
    pool: SqlitePool,
}

impl RecordRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CanonicalRecord> {
        let kind: String = row.get("kind");
        Ok(CanonicalRecord {
            id: row.get("id"),
            title: row.get("title"),
            tmdb_id: row.get::<i64, _>("tmdb_id") as u64,
            imdb_id: row.get("imdb_id"),
            kind: kind.parse::<MediaKind>()?,
            year: row.get::<Option<i64>, _>("year").map(|y| y as u16),
            runtime: row.get::<Option<i64>, _>("runtime").map(|r| r as u32),
            overview: row.get("overview"),
            rating: row.get("rating"),
            imdb_rating: row.get("imdb_rating"),
            rotten_tomatoes: row.get("rotten_tomatoes"),
            trailer: row.get("trailer"),
            poster_file: row.get::<Option<String>, _>("poster_file").map(PathBuf::from),
            backdrop_file: row
                .get::<Option<String>, _>("backdrop_file")
                .map(PathBuf::from),
            created_at: row.get("created_at"),
        })
    }

    async fn fetch_one_by(&self, sql: &str, bind: &str) -> Result<Option<CanonicalRecord>> {
        let row = sqlx::query(sql)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::record_from_row).transpose()
    }

    /// Insert the record row and its cast/crew in one transaction.
    ///
    /// Billing limits are applied here: at most [`MAX_CAST_MEMBERS`] cast
    /// members and the first credited director survive to storage.
    ///
    /// [`MAX_CAST_MEMBERS`]: crate::models::media::MAX_CAST_MEMBERS
    async fn try_insert(&self, record: &EnrichedRecord) -> Result<CanonicalRecord> {
        let detail = &record.detail;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let imdb_id = detail
            .imdb_id
            .clone()
            .or_else(|| record.ratings.imdb_id.clone());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO records
                (id, title, tmdb_id, imdb_id, kind, year, runtime, overview,
                 rating, imdb_rating, rotten_tomatoes, trailer,
                 poster_file, backdrop_file, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&id)
        .bind(&detail.title)
        .bind(detail.tmdb_id as i64)
        .bind(&imdb_id)
        .bind(record.kind.to_string())
        .bind(detail.year.map(|y| y as i64))
        .bind(detail.runtime.map(|r| r as i64))
        .bind(&detail.overview)
        .bind(detail.vote_average)
        .bind(record.ratings.imdb_rating)
        .bind(&record.ratings.rotten_tomatoes)
        .bind(&detail.trailer)
        .bind(record.poster_file.as_ref().map(|p| p.display().to_string()))
        .bind(
            record
                .backdrop_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for member in record.billed_cast() {
            sqlx::query(
                "INSERT INTO record_cast (record_id, name, character, bill_order)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&id)
            .bind(&member.name)
            .bind(&member.character)
            .bind(member.order.map(|o| o as i64))
            .execute(&mut *tx)
            .await?;
        }

        if let Some(director) = record.director() {
            sqlx::query(
                "INSERT INTO record_crew (record_id, name, job) VALUES (?1, ?2, ?3)",
            )
            .bind(&id)
            .bind(&director.name)
            .bind(&director.job)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(CanonicalRecord {
            id,
            title: detail.title.clone(),
            tmdb_id: detail.tmdb_id,
            imdb_id,
            kind: record.kind,
            year: detail.year,
            runtime: detail.runtime,
            overview: detail.overview.clone(),
            rating: detail.vote_average,
            imdb_rating: record.ratings.imdb_rating,
            rotten_tomatoes: record.ratings.rotten_tomatoes.clone(),
            trailer: detail.trailer.clone(),
            poster_file: record.poster_file.clone(),
            backdrop_file: record.backdrop_file.clone(),
            created_at: now,
        })
    }
}

#[async_trait]
impl RecordStore for RecordRepository {
    async fn find_by_title(&self, title: &str) -> Result<Option<CanonicalRecord>> {
        self.fetch_one_by(
            "SELECT * FROM records WHERE title = ?1 COLLATE NOCASE",
            title.trim(),
        )
        .await
    }

    async fn find_by_tmdb_id(&self, tmdb_id: u64) -> Result<Option<CanonicalRecord>> {
        let row = sqlx::query("SELECT * FROM records WHERE tmdb_id = ?1")
            .bind(tmdb_id as i64)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::record_from_row).transpose()
    }

    async fn find_by_imdb_id(&self, imdb_id: &str) -> Result<Option<CanonicalRecord>> {
        self.fetch_one_by("SELECT * FROM records WHERE imdb_id = ?1", imdb_id)
            .await
    }

    async fn insert(&self, record: &EnrichedRecord) -> Result<CanonicalRecord> {
        match self.try_insert(record).await {
            Ok(created) => Ok(created),
            Err(e) if e.is_unique_violation() => {
                // Lost the race to a concurrent row; the existing record wins.
                if let Some(existing) = self.find_by_tmdb_id(record.detail.tmdb_id).await? {
                    return Ok(existing);
                }
                if let Some(existing) = self.find_by_title(&record.detail.title).await? {
                    return Ok(existing);
                }
                Err(Error::other(format!(
                    "record insert conflicted but no existing record found for '{}'",
                    record.detail.title
                )))
            }
            Err(e) => Err(e),
        }
    }
}
