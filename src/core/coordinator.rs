//! Session coordinator.
//!
//! Owns one import session's lifecycle: batches rows, drives
//! normalize -> resolve -> enrich per row with bounded concurrency, records
//! per-row outcomes, and transitions session status.
//!
//! State machine: `pending -> processing -> {completed | pending_resolution
//! | failed}`. Batches run strictly in row order; rows within a batch run in
//! parallel with no relative ordering guarantee. Per-row errors never fail
//! the session; they become unmatched items carrying the error text.

use crate::core::enricher::Enricher;
use crate::core::normalizer;
use crate::core::resolver::{CatalogResolver, Resolution};
use crate::db::sessions::SessionRepository;
use crate::db::unmatched::{NewUnmatchedItem, UnmatchedRepository};
use crate::db::Database;
use crate::models::config::ImportConfig;
use crate::models::media::MediaKind;
use crate::models::session::{
    ColumnMapping, ImportSession, SessionSnapshot, SessionStatus, NormalizedRow,
};
use crate::services::provider::{CatalogProvider, RatingsProvider, RecordStore};
use crate::{Error, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of one row inside a batch.
enum RowOutcome {
    /// Imported or already existing; counts toward `auto_resolved`.
    Resolved,
    /// Held for human resolution.
    Unmatched(NewUnmatchedItem),
}

/// Drives import sessions end to end.
pub struct SessionCoordinator {
    db: Database,
    sessions: SessionRepository,
    unmatched: UnmatchedRepository,
    records: Arc<dyn RecordStore>,
    resolver: CatalogResolver,
    enricher: Enricher,
    config: ImportConfig,
}

impl SessionCoordinator {
    pub fn new(
        db: Database,
        provider: Arc<dyn CatalogProvider>,
        ratings: Arc<dyn RatingsProvider>,
        records: Arc<dyn RecordStore>,
        config: ImportConfig,
    ) -> Self {
        Self {
            sessions: SessionRepository::new(&db),
            unmatched: UnmatchedRepository::new(&db),
            resolver: CatalogResolver::new(provider.clone(), records.clone()),
            enricher: Enricher::new(provider, ratings),
            records,
            db,
            config,
        }
    }

    /// Create a fresh session in the `pending` state.
    pub async fn create_session(&self) -> Result<ImportSession> {
        self.sessions.create().await
    }

    /// Current status plus outstanding unmatched items, for polling callers.
    pub async fn get_status(&self, session_id: &str) -> Result<SessionSnapshot> {
        let session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;

        let unmatched = self.unmatched.list_by_session(session_id).await?;

        Ok(SessionSnapshot {
            status: session.status,
            total: session.total,
            processed: session.processed,
            auto_resolved: session.auto_resolved,
            manual_resolved: session.manual_resolved,
            unmatched,
        })
    }

    /// Run an import session to completion (or to `pending_resolution`).
    ///
    /// Fatal errors (no parseable rows, storage unavailable) move the session
    /// to `failed` before propagating; callers polling `get_status` observe
    /// the terminal status rather than the error.
    pub async fn run_import(
        &self,
        session_id: &str,
        rows: Vec<HashMap<String, String>>,
        mapping: &ColumnMapping,
        kind: MediaKind,
    ) -> Result<()> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;

        let row_count = rows.len();
        match self.run_inner(session_id, rows, mapping, kind).await {
            Ok(()) => Ok(()),
            // A rejected rerun must not touch the session; it may still be
            // running under another caller.
            Err(e @ Error::SessionAlreadyStarted(_)) => Err(e),
            Err(e) => {
                tracing::error!(
                    "Import session {} failed ({} rows): {}",
                    session_id,
                    row_count,
                    e
                );
                // Best effort; a session already in a terminal state stays put.
                let _ = self
                    .sessions
                    .transition(
                        session_id,
                        &[SessionStatus::Pending, SessionStatus::Processing],
                        SessionStatus::Failed,
                    )
                    .await;
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        session_id: &str,
        rows: Vec<HashMap<String, String>>,
        mapping: &ColumnMapping,
        kind: MediaKind,
    ) -> Result<()> {
        if rows.is_empty() {
            return Err(Error::EmptyImport);
        }

        let started = self
            .sessions
            .begin_processing(session_id, rows.len() as i64)
            .await?;
        if !started {
            // The guarded transition found the session outside `pending`;
            // re-running a started session would inflate its counters.
            return Err(Error::SessionAlreadyStarted(session_id.to_string()));
        }

        tracing::info!(
            "Session {}: importing {} rows in batches of {}",
            session_id,
            rows.len(),
            self.config.batch_size
        );

        let batch_size = self.config.batch_size.max(1);
        let batches: Vec<Vec<HashMap<String, String>>> =
            rows.chunks(batch_size).map(<[_]>::to_vec).collect();
        let batch_count = batches.len();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            let batch_len = batch.len() as i64;
            // Rows are moved into their futures; a future borrowing the
            // closure argument cannot satisfy the bounds `tokio::spawn`
            // puts on the whole import.
            let outcomes: Vec<Result<RowOutcome>> = stream::iter(batch)
                .map(|row| async move { self.process_row(&row, mapping, kind).await })
                .buffer_unordered(batch_size)
                .collect()
                .await;

            self.apply_batch(session_id, batch_len, outcomes).await?;

            tracing::debug!(
                "Session {}: batch {}/{} done",
                session_id,
                batch_index + 1,
                batch_count
            );

            if batch_index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
        }

        let remaining = self.unmatched.count_by_session(session_id).await?;
        let terminal = if remaining > 0 {
            SessionStatus::PendingResolution
        } else {
            SessionStatus::Completed
        };
        self.sessions
            .transition(session_id, &[SessionStatus::Processing], terminal)
            .await?;

        tracing::info!(
            "Session {}: processing finished with {} unmatched rows",
            session_id,
            remaining
        );
        Ok(())
    }

    /// Persist one batch's outcomes and counter updates in one transaction,
    /// so a crash mid-batch never leaves statistics ahead of outcomes.
    async fn apply_batch(
        &self,
        session_id: &str,
        batch_len: i64,
        outcomes: Vec<Result<RowOutcome>>,
    ) -> Result<()> {
        let mut auto_resolved = 0i64;
        let mut held = Vec::new();
        for outcome in outcomes {
            match outcome? {
                RowOutcome::Resolved => auto_resolved += 1,
                RowOutcome::Unmatched(item) => held.push(item),
            }
        }

        let mut tx = self.db.pool().begin().await?;
        for item in &held {
            UnmatchedRepository::create(&mut tx, session_id, item).await?;
        }
        SessionRepository::record_batch(&mut tx, session_id, batch_len, auto_resolved).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Resolve one row behind the per-row timeout and error boundary.
    ///
    /// Only storage failures escape as `Err`; everything else degrades to an
    /// unmatched item.
    async fn process_row(
        &self,
        raw_row: &HashMap<String, String>,
        mapping: &ColumnMapping,
        kind: MediaKind,
    ) -> Result<RowOutcome> {
        let row = match normalizer::normalize(raw_row, mapping) {
            Ok(row) => row,
            Err(e) => {
                return Ok(RowOutcome::Unmatched(NewUnmatchedItem {
                    title: "(untitled)".to_string(),
                    original_title: None,
                    row_payload: raw_row.clone(),
                    error: Some(e.to_string()),
                }));
            }
        };

        let attempt = tokio::time::timeout(
            self.config.request_timeout(),
            self.resolve_and_persist(&row, kind),
        )
        .await
        .unwrap_or(Err(Error::RowTimeout));

        match attempt {
            Ok(outcome) => Ok(outcome),
            Err(e @ Error::Database(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Row '{}' failed: {}", row.title(), e);
                Ok(RowOutcome::Unmatched(self.unmatched_from_row(&row, Some(e.to_string()))))
            }
        }
    }

    async fn resolve_and_persist(&self, row: &NormalizedRow, kind: MediaKind) -> Result<RowOutcome> {
        let resolution = self
            .resolver
            .resolve(row.title(), row.original_title(), row.year(), kind)
            .await?;

        match resolution {
            Resolution::Existing(record) => {
                tracing::debug!("'{}' already in collection as '{}'", row.title(), record.title);
                Ok(RowOutcome::Resolved)
            }
            Resolution::Confident(candidate) => {
                let enriched = self.enricher.enrich(&candidate).await?;
                self.records.insert(&enriched).await?;
                tracing::info!("Imported '{}' (tmdb {})", candidate.title, candidate.id);
                Ok(RowOutcome::Resolved)
            }
            Resolution::Ambiguous => Ok(RowOutcome::Unmatched(
                self.unmatched_from_row(row, Some("multiple plausible candidates".to_string())),
            )),
            Resolution::NotFound => Ok(RowOutcome::Unmatched(self.unmatched_from_row(row, None))),
        }
    }

    fn unmatched_from_row(&self, row: &NormalizedRow, error: Option<String>) -> NewUnmatchedItem {
        NewUnmatchedItem {
            title: row.title().to_string(),
            original_title: row.original_title().map(str::to_string),
            row_payload: row.fields.clone(),
            error,
        }
    }
}
