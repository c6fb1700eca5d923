//! Human-in-the-loop resolution service.
//!
//! Companion to the coordinator: drains the unmatched store by re-searching,
//! resolving a chosen candidate, or dismissing items, and keeps the session
//! statistics reconciled.

use crate::core::enricher::Enricher;
use crate::db::sessions::SessionRepository;
use crate::db::unmatched::UnmatchedRepository;
use crate::db::Database;
use crate::models::media::{CanonicalRecord, Candidate, MediaKind};
use crate::models::session::SessionStatus;
use crate::services::provider::{CatalogProvider, RatingsProvider, RecordStore};
use crate::{Error, Result};
use std::sync::Arc;

/// Resolves or dismisses unmatched items.
pub struct ResolutionService {
    db: Database,
    sessions: SessionRepository,
    unmatched: UnmatchedRepository,
    records: Arc<dyn RecordStore>,
    provider: Arc<dyn CatalogProvider>,
    enricher: Enricher,
}

impl ResolutionService {
    pub fn new(
        db: Database,
        provider: Arc<dyn CatalogProvider>,
        ratings: Arc<dyn RatingsProvider>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            sessions: SessionRepository::new(&db),
            unmatched: UnmatchedRepository::new(&db),
            enricher: Enricher::new(provider.clone(), ratings),
            records,
            provider,
            db,
        }
    }

    /// Search the catalog again, without the automated filtering, so a human
    /// sees all raw candidates.
    pub async fn search_again(
        &self,
        title: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> Result<Vec<Candidate>> {
        self.provider.search(title, year, kind).await
    }

    /// Resolve an unmatched item with a human-chosen candidate.
    ///
    /// Runs the candidate through enrichment, persists the record (with the
    /// same idempotency checks as the automated path: primary id, title, and
    /// cross-reference id), deletes the item, and counts a manual resolution.
    ///
    /// Fails with [`Error::UnmatchedItemNotFound`] when the item was already
    /// resolved or ignored by a concurrent action, so the caller's UI can
    /// refresh state instead of silently succeeding. The record is persisted
    /// before the item delete, so losing that race can still leave the
    /// record imported; persistence is idempotent and a retry converges on
    /// the same record.
    pub async fn resolve(
        &self,
        session_id: &str,
        title: &str,
        candidate: &Candidate,
    ) -> Result<CanonicalRecord> {
        let item = self
            .unmatched
            .find_by_session_and_title(session_id, title)
            .await?
            .ok_or_else(|| Error::UnmatchedItemNotFound(title.to_string()))?;

        let record = self.persist_candidate(candidate).await?;

        let mut tx = self.db.pool().begin().await?;
        let deleted = UnmatchedRepository::delete_by_id(&mut tx, &item.id).await?;
        if !deleted {
            // Raced a concurrent resolve/ignore on the same item.
            return Err(Error::UnmatchedItemNotFound(title.to_string()));
        }
        SessionRepository::record_manual_resolution(&mut tx, session_id).await?;
        tx.commit().await?;

        self.complete_if_drained(session_id).await?;
        Ok(record)
    }

    /// Dismiss an unmatched item: an explicit user decision not to import
    /// that row. Counts toward `processed` only, never `manual_resolved`.
    ///
    /// There is no server-side undo; once this commits, the row cannot be
    /// recovered through this service.
    pub async fn ignore(&self, session_id: &str, title: &str) -> Result<()> {
        let item = self
            .unmatched
            .find_by_session_and_title(session_id, title)
            .await?
            .ok_or_else(|| Error::UnmatchedItemNotFound(title.to_string()))?;

        let mut tx = self.db.pool().begin().await?;
        let deleted = UnmatchedRepository::delete_by_id(&mut tx, &item.id).await?;
        if !deleted {
            return Err(Error::UnmatchedItemNotFound(title.to_string()));
        }
        SessionRepository::record_ignore(&mut tx, session_id).await?;
        tx.commit().await?;

        self.complete_if_drained(session_id).await?;
        Ok(())
    }

    /// Enrich and persist a candidate, short-circuiting on any existing
    /// record for the same primary id, title, or cross-reference id.
    async fn persist_candidate(&self, candidate: &Candidate) -> Result<CanonicalRecord> {
        if let Some(existing) = self.records.find_by_tmdb_id(candidate.id).await? {
            return Ok(existing);
        }
        if let Some(existing) = self.records.find_by_title(&candidate.title).await? {
            return Ok(existing);
        }

        let enriched = self.enricher.enrich(candidate).await?;

        if let Some(imdb_id) = enriched.detail.imdb_id.as_deref() {
            if let Some(existing) = self.records.find_by_imdb_id(imdb_id).await? {
                return Ok(existing);
            }
        }

        self.records.insert(&enriched).await
    }

    /// `pending_resolution -> completed` once the last unmatched item drains.
    async fn complete_if_drained(&self, session_id: &str) -> Result<()> {
        if self.unmatched.count_by_session(session_id).await? == 0 {
            let completed = self
                .sessions
                .transition(
                    session_id,
                    &[SessionStatus::PendingResolution],
                    SessionStatus::Completed,
                )
                .await?;
            if completed {
                tracing::info!("Session {} completed after manual resolution", session_id);
            }
        }
        Ok(())
    }
}
