//! Catalog resolver.
//!
//! Wraps the pure candidate selection with the existing-record
//! short-circuits that make re-imports idempotent. Read-only against both
//! the provider and the local collection.

use crate::core::matcher::{self, TitleMatch};
use crate::models::media::{CanonicalRecord, Candidate, MediaKind};
use crate::services::provider::{CatalogProvider, RecordStore};
use crate::Result;
use std::sync::Arc;

/// Outcome of resolving one title.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Already in the collection; a successful short-circuit, not an error.
    Existing(CanonicalRecord),
    /// A single confident match, ready for enrichment.
    Confident(Candidate),
    /// Multiple plausible candidates; goes to the unmatched store.
    Ambiguous,
    /// No usable result; goes to the unmatched store.
    NotFound,
}

/// Resolves titles against the external catalog and the local collection.
pub struct CatalogResolver {
    provider: Arc<dyn CatalogProvider>,
    records: Arc<dyn RecordStore>,
}

impl CatalogResolver {
    pub fn new(provider: Arc<dyn CatalogProvider>, records: Arc<dyn RecordStore>) -> Self {
        Self { provider, records }
    }

    /// Resolve a title (optionally with a native-language original title and
    /// year hint) to a catalog candidate or an existing record.
    pub async fn resolve(
        &self,
        title: &str,
        original_title: Option<&str>,
        year: Option<u16>,
        kind: MediaKind,
    ) -> Result<Resolution> {
        // Same title already imported: idempotent re-import.
        if let Some(existing) = self.records.find_by_title(title).await? {
            return Ok(Resolution::Existing(existing));
        }

        let query = original_title.unwrap_or(title);
        let candidates = self.provider.search(query, year, kind).await?;

        let candidate = match matcher::select_candidate(query, candidates) {
            TitleMatch::Confident(candidate) => candidate,
            TitleMatch::Ambiguous => return Ok(Resolution::Ambiguous),
            TitleMatch::NotFound => return Ok(Resolution::NotFound),
        };

        // The same entry may already exist under a different spelling; the
        // primary external id catches that.
        if let Some(existing) = self.records.find_by_tmdb_id(candidate.id).await? {
            return Ok(Resolution::Existing(existing));
        }

        Ok(Resolution::Confident(candidate))
    }
}
