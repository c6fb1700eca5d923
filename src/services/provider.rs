//! Provider seams.
//!
//! The pipeline never talks to TMDB/OMDb directly; it goes through these
//! traits so the matching and session logic can be exercised against stub
//! providers without a network.

use crate::models::media::{
    CanonicalRecord, Candidate, CatalogDetail, EnrichedRecord, MediaKind, SupplementaryRatings,
};
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Primary catalog capability: search, detail, artwork.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search the external catalog.
    async fn search(
        &self,
        query: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> Result<Vec<Candidate>>;

    /// Fetch full detail (credits, identifiers, artwork paths, trailer ref).
    async fn fetch_detail(&self, id: u64, kind: MediaKind) -> Result<CatalogDetail>;

    /// Download one artwork asset to local storage.
    ///
    /// Returns `None` on failure; missing artwork never fails enrichment.
    async fn download_artwork(&self, path: &str, target_stem: &str) -> Option<PathBuf>;
}

/// Secondary ratings capability.
#[async_trait]
pub trait RatingsProvider: Send + Sync {
    /// Fetch supplementary ratings, preferring the cross-reference id.
    async fn fetch_ratings(
        &self,
        imdb_id: Option<&str>,
        title: &str,
        year: Option<u16>,
    ) -> Result<SupplementaryRatings>;
}

/// The record collection, as seen by the pipeline.
///
/// Lookups are a fast-path optimization only; the storage layer's UNIQUE
/// constraints remain the authoritative duplicate guard.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_by_title(&self, title: &str) -> Result<Option<CanonicalRecord>>;

    async fn find_by_tmdb_id(&self, tmdb_id: u64) -> Result<Option<CanonicalRecord>>;

    async fn find_by_imdb_id(&self, imdb_id: &str) -> Result<Option<CanonicalRecord>>;

    /// Persist an enriched record. Returns the existing record when a
    /// concurrent row already created one for the same title/external id.
    async fn insert(&self, record: &EnrichedRecord) -> Result<CanonicalRecord>;
}
