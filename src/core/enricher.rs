//! Record enrichment.
//!
//! Turns a confident candidate into a persistable record: full detail from
//! the primary provider, supplementary ratings from the secondary provider
//! (non-fatal), and locally cached artwork (also non-fatal).

use crate::models::media::{Candidate, EnrichedRecord, SupplementaryRatings};
use crate::services::provider::{CatalogProvider, RatingsProvider};
use crate::Result;
use std::sync::Arc;

/// Enriches confident candidates.
pub struct Enricher {
    provider: Arc<dyn CatalogProvider>,
    ratings: Arc<dyn RatingsProvider>,
}

impl Enricher {
    pub fn new(provider: Arc<dyn CatalogProvider>, ratings: Arc<dyn RatingsProvider>) -> Self {
        Self { provider, ratings }
    }

    /// Fetch detail, ratings, and artwork for a candidate.
    ///
    /// Only the primary detail fetch can fail the enrichment; ratings and
    /// artwork degrade to empty/absent.
    pub async fn enrich(&self, candidate: &Candidate) -> Result<EnrichedRecord> {
        let detail = self.provider.fetch_detail(candidate.id, candidate.kind).await?;

        let ratings = match self
            .ratings
            .fetch_ratings(detail.imdb_id.as_deref(), &detail.title, detail.year)
            .await
        {
            Ok(ratings) => ratings,
            Err(e) => {
                tracing::warn!(
                    "Secondary ratings unavailable for '{}': {}",
                    detail.title,
                    e
                );
                SupplementaryRatings::default()
            }
        };

        let stem = format!("{}-{}", candidate.kind, detail.tmdb_id);
        let poster_file = match &detail.poster_path {
            Some(path) => {
                self.provider
                    .download_artwork(path, &format!("{stem}-poster"))
                    .await
            }
            None => None,
        };
        let backdrop_file = match &detail.backdrop_path {
            Some(path) => {
                self.provider
                    .download_artwork(path, &format!("{stem}-backdrop"))
                    .await
            }
            None => None,
        };

        Ok(EnrichedRecord {
            kind: candidate.kind,
            detail,
            ratings,
            poster_file,
            backdrop_file,
        })
    }
}
