//! Shared test fixtures: stub providers and pipeline wiring.
#![allow(dead_code)] // each test binary uses a subset of these helpers

use async_trait::async_trait;
use catalog_importer::core::coordinator::SessionCoordinator;
use catalog_importer::core::resolution::ResolutionService;
use catalog_importer::db::records::RecordRepository;
use catalog_importer::db::Database;
use catalog_importer::models::config::ImportConfig;
use catalog_importer::models::media::{
    Candidate, CatalogDetail, MediaKind, SupplementaryRatings,
};
use catalog_importer::services::provider::{
    CatalogProvider, RatingsProvider, RecordStore,
};
use catalog_importer::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Canned catalog provider: search results keyed by query, details by id.
#[derive(Default)]
pub struct StubCatalog {
    results: HashMap<String, Vec<Candidate>>,
    details: HashMap<u64, CatalogDetail>,
    delay: Option<Duration>,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, candidates: Vec<Candidate>) -> Self {
        self.results.insert(query.to_string(), candidates);
        self
    }

    /// Register a candidate with a matching canned detail payload.
    pub fn with_entry(self, query: &str, candidate: Candidate) -> Self {
        let detail = detail_for(&candidate);
        self.with_results(query, vec![candidate]).with_detail(detail)
    }

    pub fn with_detail(mut self, detail: CatalogDetail) -> Self {
        self.details.insert(detail.tmdb_id, detail);
        self
    }

    /// Delay every search, to exercise the per-row timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CatalogProvider for StubCatalog {
    async fn search(
        &self,
        query: &str,
        _year: Option<u16>,
        _kind: MediaKind,
    ) -> Result<Vec<Candidate>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    async fn fetch_detail(&self, id: u64, _kind: MediaKind) -> Result<CatalogDetail> {
        self.details
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::ProviderUnavailable(format!("no canned detail for {id}")))
    }

    async fn download_artwork(&self, _path: &str, _target_stem: &str) -> Option<PathBuf> {
        None
    }
}

/// Ratings provider that always fails; enrichment must tolerate it.
pub struct FailingRatings;

#[async_trait]
impl RatingsProvider for FailingRatings {
    async fn fetch_ratings(
        &self,
        _imdb_id: Option<&str>,
        _title: &str,
        _year: Option<u16>,
    ) -> Result<SupplementaryRatings> {
        Err(Error::ProviderUnavailable("ratings stub down".into()))
    }
}

/// Import tuning for tests: small batches, no delay.
pub fn fast_config() -> ImportConfig {
    ImportConfig {
        batch_size: 2,
        batch_delay_ms: 0,
        request_timeout_secs: 30,
    }
}

/// Wire a coordinator and resolution service over an in-memory database.
pub fn build_pipeline(
    db: &Database,
    catalog: StubCatalog,
    config: ImportConfig,
) -> (Arc<SessionCoordinator>, ResolutionService) {
    let provider: Arc<dyn CatalogProvider> = Arc::new(catalog);
    let ratings: Arc<dyn RatingsProvider> = Arc::new(FailingRatings);
    let records: Arc<dyn RecordStore> = Arc::new(RecordRepository::new(db));

    let coordinator = Arc::new(SessionCoordinator::new(
        db.clone(),
        provider.clone(),
        ratings.clone(),
        records.clone(),
        config,
    ));
    let resolution = ResolutionService::new(db.clone(), provider, ratings, records);

    (coordinator, resolution)
}

/// A search candidate with the given rating/popularity.
pub fn candidate(id: u64, title: &str, popularity: Option<f32>, vote: Option<f32>) -> Candidate {
    Candidate {
        id,
        title: title.to_string(),
        original_title: None,
        release_date: Some("2001-04-25".to_string()),
        popularity,
        vote_average: vote,
        kind: MediaKind::Movie,
    }
}

/// A minimal detail payload matching a candidate.
pub fn detail_for(candidate: &Candidate) -> CatalogDetail {
    CatalogDetail {
        tmdb_id: candidate.id,
        imdb_id: None,
        title: candidate.title.clone(),
        original_title: candidate.original_title.clone(),
        year: Some(2001),
        release_date: candidate.release_date.clone(),
        overview: Some("A canned overview.".to_string()),
        runtime: Some(120),
        vote_average: candidate.vote_average,
        poster_path: None,
        backdrop_path: None,
        trailer: None,
        cast: Vec::new(),
        crew: Vec::new(),
    }
}

/// Identity column mapping for title/original_title/year.
pub fn identity_mapping() -> HashMap<String, String> {
    ["title", "original_title", "year"]
        .iter()
        .map(|f| (f.to_string(), f.to_string()))
        .collect()
}

/// A raw CSV-like row with just a title and optional year.
pub fn row(title: &str, year: &str) -> HashMap<String, String> {
    let mut row = HashMap::new();
    row.insert("title".to_string(), title.to_string());
    row.insert("year".to_string(), year.to_string());
    row
}

/// Count persisted records directly.
pub async fn record_count(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM records")
        .fetch_one(db.pool())
        .await
        .expect("count records")
}
