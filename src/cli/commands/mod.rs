//! Command implementations.

pub mod import;
pub mod resolve;
pub mod search;
pub mod sessions;

use crate::core::coordinator::SessionCoordinator;
use crate::core::resolution::ResolutionService;
use crate::db::records::RecordRepository;
use crate::db::Database;
use crate::models::config::Config;
use crate::services::omdb::OmdbClient;
use crate::services::provider::{CatalogProvider, RatingsProvider, RecordStore};
use crate::services::tmdb::TmdbClient;
use crate::Result;
use std::sync::Arc;

/// Wired-up pipeline shared by the commands that talk to providers.
pub struct AppContext {
    pub db: Database,
    pub coordinator: Arc<SessionCoordinator>,
    pub resolution: Arc<ResolutionService>,
}

/// Construct the pipeline from configuration.
pub async fn build_context(config: &Config) -> Result<AppContext> {
    let db = Database::open(&config.storage.database_path).await?;

    let provider: Arc<dyn CatalogProvider> = Arc::new(TmdbClient::new(
        &config.tmdb,
        config.storage.artwork_dir.clone(),
    )?);
    let ratings: Arc<dyn RatingsProvider> = Arc::new(OmdbClient::new(&config.omdb));
    let records: Arc<dyn RecordStore> = Arc::new(RecordRepository::new(&db));

    let coordinator = Arc::new(SessionCoordinator::new(
        db.clone(),
        provider.clone(),
        ratings.clone(),
        records.clone(),
        config.import.clone(),
    ));
    let resolution = Arc::new(ResolutionService::new(
        db.clone(),
        provider,
        ratings,
        records,
    ));

    Ok(AppContext {
        db,
        coordinator,
        resolution,
    })
}
