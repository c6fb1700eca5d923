//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How many top-billed cast members are persisted per record.
pub const MAX_CAST_MEMBERS: usize = 10;

/// Crew job used to pick the persisted director.
pub const DIRECTOR_JOB: &str = "Director";

/// Catalog kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" | "film" => Ok(MediaKind::Movie),
            "series" | "tv" | "tvshow" | "show" => Ok(MediaKind::Series),
            other => Err(crate::Error::other(format!("unknown media kind: {other}"))),
        }
    }
}

/// An external search result before detail enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Primary catalog (TMDB) id.
    pub id: u64,
    /// Display title.
    pub title: String,
    /// Original/native-language title.
    pub original_title: Option<String>,
    /// Release/first-air date (YYYY-MM-DD).
    pub release_date: Option<String>,
    /// TMDB popularity score.
    pub popularity: Option<f32>,
    /// User rating (0-10).
    pub vote_average: Option<f32>,
    /// Catalog kind.
    pub kind: MediaKind,
}

/// Full detail for a candidate, fetched from the primary catalog provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDetail {
    /// Primary catalog (TMDB) id.
    pub tmdb_id: u64,
    /// IMDB cross-reference id.
    pub imdb_id: Option<String>,
    /// Display title.
    pub title: String,
    /// Original title.
    pub original_title: Option<String>,
    /// Release year.
    pub year: Option<u16>,
    /// Full release date (YYYY-MM-DD).
    pub release_date: Option<String>,
    /// Overview/synopsis.
    pub overview: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// User rating (0-10).
    pub vote_average: Option<f32>,
    /// Poster path on the provider's image host.
    pub poster_path: Option<String>,
    /// Backdrop path on the provider's image host.
    pub backdrop_path: Option<String>,
    /// Trailer reference (YouTube key).
    pub trailer: Option<String>,
    /// Cast, in billing order.
    pub cast: Vec<CastCredit>,
    /// Crew.
    pub crew: Vec<CrewCredit>,
}

/// A single cast credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastCredit {
    pub name: String,
    pub character: Option<String>,
    pub order: Option<u32>,
}

/// A single crew credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewCredit {
    pub name: String,
    pub job: String,
}

/// Supplementary ratings from the secondary provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplementaryRatings {
    /// IMDB rating (0-10).
    pub imdb_rating: Option<f32>,
    /// Rotten Tomatoes rating (e.g. "94%").
    pub rotten_tomatoes: Option<String>,
    /// IMDB id, when the lookup surfaced one we did not already have.
    pub imdb_id: Option<String>,
}

/// A fully enriched record, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Catalog kind.
    pub kind: MediaKind,
    /// Provider detail.
    pub detail: CatalogDetail,
    /// Supplementary ratings. Empty when the secondary provider failed.
    pub ratings: SupplementaryRatings,
    /// Locally cached poster, if the download succeeded.
    pub poster_file: Option<PathBuf>,
    /// Locally cached backdrop, if the download succeeded.
    pub backdrop_file: Option<PathBuf>,
}

impl EnrichedRecord {
    /// Top-billed cast, capped at [`MAX_CAST_MEMBERS`].
    pub fn billed_cast(&self) -> &[CastCredit] {
        let n = self.detail.cast.len().min(MAX_CAST_MEMBERS);
        &self.detail.cast[..n]
    }

    /// First credited director, if any.
    pub fn director(&self) -> Option<&CrewCredit> {
        self.detail.crew.iter().find(|c| c.job == DIRECTOR_JOB)
    }
}

/// The persisted, enriched catalog entry in the user's collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Opaque record id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Primary catalog (TMDB) id.
    pub tmdb_id: u64,
    /// IMDB cross-reference id.
    pub imdb_id: Option<String>,
    /// Catalog kind.
    pub kind: MediaKind,
    /// Release year.
    pub year: Option<u16>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Overview/synopsis.
    pub overview: Option<String>,
    /// TMDB rating (0-10).
    pub rating: Option<f32>,
    /// IMDB rating (0-10).
    pub imdb_rating: Option<f32>,
    /// Rotten Tomatoes rating.
    pub rotten_tomatoes: Option<String>,
    /// Trailer reference (YouTube key).
    pub trailer: Option<String>,
    /// Locally cached poster path.
    pub poster_file: Option<PathBuf>,
    /// Locally cached backdrop path.
    pub backdrop_file: Option<PathBuf>,
    /// Creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
}
