//! OMDb API client (secondary ratings provider).
//!
//! A failure here is always non-fatal to enrichment; callers fall back to
//! empty supplementary ratings.

use crate::models::config::OmdbConfig;
use crate::models::media::SupplementaryRatings;
use crate::services::provider::RatingsProvider;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// OMDb API client.
pub struct OmdbClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

/// OMDb lookup response.
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Ratings")]
    ratings: Option<Vec<OmdbRating>>,
}

/// A single rating entry.
#[derive(Debug, Deserialize)]
struct OmdbRating {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

impl OmdbClient {
    /// Create a new OMDb client.
    pub fn new(config: &OmdbConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RatingsProvider for OmdbClient {
    async fn fetch_ratings(
        &self,
        imdb_id: Option<&str>,
        title: &str,
        year: Option<u16>,
    ) -> Result<SupplementaryRatings> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ProviderUnavailable("OMDb API key not configured".into()))?;

        // Prefer the cross-reference id; fall back to a title lookup.
        let url = match imdb_id {
            Some(id) => format!("{}?apikey={}&i={}", OMDB_BASE_URL, api_key, id),
            None => {
                let year_param = year.map(|y| format!("&y={}", y)).unwrap_or_default();
                format!(
                    "{}?apikey={}&t={}{}",
                    OMDB_BASE_URL,
                    api_key,
                    urlencoding::encode(title),
                    year_param
                )
            }
        };

        let resp: OmdbResponse = self.client.get(&url).send().await?.json().await?;

        if resp.response != "True" {
            // OMDb signals "not found" in-band; treat as empty ratings.
            return Ok(SupplementaryRatings::default());
        }

        let rotten_tomatoes = resp
            .ratings
            .unwrap_or_default()
            .into_iter()
            .find(|r| r.source == "Rotten Tomatoes")
            .map(|r| r.value);

        Ok(SupplementaryRatings {
            imdb_rating: resp
                .imdb_rating
                .as_deref()
                .and_then(|r| r.parse().ok()),
            rotten_tomatoes,
            imdb_id: resp.imdb_id,
        })
    }
}
