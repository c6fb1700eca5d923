//! TMDB API client.

use crate::models::config::TmdbConfig;
use crate::models::media::{
    Candidate, CastCredit, CatalogDetail, CrewCredit, MediaKind,
};
use crate::services::provider::CatalogProvider;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// Artwork size requested from the image host.
const ARTWORK_SIZE: &str = "w500";

/// TMDB API client.
pub struct TmdbClient {
    api_key: String,
    language: String,
    /// Whether to use Bearer token authentication (API v4 style).
    use_bearer: bool,
    artwork_dir: PathBuf,
    client: reqwest::Client,
}

/// Movie search result.
#[derive(Debug, Deserialize)]
struct MovieSearchResult {
    results: Vec<MovieSearchItem>,
}

/// Movie search item.
#[derive(Debug, Deserialize)]
struct MovieSearchItem {
    id: u64,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    popularity: Option<f32>,
    vote_average: Option<f32>,
}

/// TV show search result.
#[derive(Debug, Deserialize)]
struct TvSearchResult {
    results: Vec<TvSearchItem>,
}

/// TV show search item.
#[derive(Debug, Deserialize)]
struct TvSearchItem {
    id: u64,
    name: String,
    original_name: Option<String>,
    first_air_date: Option<String>,
    popularity: Option<f32>,
    vote_average: Option<f32>,
}

/// Movie details.
#[derive(Debug, Deserialize)]
struct MovieDetails {
    id: u64,
    imdb_id: Option<String>,
    title: String,
    original_title: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    runtime: Option<u32>,
    vote_average: Option<f32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    credits: Option<Credits>,
    videos: Option<Videos>,
}

/// TV show details.
#[derive(Debug, Deserialize)]
struct TvDetails {
    id: u64,
    name: String,
    original_name: Option<String>,
    first_air_date: Option<String>,
    overview: Option<String>,
    episode_run_time: Option<Vec<u32>>,
    vote_average: Option<f32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    credits: Option<Credits>,
    videos: Option<Videos>,
    external_ids: Option<ExternalIds>,
}

/// Movie/TV credits.
#[derive(Debug, Deserialize)]
struct Credits {
    cast: Option<Vec<CastMember>>,
    crew: Option<Vec<CrewMember>>,
}

/// Cast member.
#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
    character: Option<String>,
    order: Option<u32>,
}

/// Crew member.
#[derive(Debug, Deserialize)]
struct CrewMember {
    name: String,
    job: String,
}

/// Videos container.
#[derive(Debug, Deserialize)]
struct Videos {
    results: Vec<Video>,
}

/// A single video reference.
#[derive(Debug, Deserialize)]
struct Video {
    key: String,
    site: String,
    #[serde(rename = "type")]
    video_type: String,
}

/// External IDs.
#[derive(Debug, Deserialize)]
struct ExternalIds {
    imdb_id: Option<String>,
}

impl TmdbClient {
    /// Create a new TMDB client.
    ///
    /// Bearer tokens start with "eyJ" (base64 encoded JWT header).
    pub fn new(config: &TmdbConfig, artwork_dir: PathBuf) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(Error::TmdbApiKeyMissing)?;
        let use_bearer = api_key.starts_with("eyJ");

        Ok(Self {
            api_key,
            language: config.language.clone(),
            use_bearer,
            artwork_dir,
            client: reqwest::Client::new(),
        })
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str, extra_params: &str) -> String {
        if self.use_bearer {
            format!(
                "{}/{}?language={}{}",
                TMDB_BASE_URL, path, self.language, extra_params
            )
        } else {
            format!(
                "{}/{}?api_key={}&language={}{}",
                TMDB_BASE_URL, path, self.api_key, self.language, extra_params
            )
        }
    }

    async fn search_movie(&self, query: &str, year: Option<u16>) -> Result<Vec<Candidate>> {
        let year_param = year.map(|y| format!("&year={}", y)).unwrap_or_default();
        let url = self.build_url(
            "search/movie",
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );

        let resp: MovieSearchResult = self.build_request(&url).send().await?.json().await?;
        Ok(resp
            .results
            .into_iter()
            .map(|item| Candidate {
                id: item.id,
                title: item.title,
                original_title: item.original_title,
                release_date: item.release_date,
                popularity: item.popularity,
                vote_average: item.vote_average,
                kind: MediaKind::Movie,
            })
            .collect())
    }

    async fn search_tv(&self, query: &str, year: Option<u16>) -> Result<Vec<Candidate>> {
        let year_param = year
            .map(|y| format!("&first_air_date_year={}", y))
            .unwrap_or_default();
        let url = self.build_url(
            "search/tv",
            &format!("&query={}{}", urlencoding::encode(query), year_param),
        );

        let resp: TvSearchResult = self.build_request(&url).send().await?.json().await?;
        Ok(resp
            .results
            .into_iter()
            .map(|item| Candidate {
                id: item.id,
                title: item.name,
                original_title: item.original_name,
                release_date: item.first_air_date,
                popularity: item.popularity,
                vote_average: item.vote_average,
                kind: MediaKind::Series,
            })
            .collect())
    }

    async fn movie_detail(&self, movie_id: u64) -> Result<CatalogDetail> {
        let url = self.build_url(
            &format!("movie/{}", movie_id),
            "&append_to_response=credits,videos",
        );
        let details: MovieDetails = self.build_request(&url).send().await?.json().await?;

        Ok(CatalogDetail {
            tmdb_id: details.id,
            imdb_id: details.imdb_id,
            title: details.title,
            original_title: details.original_title,
            year: year_of(details.release_date.as_deref()),
            release_date: details.release_date,
            overview: details.overview,
            runtime: details.runtime,
            vote_average: details.vote_average,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            trailer: trailer_of(details.videos),
            cast: cast_of(&details.credits),
            crew: crew_of(&details.credits),
        })
    }

    async fn tv_detail(&self, tv_id: u64) -> Result<CatalogDetail> {
        let url = self.build_url(
            &format!("tv/{}", tv_id),
            "&append_to_response=credits,videos,external_ids",
        );
        let details: TvDetails = self.build_request(&url).send().await?.json().await?;

        Ok(CatalogDetail {
            tmdb_id: details.id,
            imdb_id: details.external_ids.and_then(|ids| ids.imdb_id),
            title: details.name,
            original_title: details.original_name,
            year: year_of(details.first_air_date.as_deref()),
            release_date: details.first_air_date,
            overview: details.overview,
            runtime: details
                .episode_run_time
                .and_then(|runtimes| runtimes.first().copied()),
            vote_average: details.vote_average,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            trailer: trailer_of(details.videos),
            cast: cast_of(&details.credits),
            crew: crew_of(&details.credits),
        })
    }
}

#[async_trait]
impl CatalogProvider for TmdbClient {
    async fn search(
        &self,
        query: &str,
        year: Option<u16>,
        kind: MediaKind,
    ) -> Result<Vec<Candidate>> {
        match kind {
            MediaKind::Movie => self.search_movie(query, year).await,
            MediaKind::Series => self.search_tv(query, year).await,
        }
    }

    async fn fetch_detail(&self, id: u64, kind: MediaKind) -> Result<CatalogDetail> {
        match kind {
            MediaKind::Movie => self.movie_detail(id).await,
            MediaKind::Series => self.tv_detail(id).await,
        }
    }

    async fn download_artwork(&self, path: &str, target_stem: &str) -> Option<PathBuf> {
        let url = format!("{}/{}{}", TMDB_IMAGE_BASE_URL, ARTWORK_SIZE, path);

        let bytes = match self.client.get(&url).send().await {
            Ok(resp) => match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Artwork body read failed for {}: {}", path, e);
                    return None;
                }
            },
            Err(e) => {
                tracing::warn!("Artwork download failed for {}: {}", path, e);
                return None;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.artwork_dir).await {
            tracing::warn!("Cannot create artwork dir: {}", e);
            return None;
        }

        let target = self.artwork_dir.join(format!("{}.jpg", target_stem));
        match tokio::fs::write(&target, &bytes).await {
            Ok(()) => Some(target),
            Err(e) => {
                tracing::warn!("Cannot write artwork {}: {}", target.display(), e);
                None
            }
        }
    }
}

/// Extract the year from a YYYY-MM-DD date string.
fn year_of(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse().ok())
}

/// Pick the first YouTube trailer key.
fn trailer_of(videos: Option<Videos>) -> Option<String> {
    videos?
        .results
        .into_iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
        .map(|v| v.key)
}

fn cast_of(credits: &Option<Credits>) -> Vec<CastCredit> {
    credits
        .as_ref()
        .and_then(|c| c.cast.as_ref())
        .map(|cast| {
            cast.iter()
                .map(|m| CastCredit {
                    name: m.name.clone(),
                    character: m.character.clone(),
                    order: m.order,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn crew_of(credits: &Option<Credits>) -> Vec<CrewCredit> {
    credits
        .as_ref()
        .and_then(|c| c.crew.as_ref())
        .map(|crew| {
            crew.iter()
                .map(|m| CrewCredit {
                    name: m.name.clone(),
                    job: m.job.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}
