use crate::constants::endpoints;
use crate::error::ConvoError;
use serde::{Deserialize, Serialize};

/// Metadata for one title. Either field may be missing; a hit with neither is `None` at the lookup level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poster {
    pub url: Option<String>,
    pub rating: Option<f32>,
}

/// Boundary to an external movie-metadata search.
#[async_trait::async_trait]
pub trait PosterLookup: Send + Sync {
    /// `Ok(None)` when the search has no results or the best hit has neither image nor rating.
    async fn lookup(&self, title: &str) -> Result<Option<Poster>, ConvoError>;
}

/// TMDB `search/movie` client.
pub struct TmdbPosterLookup {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovie {
    poster_path: Option<String>,
    vote_average: Option<f32>,
}

impl TmdbPosterLookup {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: endpoints::TMDB_BASE_URL.to_string(),
            image_base_url: endpoints::TMDB_IMAGE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }
}

#[async_trait::async_trait]
impl PosterLookup for TmdbPosterLookup {
    async fn lookup(&self, title: &str) -> Result<Option<Poster>, ConvoError> {
        let url = format!("{}/3/search/movie", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConvoError::Lookup(format!(
                "TMDB search failed ({status}): {body}"
            )));
        }

        let search: TmdbSearchResponse = response.json().await?;
        let Some(best) = search.results.into_iter().next() else {
            tracing::debug!(title, "no poster search results");
            return Ok(None);
        };

        let url = best
            .poster_path
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", self.image_base_url, path));
        if url.is_none() && best.vote_average.is_none() {
            return Ok(None);
        }
        Ok(Some(Poster {
            url,
            rating: best.vote_average,
        }))
    }
}
