use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::{Catalog, CatalogError, Lookup, MovieInfo};

const API_URL: &str = "https://www.omdbapi.com/";

/// Environment variable consulted when no key is stored or passed.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// Catalog backed by the OMDb HTTP API.
pub struct OmdbCatalog {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbCatalog {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CatalogError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: API_URL.to_string(),
        })
    }

    /// Point the client at a different host (staging mirrors, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_url(&self, title: &str) -> Result<Url, CatalogError> {
        Url::parse_with_params(
            &self.base_url,
            &[("apikey", self.api_key.as_str()), ("t", title), ("plot", "short")],
        )
        .map_err(|e| CatalogError::Api {
            status: 0,
            body: format!("invalid catalog url {}: {e}", self.base_url),
        })
    }

    fn parse_response(query: &str, text: &str) -> Result<Lookup, CatalogError> {
        let resp: ApiResponse = serde_json::from_str(text)?;
        if !resp.response.eq_ignore_ascii_case("true") {
            debug!(query, reason = resp.error.as_deref().unwrap_or(""), "catalog miss");
            return Ok(Lookup::NotFound {
                query: query.to_string(),
            });
        }
        let info = MovieInfo {
            id: resp.imdb_id.unwrap_or_default(),
            title: resp.title.unwrap_or_default(),
            genre: present(resp.genre),
            rating: present(resp.imdb_rating),
            director: present(resp.director),
            writer: present(resp.writer),
            year: present(resp.year),
            plot: present(resp.plot),
            poster_url: present(resp.poster),
        };
        Ok(Lookup::from_info(query, info))
    }
}

#[async_trait]
impl Catalog for OmdbCatalog {
    fn name(&self) -> &str {
        "omdb"
    }

    async fn resolve(&self, title: &str) -> Result<Lookup, CatalogError> {
        let url = self.request_url(title)?;
        // the request url carries the api key
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Http(e.without_url()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CatalogError::Http(e.without_url()))?;
        if !status.is_success() {
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        Self::parse_response(title, &text)
    }
}

/// OMDb reports missing fields as `"N/A"`.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "N/A")
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Genre")]
    genre: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "Writer")]
    writer: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}
