pub mod mock;
pub mod omdb;

use async_trait::async_trait;
use thiserror::Error;

/// Metadata for a single catalog title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MovieInfo {
    /// Catalog id, e.g. `tt1375666`.
    pub id: String,
    pub title: String,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub year: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
}

impl MovieInfo {
    /// A record with only the fields the vote tables need.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Public page for this title.
    pub fn page_url(&self) -> String {
        format!("https://www.imdb.com/title/{}", self.id)
    }
}

/// Result of resolving a free-text title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(MovieInfo),
    NotFound { query: String },
}

impl Lookup {
    /// Build a lookup result, treating a blank title or id as not found.
    pub fn from_info(query: &str, info: MovieInfo) -> Self {
        if info.title.trim().is_empty() || info.id.trim().is_empty() {
            Lookup::NotFound {
                query: query.to_string(),
            }
        } else {
            Lookup::Found(info)
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no catalog API key configured")]
    MissingApiKey,

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unreadable catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Resolves free-text titles to movie metadata.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Short label for banners and logs.
    fn name(&self) -> &str;

    async fn resolve(&self, title: &str) -> Result<Lookup, CatalogError>;
}
