use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Catalog, CatalogError, Lookup, MovieInfo};

/// A fixed in-memory catalog for tests. Titles match case-insensitively.
pub struct MockCatalog {
    movies: HashMap<String, MovieInfo>,
    offline: bool,
    calls: AtomicUsize,
}

impl MockCatalog {
    pub fn new(movies: Vec<MovieInfo>) -> Self {
        Self {
            movies: movies
                .into_iter()
                .map(|m| (m.title.to_lowercase(), m))
                .collect(),
            offline: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A catalog whose every lookup fails like an unreachable API.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new(Vec::new())
        }
    }

    /// Number of `resolve` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(&self, title: &str) -> Result<Lookup, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(CatalogError::Api {
                status: 503,
                body: "catalog offline".to_string(),
            });
        }
        Ok(match self.movies.get(&title.trim().to_lowercase()) {
            Some(movie) => Lookup::Found(movie.clone()),
            None => Lookup::NotFound {
                query: title.to_string(),
            },
        })
    }
}
