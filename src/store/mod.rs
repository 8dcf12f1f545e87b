//! Persisted vote state: one row per chat user, one row per nominated movie.
//!
//! All access goes through [`SqliteStore::write`] or [`SqliteStore::read`],
//! which hand a [`Ledger`](sqlite::Ledger) bound to a single transaction.

pub mod sqlite;

pub use sqlite::{Ledger, SqliteStore};

/// A chat member's ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: String,
    pub voted: bool,
    /// Catalog id of the chosen movie. Empty unless `voted`.
    pub movie_id: String,
}

impl UserRow {
    /// A user who has never voted.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            voted: false,
            movie_id: String::new(),
        }
    }

    pub fn cast(&mut self, movie_id: &str) {
        self.voted = true;
        self.movie_id = movie_id.to_string();
    }

    pub fn retract(&mut self) {
        self.voted = false;
        self.movie_id.clear();
    }
}

/// A nominated movie and its running tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRow {
    pub id: String,
    pub title: String,
    pub vote_count: u32,
}

impl MovieRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            vote_count: 0,
        }
    }
}

/// Aggregate counters used to check the vote invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    /// Sum of `vote_count` over all movies.
    pub votes: u64,
    /// Number of users with an active vote.
    pub voters: u64,
}

impl Tally {
    pub fn is_consistent(&self) -> bool {
        self.votes == self.voters
    }
}
