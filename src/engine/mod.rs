//! The vote state machine.
//!
//! Every operation is a single transaction against the [`SqliteStore`], so
//! a user's ballot and the movie tally it touches change together or not at
//! all. Precondition failures (already voted, nothing to unvote, unknown
//! title) are ordinary outcomes; only storage faults and broken references
//! surface as [`EngineError`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::catalog::{Lookup, MovieInfo};
use crate::consts::MAX_LISTED;
use crate::store::{MovieRow, SqliteStore, Tally};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("user {user_id} voted for movie {movie_id}, which is not in the movie table")]
    Consistency { user_id: String, movie_id: String },
}

/// Which movie rows `clear` deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    /// Every nominated movie, including ones whose votes were withdrawn.
    #[default]
    All,
    /// Only movies that still hold at least one vote.
    VotedOnly,
}

impl fmt::Display for ClearPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClearPolicy::All => "all",
            ClearPolicy::VotedOnly => "voted-only",
        })
    }
}

impl FromStr for ClearPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ClearPolicy::All),
            "voted-only" | "voted_only" | "voted" => Ok(ClearPolicy::VotedOnly),
            other => Err(format!("unknown clear policy: {other} (expected all or voted-only)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was recorded.
    Voted(MovieInfo),
    /// The user already holds a vote for `title`. Nothing changed.
    AlreadyVoted { title: String },
    /// The catalog had nothing for `query`. Nothing changed.
    NotFound { query: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnvoteOutcome {
    /// The vote for `title` was withdrawn.
    Removed { title: String },
    NotVoted,
}

/// Movies by vote count. `entries` is capped for display, `total` is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    pub total: usize,
    pub entries: Vec<MovieRow>,
}

impl Standings {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// One user's line in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub user_id: String,
    /// Title of the movie voted for, `None` if the user holds no vote.
    pub title: Option<String>,
}

/// Known users. `entries` is capped for display, `total` is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub total: usize,
    pub entries: Vec<Ballot>,
}

impl Roster {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cleared {
    /// Whether the clear removed any movie rows.
    pub had_movies: bool,
    pub movies_removed: usize,
    pub users_reset: usize,
}

/// Applies vote transitions to the shared store.
pub struct VoteEngine {
    store: Arc<SqliteStore>,
    clear_policy: ClearPolicy,
}

impl VoteEngine {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self {
            store,
            clear_policy: ClearPolicy::default(),
        }
    }

    pub fn with_clear_policy(mut self, policy: ClearPolicy) -> Self {
        self.clear_policy = policy;
        self
    }

    pub fn clear_policy(&self) -> ClearPolicy {
        self.clear_policy
    }

    pub fn vote(&self, user_id: &str, lookup: &Lookup) -> Result<VoteOutcome, EngineError> {
        let movie = match lookup {
            Lookup::Found(movie) => movie,
            Lookup::NotFound { query } => {
                return Ok(VoteOutcome::NotFound {
                    query: query.clone(),
                });
            }
        };

        let outcome = self.store.write(|ledger| -> Result<_, EngineError> {
            let mut user = ledger.user_or_new(user_id)?;

            if user.voted {
                let current = ledger
                    .movie(&user.movie_id)?
                    .ok_or_else(|| broken_reference(user_id, &user.movie_id))?;
                return Ok(VoteOutcome::AlreadyVoted {
                    title: current.title,
                });
            }

            let mut row = ledger
                .movie(&movie.id)?
                .unwrap_or_else(|| MovieRow::new(&movie.id, &movie.title));
            row.vote_count += 1;
            user.cast(&row.id);

            ledger.put_movie(&row)?;
            ledger.put_user(&user)?;
            Ok(VoteOutcome::Voted(movie.clone()))
        })?;

        if let VoteOutcome::Voted(movie) = &outcome {
            info!(user_id, movie_id = %movie.id, title = %movie.title, "vote recorded");
        }
        Ok(outcome)
    }

    pub fn unvote(&self, user_id: &str) -> Result<UnvoteOutcome, EngineError> {
        let outcome = self.store.write(|ledger| -> Result<_, EngineError> {
            let mut user = ledger.user_or_new(user_id)?;

            if !user.voted {
                ledger.put_user(&user)?;
                return Ok(UnvoteOutcome::NotVoted);
            }

            let mut row = ledger
                .movie(&user.movie_id)?
                .ok_or_else(|| broken_reference(user_id, &user.movie_id))?;
            row.vote_count = row.vote_count.saturating_sub(1);
            user.retract();

            ledger.put_movie(&row)?;
            ledger.put_user(&user)?;
            Ok(UnvoteOutcome::Removed { title: row.title })
        })?;

        if let UnvoteOutcome::Removed { title } = &outcome {
            info!(user_id, %title, "vote withdrawn");
        }
        Ok(outcome)
    }

    pub fn view(&self) -> Result<Standings, EngineError> {
        self.store.read(|ledger| -> Result<_, EngineError> {
            Ok(Standings {
                total: ledger.count_movies()?,
                entries: ledger.ranked_movies(MAX_LISTED)?,
            })
        })
    }

    /// Withdraw all votes and drop movies per the configured policy.
    /// Callers are responsible for checking the invoker is allowed to.
    pub fn clear(&self) -> Result<Cleared, EngineError> {
        let only_voted = self.clear_policy == ClearPolicy::VotedOnly;
        let cleared = self.store.write(|ledger| -> Result<_, EngineError> {
            let movies_removed = ledger.delete_movies(only_voted)?;
            let users_reset = ledger.reset_votes()?;
            Ok(Cleared {
                had_movies: movies_removed > 0,
                movies_removed,
                users_reset,
            })
        })?;

        info!(
            policy = %self.clear_policy,
            movies_removed = cleared.movies_removed,
            users_reset = cleared.users_reset,
            "votes cleared"
        );
        Ok(cleared)
    }

    pub fn who(&self) -> Result<Roster, EngineError> {
        self.store.read(|ledger| -> Result<_, EngineError> {
            let total = ledger.count_users()?;
            let entries = ledger
                .roster(MAX_LISTED)?
                .into_iter()
                .map(|(user, title)| match (user.voted, title) {
                    (true, None) => Err(broken_reference(&user.id, &user.movie_id)),
                    (true, title) => Ok(Ballot {
                        user_id: user.id,
                        title,
                    }),
                    (false, _) => Ok(Ballot {
                        user_id: user.id,
                        title: None,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Roster { total, entries })
        })
    }

    /// Vote totals versus active voters.
    pub fn tally(&self) -> Result<Tally, EngineError> {
        Ok(self.store.read(|ledger| ledger.tally())?)
    }
}

fn broken_reference(user_id: &str, movie_id: &str) -> EngineError {
    error!(user_id, movie_id, "voted user references a missing movie");
    EngineError::Consistency {
        user_id: user_id.to_string(),
        movie_id: movie_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserRow;

    fn engine() -> VoteEngine {
        VoteEngine::new(Arc::new(SqliteStore::in_memory().unwrap()))
    }

    fn found(id: &str, title: &str) -> Lookup {
        Lookup::Found(MovieInfo::new(id, title))
    }

    #[test]
    fn clear_policy_parses() {
        assert_eq!("all".parse::<ClearPolicy>().unwrap(), ClearPolicy::All);
        assert_eq!(
            "Voted-Only".parse::<ClearPolicy>().unwrap(),
            ClearPolicy::VotedOnly
        );
        assert!("some".parse::<ClearPolicy>().is_err());
    }

    #[test]
    fn clear_policy_display_round_trips() {
        for policy in [ClearPolicy::All, ClearPolicy::VotedOnly] {
            assert_eq!(policy.to_string().parse::<ClearPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn vote_not_found_creates_nothing() {
        let engine = engine();
        let outcome = engine
            .vote(
                "u1",
                &Lookup::NotFound {
                    query: "nope".to_string(),
                },
            )
            .unwrap();
        assert_eq!(
            outcome,
            VoteOutcome::NotFound {
                query: "nope".to_string()
            }
        );
        assert!(engine.who().unwrap().is_empty());
        assert!(engine.view().unwrap().is_empty());
    }

    #[test]
    fn vote_reuses_existing_movie_row() {
        let engine = engine();
        engine.vote("u1", &found("tt1", "Heat")).unwrap();
        engine.vote("u2", &found("tt1", "Heat")).unwrap();

        let standings = engine.view().unwrap();
        assert_eq!(standings.total, 1);
        assert_eq!(standings.entries[0].vote_count, 2);
    }

    #[test]
    fn unvote_unknown_user_persists_row() {
        let engine = engine();
        assert_eq!(engine.unvote("ghost").unwrap(), UnvoteOutcome::NotVoted);
        let roster = engine.who().unwrap();
        assert_eq!(roster.total, 1);
        assert_eq!(roster.entries[0].title, None);
    }

    #[test]
    fn unvote_with_missing_movie_is_consistency_error() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .write(|l| {
                let mut user = UserRow::new("u1");
                user.cast("tt-gone");
                l.put_user(&user)
            })
            .unwrap();
        let engine = VoteEngine::new(store.clone());

        let err = engine.unvote("u1").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Consistency { ref movie_id, .. } if movie_id == "tt-gone"
        ));
        // rolled back: the user still holds the dangling vote
        let user = store.read(|l| l.user("u1")).unwrap().unwrap();
        assert!(user.voted);
    }

    #[test]
    fn who_with_missing_movie_is_consistency_error() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .write(|l| {
                let mut user = UserRow::new("u1");
                user.cast("tt-gone");
                l.put_user(&user)
            })
            .unwrap();
        let engine = VoteEngine::new(store);
        assert!(matches!(
            engine.who(),
            Err(EngineError::Consistency { .. })
        ));
    }

    #[test]
    fn clear_voted_only_keeps_zero_count_movies() {
        let engine = engine().with_clear_policy(ClearPolicy::VotedOnly);
        engine.vote("u1", &found("tt1", "Heat")).unwrap();
        engine.unvote("u1").unwrap();
        engine.vote("u1", &found("tt2", "Ronin")).unwrap();

        let cleared = engine.clear().unwrap();
        assert!(cleared.had_movies);
        assert_eq!(cleared.movies_removed, 1);
        assert_eq!(cleared.users_reset, 1);

        let standings = engine.view().unwrap();
        assert_eq!(standings.total, 1);
        assert_eq!(standings.entries[0].title, "Heat");
    }

    #[test]
    fn view_caps_entries_but_reports_total() {
        let engine = engine();
        for i in 0..(MAX_LISTED + 5) {
            engine
                .vote(&format!("u{i}"), &found(&format!("tt{i}"), &format!("Movie {i}")))
                .unwrap();
        }
        let standings = engine.view().unwrap();
        assert_eq!(standings.total, MAX_LISTED + 5);
        assert_eq!(standings.entries.len(), MAX_LISTED);
    }
}
