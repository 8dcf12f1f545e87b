use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{MovieRow, Tally, UserRow};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS user (
        id       TEXT PRIMARY KEY,
        voted    INTEGER NOT NULL DEFAULT 0,
        movie_id TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE IF NOT EXISTS movie (
        id         TEXT PRIMARY KEY,
        title      TEXT NOT NULL,
        vote_count INTEGER NOT NULL DEFAULT 0 CHECK (vote_count >= 0)
    );";

/// SQLite-backed vote tables.
///
/// The connection sits behind a mutex and every unit of work runs in its
/// own transaction, so concurrent commands touching the same row are
/// applied one after another.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> rusqlite::Result<Self> {
        Self::open(":memory:")
    }

    /// Run `f` in a write transaction. Commits on `Ok`, rolls back on `Err`.
    pub fn write<T, E>(&self, f: impl FnOnce(&Ledger<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        self.transact(TransactionBehavior::Immediate, f)
    }

    /// Run `f` against a consistent snapshot. Nothing it does is kept.
    pub fn read<T, E>(&self, f: impl FnOnce(&Ledger<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let out = f(&Ledger { conn: &tx })?;
        tx.rollback()?;
        Ok(out)
    }

    fn transact<T, E>(
        &self,
        behavior: TransactionBehavior,
        f: impl FnOnce(&Ledger<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(behavior)?;
        let out = f(&Ledger { conn: &tx })?;
        tx.commit()?;
        Ok(out)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-transaction leaves nothing committed, so the
        // connection is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Row access inside one transaction.
pub struct Ledger<'c> {
    conn: &'c Connection,
}

impl Ledger<'_> {
    pub fn user(&self, id: &str) -> rusqlite::Result<Option<UserRow>> {
        self.conn
            .query_row(
                "SELECT id, voted, movie_id FROM user WHERE id = ?1",
                [id],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        voted: row.get(1)?,
                        movie_id: row.get(2)?,
                    })
                },
            )
            .optional()
    }

    /// Existing row, or a fresh never-voted user (not yet persisted).
    pub fn user_or_new(&self, id: &str) -> rusqlite::Result<UserRow> {
        Ok(self.user(id)?.unwrap_or_else(|| UserRow::new(id)))
    }

    pub fn put_user(&self, user: &UserRow) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO user (id, voted, movie_id) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET voted = excluded.voted, movie_id = excluded.movie_id",
            params![user.id, user.voted, user.movie_id],
        )?;
        Ok(())
    }

    pub fn movie(&self, id: &str) -> rusqlite::Result<Option<MovieRow>> {
        self.conn
            .query_row(
                "SELECT id, title, vote_count FROM movie WHERE id = ?1",
                [id],
                |row| {
                    Ok(MovieRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        vote_count: row.get(2)?,
                    })
                },
            )
            .optional()
    }

    pub fn put_movie(&self, movie: &MovieRow) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO movie (id, title, vote_count) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, vote_count = excluded.vote_count",
            params![movie.id, movie.title, movie.vote_count],
        )?;
        Ok(())
    }

    pub fn count_movies(&self) -> rusqlite::Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM movie", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Movies by descending vote count, ties broken by title then id.
    pub fn ranked_movies(&self, limit: usize) -> rusqlite::Result<Vec<MovieRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, vote_count FROM movie
             ORDER BY vote_count DESC, title ASC, id ASC
             LIMIT ?1",
        )?;
        stmt.query_map([limit as i64], |row| {
            Ok(MovieRow {
                id: row.get(0)?,
                title: row.get(1)?,
                vote_count: row.get(2)?,
            })
        })?
        .collect()
    }

    pub fn count_users(&self) -> rusqlite::Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Users with the title of the movie they picked, voters first.
    /// The title is `None` when the user has not voted or the movie row is gone.
    pub fn roster(&self, limit: usize) -> rusqlite::Result<Vec<(UserRow, Option<String>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.voted, u.movie_id, m.title
             FROM user u LEFT JOIN movie m ON m.id = u.movie_id AND u.voted = 1
             ORDER BY u.voted DESC, u.movie_id DESC, u.id ASC
             LIMIT ?1",
        )?;
        stmt.query_map([limit as i64], |row| {
            Ok((
                UserRow {
                    id: row.get(0)?,
                    voted: row.get(1)?,
                    movie_id: row.get(2)?,
                },
                row.get(3)?,
            ))
        })?
        .collect()
    }

    /// Delete movie rows, or only those holding votes. Returns rows removed.
    pub fn delete_movies(&self, only_voted: bool) -> rusqlite::Result<usize> {
        let sql = if only_voted {
            "DELETE FROM movie WHERE vote_count > 0"
        } else {
            "DELETE FROM movie"
        };
        self.conn.execute(sql, [])
    }

    /// Withdraw every active vote. Returns users reset.
    pub fn reset_votes(&self) -> rusqlite::Result<usize> {
        self.conn.execute(
            "UPDATE user SET voted = 0, movie_id = '' WHERE voted = 1",
            [],
        )
    }

    pub fn tally(&self) -> rusqlite::Result<Tally> {
        self.conn.query_row(
            "SELECT
                (SELECT COALESCE(SUM(vote_count), 0) FROM movie),
                (SELECT COUNT(*) FROM user WHERE voted = 1)",
            [],
            |row| {
                Ok(Tally {
                    votes: row.get::<_, i64>(0)? as u64,
                    voters: row.get::<_, i64>(1)? as u64,
                })
            },
        )
    }
}
