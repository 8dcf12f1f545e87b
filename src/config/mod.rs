//! Key-value settings backed by SQLite.
//!
//! Lives in the same database file as the vote tables. Values here sit
//! between command-line flags (which win) and built-in defaults.

use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::str::FromStr;
use std::sync::Mutex;

/// Keys the bot understands.
pub const KEY_PREFIX: &str = "prefix";
pub const KEY_BOT_NAME: &str = "bot_name";
pub const KEY_CLEAR_POLICY: &str = "clear_policy";
pub const KEY_OMDB_API_KEY: &str = "omdb_api_key";

/// Keys editable with `votenight config`. The API key has its own subcommands.
pub const EDITABLE_KEYS: &[&str] = &[KEY_PREFIX, KEY_BOT_NAME, KEY_CLEAR_POLICY];

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the settings table in the given database.
    /// Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("failed to open settings database")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create settings table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Get and parse a value. A stored value that doesn't parse is an error.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key)? {
            Some(raw) => match raw.parse() {
                Ok(value) => Ok(Some(value)),
                Err(e) => bail!("invalid stored value for {key} ({raw:?}): {e}"),
            },
            None => Ok(None),
        }
    }

    /// Set a value (upsert).
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    /// Remove a key.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(())
    }

    /// All stored settings, sorted by key.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// The catalog API key.
    /// Priority: stored key → environment variable.
    pub fn api_key(&self, env_var: &str) -> Result<Option<String>> {
        if let Some(key) = self.get(KEY_OMDB_API_KEY)?
            && !key.is_empty()
        {
            return Ok(Some(key));
        }

        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Ok(Some(key));
        }

        Ok(None)
    }
}

/// Check a `config set` value before storing it.
pub fn validate(key: &str, value: &str) -> Result<()> {
    match key {
        KEY_PREFIX => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_alphanumeric() && !c.is_whitespace() && c != '@' => Ok(()),
                _ => bail!("prefix must be a single punctuation character other than @, got {value:?}"),
            }
        }
        KEY_BOT_NAME => {
            if value.is_empty() || value.contains(char::is_whitespace) {
                bail!("bot name must be one word, got {value:?}");
            }
            Ok(())
        }
        KEY_CLEAR_POLICY => value
            .parse::<crate::engine::ClearPolicy>()
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e)),
        other => bail!(
            "unknown setting: {other} (expected one of: {})",
            EDITABLE_KEYS.join(", ")
        ),
    }
}
