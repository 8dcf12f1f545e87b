//! Project-wide constants.

use std::path::PathBuf;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Chat platforms cap a card at this many fields, so listings stop here.
pub const MAX_LISTED: usize = 25;

/// Command prefix when none is configured.
pub const DEFAULT_PREFIX: char = '/';

/// Name the bot answers to in `@mentions` when none is configured.
pub const DEFAULT_BOT_NAME: &str = "votenight";

/// Console author when `--user` is not given.
pub const DEFAULT_USER: &str = "me";

/// Default database path: `~/.votenight/votenight.db`.
/// Holds the vote tables and the persisted settings.
pub fn default_db_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".votenight").join("votenight.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!AUTHOR.is_empty());
        assert!(!VERSION.is_empty());
        assert!(!DEFAULT_BOT_NAME.is_empty());
    }

    #[test]
    fn default_db_path_under_dot_dir() {
        if let Some(path) = default_db_path() {
            assert!(path.ends_with(".votenight/votenight.db"));
        }
    }
}
