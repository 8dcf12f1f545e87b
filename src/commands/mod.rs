//! Bot commands.
//!
//! Commands implement the [`Command`] trait and are listed in
//! [`CommandRegistry::new`]. The registry handles lookup, alias resolution
//! and help text; the [`Router`](crate::router::Router) handles prefixes,
//! permissions and delivery.

mod clear;
mod help;
mod search;
mod unvote;
mod view;
mod vote;
mod who;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::chat::{Author, Channel, Reply};
use crate::engine::{EngineError, VoteEngine};

/// Everything a command may touch while it runs.
pub struct CommandContext<'a> {
    pub engine: &'a VoteEngine,
    pub catalog: &'a dyn Catalog,
    pub channel: &'a dyn Channel,
    pub author: &'a Author,
    pub registry: &'a CommandRegistry,
    /// The configured command prefix, for usage hints.
    pub prefix: char,
    /// Text after the command name, trimmed. May be empty.
    pub args: &'a str,
}

/// Failures a command cannot turn into a normal reply.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// A bot command. Implement this trait to add new commands.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"vote"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["assist"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Argument synopsis, e.g. `"<title>"`. Empty when none.
    fn usage(&self) -> &str {
        ""
    }

    /// Whether the command takes a required argument.
    fn needs_args(&self) -> bool {
        false
    }

    /// Restricted to administrators.
    fn privileged(&self) -> bool {
        false
    }

    /// One-line description for `help`.
    fn description(&self) -> &str;

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError>;
}

/// Holds registered commands.
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(search::SearchCommand),
            Arc::new(vote::VoteCommand),
            Arc::new(unvote::UnvoteCommand),
            Arc::new(view::ViewCommand),
            Arc::new(who::WhoCommand),
            Arc::new(clear::ClearCommand),
            Arc::new(help::HelpCommand),
        ];
        Self { commands }
    }

    /// Register an additional command.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Find a command by name or alias, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.iter().find(|c| {
            c.name().eq_ignore_ascii_case(name)
                || c.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
        })
    }

    /// Generate help text from all registered commands.
    pub fn help_text(&self, prefix: char) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(prefix, c.as_ref()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(10);

        let mut out = String::new();
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out
    }

    /// All registered command names.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases (for duplicate detection).
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `/vote <title>` style invocation line.
pub fn format_usage(prefix: char, command: &dyn Command) -> String {
    if command.usage().is_empty() {
        format!("{prefix}{}", command.name())
    } else {
        format!("{prefix}{} {}", command.name(), command.usage())
    }
}

fn format_label(prefix: char, command: &dyn Command) -> String {
    let usage = format_usage(prefix, command);
    if command.aliases().is_empty() {
        usage
    } else {
        format!("{usage} ({})", command.aliases().join(", "))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::MovieInfo;
    use crate::catalog::mock::MockCatalog;
    use crate::store::SqliteStore;
    use anyhow::Result;
    use std::sync::Mutex;

    /// Collects replies instead of sending them anywhere.
    #[derive(Default)]
    pub(crate) struct NullChannel {
        pub sent: Mutex<Vec<Reply>>,
    }

    #[async_trait]
    impl Channel for NullChannel {
        async fn send(&self, reply: Reply) -> Result<()> {
            self.sent.lock().unwrap().push(reply);
            Ok(())
        }

        fn display_name(&self, user_id: &str) -> Option<String> {
            (!user_id.starts_with("departed")).then(|| user_id.to_uppercase())
        }
    }

    /// Shared fixtures for command tests.
    pub(crate) struct Fixture {
        pub engine: VoteEngine,
        pub catalog: MockCatalog,
        pub channel: NullChannel,
        pub registry: CommandRegistry,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                engine: VoteEngine::new(Arc::new(SqliteStore::in_memory().unwrap())),
                catalog: MockCatalog::new(vec![
                    MovieInfo {
                        year: Some("2010".to_string()),
                        ..MovieInfo::new("tt1375666", "Inception")
                    },
                    MovieInfo::new("tt0113277", "Heat"),
                ]),
                channel: NullChannel::default(),
                registry: CommandRegistry::new(),
            }
        }

        pub fn ctx<'a>(&'a self, author: &'a Author, args: &'a str) -> CommandContext<'a> {
            CommandContext {
                engine: &self.engine,
                catalog: &self.catalog,
                channel: &self.channel,
                author,
                registry: &self.registry,
                prefix: '/',
                args,
            }
        }
    }

    #[test]
    fn all_builtins_registered() {
        let reg = CommandRegistry::new();
        let names = reg.names();
        for name in ["search", "vote", "unvote", "view", "who", "clear", "help"] {
            assert!(names.contains(&name), "missing: {name}");
        }
    }

    #[test]
    fn no_duplicate_triggers() {
        let reg = CommandRegistry::new();
        let triggers = reg.all_triggers();
        let mut seen = Vec::new();
        for t in &triggers {
            assert!(!seen.contains(t), "duplicate trigger: {t}");
            seen.push(t);
        }
    }

    #[test]
    fn find_is_case_insensitive_and_resolves_aliases() {
        let reg = CommandRegistry::new();
        assert_eq!(reg.find("VOTE").unwrap().name(), "vote");
        assert_eq!(reg.find("assist").unwrap().name(), "help");
        assert!(reg.find("dance").is_none());
    }

    #[test]
    fn help_text_includes_all_commands() {
        let reg = CommandRegistry::new();
        let text = reg.help_text('!');
        for name in reg.names() {
            assert!(text.contains(&format!("!{name}")), "help missing: {name}");
        }
        assert!(text.contains("!vote <title>"));
        assert!(text.contains("(assist)"));
    }

    #[test]
    fn only_clear_is_privileged() {
        let reg = CommandRegistry::new();
        let privileged: Vec<_> = reg
            .names()
            .into_iter()
            .filter(|n| reg.find(n).unwrap().privileged())
            .collect();
        assert_eq!(privileged, ["clear"]);
    }

    #[tokio::test]
    async fn plugin_command_works() {
        struct PingCommand;

        #[async_trait]
        impl Command for PingCommand {
            fn name(&self) -> &str {
                "ping"
            }
            fn description(&self) -> &str {
                "pong"
            }
            async fn execute(&self, _ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
                Ok(Reply::text("pong"))
            }
        }

        let mut reg = CommandRegistry::new();
        reg.register(Arc::new(PingCommand));
        assert!(reg.names().contains(&"ping"));
        assert!(reg.help_text('/').contains("/ping"));

        let fx = Fixture::new();
        let author = Author::member("u1", "u1");
        let reply = reg.find("ping").unwrap().execute(&fx.ctx(&author, "")).await.unwrap();
        assert_eq!(reply.content, "pong");
    }

    #[test]
    fn format_usage_with_and_without_args() {
        let reg = CommandRegistry::new();
        assert_eq!(format_usage('/', reg.find("view").unwrap().as_ref()), "/view");
        assert_eq!(format_usage('/', reg.find("vote").unwrap().as_ref()), "/vote <title>");
    }
}
