//! Turns inbound chat messages into command invocations.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::catalog::Catalog;
use crate::chat::{Channel, Message, Reply};
use crate::commands::{CommandContext, CommandError, CommandRegistry, format_usage};
use crate::consts::{DEFAULT_BOT_NAME, DEFAULT_PREFIX};
use crate::engine::{EngineError, VoteEngine};

/// What happened to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not addressed to the bot (no prefix, or sent by a bot).
    Ignored,
    /// A reply was sent.
    Handled,
}

/// A parsed `<prefix><name> <args>` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

pub struct Router {
    registry: CommandRegistry,
    engine: Arc<VoteEngine>,
    catalog: Arc<dyn Catalog>,
    prefix: char,
    bot_name: String,
}

impl Router {
    pub fn new(engine: Arc<VoteEngine>, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            engine,
            catalog,
            prefix: DEFAULT_PREFIX,
            bot_name: DEFAULT_BOT_NAME.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: char) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = name.into();
        self
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Split a message into command name and arguments, if it is addressed
    /// to the bot via the prefix or an `@bot` mention.
    pub fn parse<'a>(&self, content: &'a str) -> Option<Invocation<'a>> {
        let content = content.trim_start();
        let rest = match content.strip_prefix(self.prefix) {
            Some(rest) => rest,
            None => self.strip_mention(content)?,
        };

        let rest = rest.trim();
        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if name.is_empty() {
            return None;
        }
        Some(Invocation {
            name,
            args: args.trim(),
        })
    }

    fn strip_mention<'a>(&self, content: &'a str) -> Option<&'a str> {
        let rest = content.strip_prefix('@')?;
        let name_len = self.bot_name.len();
        let (head, tail) = (rest.get(..name_len)?, &rest[name_len..]);
        if !head.eq_ignore_ascii_case(&self.bot_name) {
            return None;
        }
        // "@votenightly" is someone else
        let tail = tail.strip_prefix([',', ':']).unwrap_or(tail);
        if !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
            return None;
        }
        // allow the prefix after a mention: "@votenight /view"
        let tail = tail.trim_start();
        Some(tail.strip_prefix(self.prefix).unwrap_or(tail))
    }

    /// Handle one inbound message, sending at most one reply.
    pub async fn handle(&self, message: &Message, channel: &dyn Channel) -> Result<Dispatch> {
        if message.author.is_bot {
            return Ok(Dispatch::Ignored);
        }
        let Some(invocation) = self.parse(&message.content) else {
            return Ok(Dispatch::Ignored);
        };

        let reply = self.run(invocation, message, channel).await;
        channel.send(reply).await?;
        Ok(Dispatch::Handled)
    }

    async fn run(&self, invocation: Invocation<'_>, message: &Message, channel: &dyn Channel) -> Reply {
        let author = &message.author;
        debug!(user_id = %author.id, command = invocation.name, args = invocation.args, "dispatch");

        let Some(command) = self.registry.find(invocation.name) else {
            return Reply::text(format!(
                "unknown command: {}\ntype {}help for available commands",
                invocation.name, self.prefix
            ));
        };

        if command.privileged() && !author.is_admin {
            warn!(user_id = %author.id, command = command.name(), "permission denied");
            return Reply::text("You do not have permission to use this command.");
        }

        if command.needs_args() && invocation.args.is_empty() {
            return Reply::text(format!("usage: {}", format_usage(self.prefix, command.as_ref())));
        }

        let ctx = CommandContext {
            engine: &self.engine,
            catalog: self.catalog.as_ref(),
            channel,
            author,
            registry: &self.registry,
            prefix: self.prefix,
            args: invocation.args,
        };

        match command.execute(&ctx).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(user_id = %author.id, command = command.name(), error = %err, "command failed");
                Reply::text(failure_text(&err))
            }
        }
    }
}

fn failure_text(err: &CommandError) -> &'static str {
    match err {
        CommandError::Catalog(_) => "Couldn't reach the movie catalog, try again later.",
        CommandError::Engine(EngineError::Consistency { .. }) => {
            "The vote records are inconsistent. An administrator should run clear."
        }
        CommandError::Engine(EngineError::Storage(_)) => "Something went wrong saving votes.",
    }
}
