use async_trait::async_trait;
use tracing::debug;

use super::{Command, CommandContext, CommandError};
use crate::catalog::Lookup;
use crate::chat::Reply;
use crate::embed::{movie_card, not_found_card};

pub struct SearchCommand;

#[async_trait]
impl Command for SearchCommand {
    fn name(&self) -> &str {
        "search"
    }

    fn usage(&self) -> &str {
        "<title>"
    }

    fn needs_args(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        "look up a movie in the catalog"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
        let lookup = ctx.catalog.resolve(ctx.args).await?;
        debug!(query = ctx.args, found = matches!(lookup, Lookup::Found(_)), "search");
        Ok(match lookup {
            Lookup::Found(movie) => Reply::card(movie_card(&movie)),
            Lookup::NotFound { .. } => Reply::card(not_found_card()),
        })
    }
}
