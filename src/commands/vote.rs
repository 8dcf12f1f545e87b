use async_trait::async_trait;

use super::{Command, CommandContext, CommandError};
use crate::chat::Reply;
use crate::embed::movie_card_lite;
use crate::engine::VoteOutcome;

pub struct VoteCommand;

#[async_trait]
impl Command for VoteCommand {
    fn name(&self) -> &str {
        "vote"
    }

    fn usage(&self) -> &str {
        "<title>"
    }

    fn needs_args(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        "vote for a movie (one vote per person)"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
        let lookup = ctx.catalog.resolve(ctx.args).await?;
        Ok(match ctx.engine.vote(&ctx.author.id, &lookup)? {
            VoteOutcome::Voted(movie) => {
                Reply::text(format!("Voted for movie: {}", movie.title))
                    .with_card(movie_card_lite(&movie))
            }
            VoteOutcome::AlreadyVoted { title } => {
                Reply::text(format!("Already voted for movie: {title}"))
            }
            VoteOutcome::NotFound { query } => Reply::text(format!("Movie not found: {query}")),
        })
    }
}
