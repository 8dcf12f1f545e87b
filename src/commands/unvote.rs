use async_trait::async_trait;

use super::{Command, CommandContext, CommandError};
use crate::chat::Reply;
use crate::engine::UnvoteOutcome;

pub struct UnvoteCommand;

#[async_trait]
impl Command for UnvoteCommand {
    fn name(&self) -> &str {
        "unvote"
    }

    fn description(&self) -> &str {
        "withdraw your vote"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
        Ok(match ctx.engine.unvote(&ctx.author.id)? {
            UnvoteOutcome::Removed { title } => {
                Reply::text(format!("User vote removed from movie: {title}"))
            }
            UnvoteOutcome::NotVoted => Reply::text("User has not voted yet"),
        })
    }
}
