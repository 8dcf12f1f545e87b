use async_trait::async_trait;

use super::{Command, CommandContext, CommandError};
use crate::chat::Reply;

pub struct ClearCommand;

#[async_trait]
impl Command for ClearCommand {
    fn name(&self) -> &str {
        "clear"
    }

    fn privileged(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        "remove all votes and movies (admins only)"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
        let cleared = ctx.engine.clear()?;
        Ok(if cleared.had_movies {
            Reply::text("Movies have been cleared.")
        } else {
            Reply::text("There are no movies to clear")
        })
    }
}
