use async_trait::async_trait;

use super::{Command, CommandContext, CommandError};
use crate::chat::Reply;
use crate::embed::Embed;

pub struct WhoCommand;

#[async_trait]
impl Command for WhoCommand {
    fn name(&self) -> &str {
        "who"
    }

    fn description(&self) -> &str {
        "show who has voted and for what"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
        let roster = ctx.engine.who()?;
        if roster.is_empty() {
            return Ok(Reply::text("There are no users"));
        }

        let mut card = Embed::new("User List");
        for ballot in &roster.entries {
            // Members who left the channel can't be named.
            let Some(name) = ctx.channel.display_name(&ballot.user_id) else {
                continue;
            };
            let pick = ballot.title.as_deref().unwrap_or("N/A");
            card.add_field(name, format!("Voted: Movie: {pick}"), false);
        }
        Ok(Reply::card(card))
    }
}
