use async_trait::async_trait;

use super::{Command, CommandContext, CommandError, format_usage};
use crate::chat::Reply;

pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn aliases(&self) -> &[&str] {
        &["assist"]
    }

    fn usage(&self) -> &str {
        "[command]"
    }

    fn description(&self) -> &str {
        "show this help, or details for one command"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> Result<Reply, CommandError> {
        let topic = ctx.args.trim_start_matches(ctx.prefix);
        if topic.is_empty() {
            return Ok(Reply::text(format!(
                "Commands:\n{}",
                ctx.registry.help_text(ctx.prefix)
            )));
        }

        Ok(match ctx.registry.find(topic) {
            Some(command) => {
                let mut text = format!(
                    "{}\n  {}",
                    format_usage(ctx.prefix, command.as_ref()),
                    command.description()
                );
                if !command.aliases().is_empty() {
                    text.push_str(&format!("\n  aliases: {}", command.aliases().join(", ")));
                }
                if command.privileged() {
                    text.push_str("\n  requires administrator");
                }
                Reply::text(text)
            }
            None => Reply::text(format!("unknown command: {topic}")),
        })
    }
}
