//! A terminal stand-in for a chat channel.
//!
//! Each stdin line is one message. `@alice: /vote Heat` is sent by `alice`;
//! a line without that prefix is sent by the default user. Member ids and
//! display names are the same string here.

use anyhow::Result;
use async_trait::async_trait;

use super::{Author, Channel, Message, Reply};

pub struct Console {
    default_user: String,
    admins: Vec<String>,
}

impl Console {
    pub fn new(default_user: impl Into<String>, admins: Vec<String>) -> Self {
        Self {
            default_user: default_user.into(),
            admins,
        }
    }

    /// Turn an input line into a message from the right author.
    pub fn message(&self, line: &str) -> Message {
        let line = line.trim();
        let (name, content) = split_author(line).unwrap_or((self.default_user.as_str(), line));
        let is_admin = self.admins.iter().any(|a| a.eq_ignore_ascii_case(name));
        let author = Author {
            is_admin,
            ..Author::member(name, name)
        };
        Message::new(author, content)
    }
}

#[async_trait]
impl Channel for Console {
    async fn send(&self, reply: Reply) -> Result<()> {
        print!("{}", render_reply(&reply));
        Ok(())
    }

    fn display_name(&self, user_id: &str) -> Option<String> {
        Some(user_id.to_string())
    }
}

/// `@name: rest` → `(name, rest)`.
fn split_author(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('@')?;
    let (head, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let name = head.strip_suffix(':')?;
    if name.is_empty() {
        return None;
    }
    Some((name, tail.trim_start()))
}

/// Text form of a reply: the content line, then the card if any.
pub fn render_reply(reply: &Reply) -> String {
    let mut out = String::new();
    if !reply.content.is_empty() {
        out.push_str(&reply.content);
        out.push('\n');
    }
    if let Some(embed) = &reply.embed {
        out.push_str(&embed.render());
    }
    out
}
