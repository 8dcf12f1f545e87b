//! The boundary to a chat platform.
//!
//! A transport turns platform events into [`Message`]s, hands them to the
//! [`Router`](crate::router::Router), and implements [`Channel`] so replies
//! find their way back.

pub mod console;

use anyhow::Result;
use async_trait::async_trait;

use crate::embed::Embed;

/// Who sent a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Stable platform account id.
    pub id: String,
    pub name: String,
    pub is_bot: bool,
    /// Administrators and the bot owner may run privileged commands.
    pub is_admin: bool,
}

impl Author {
    pub fn member(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_bot: false,
            is_admin: false,
        }
    }

    pub fn admin(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_admin: true,
            ..Self::member(id, name)
        }
    }

    pub fn bot(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_bot: true,
            ..Self::member(id, name)
        }
    }
}

/// An inbound chat message.
#[derive(Debug, Clone)]
pub struct Message {
    pub author: Author,
    pub content: String,
}

impl Message {
    pub fn new(author: Author, content: impl Into<String>) -> Self {
        Self {
            author,
            content: content.into(),
        }
    }
}

/// An outbound message: text, a card, or both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub content: String,
    pub embed: Option<Embed>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embed: None,
        }
    }

    pub fn card(embed: Embed) -> Self {
        Self {
            content: String::new(),
            embed: Some(embed),
        }
    }

    pub fn with_card(mut self, embed: Embed) -> Self {
        self.embed = Some(embed);
        self
    }
}

/// Where replies go, and who the members are.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, reply: Reply) -> Result<()>;

    /// Display name for a member id, `None` if the platform doesn't know them.
    fn display_name(&self, user_id: &str) -> Option<String>;
}
