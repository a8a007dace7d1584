//! Inbound conversation events.
//!
//! Whatever the transport, every update the bot reacts to is reduced to
//! an [`InboundEvent`]: who sent it, in which conversation, and one of four
//! kinds of payload.

use crate::ids::{ChatId, UserIdentity};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// Contact card shared by the participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactCard {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EventKind {
    /// Command name without the leading slash or `@bot` suffix.
    Command(String),
    Text(String),
    ButtonPress(String),
    SharedContact(ContactCard),
}

impl EventKind {
    /// Classifies raw message text: `/start@my_bot args` becomes
    /// `Command("start")`, anything else is `Text`.
    pub fn from_message_text(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.strip_prefix('/') {
            Some(rest) if !rest.is_empty() => {
                let word = rest.split_whitespace().next().unwrap_or(rest);
                let name = word.split('@').next().unwrap_or(word);
                EventKind::Command(name.to_lowercase())
            }
            _ => EventKind::Text(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub sender: Sender,
    #[serde(flatten)]
    pub kind: EventKind,
    /// Text of the message this one replies to, when it is a reply.
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl InboundEvent {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::resolve(self.sender.username.as_deref(), self.sender.user_id)
    }
}
