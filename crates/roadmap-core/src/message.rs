//! UI-agnostic conversation types
//!
//! These are the normalized shapes every front end renders. Wire-level field
//! names never leak past `api::wire`.

use serde::{Deserialize, Serialize};

/// Who wrote a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    Bot,
    User,
}

impl Author {
    /// Accepts the canonical names plus the `assistant` spelling used by the
    /// legacy `role`/`content` contract.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bot" | "assistant" => Some(Author::Bot),
            "user" => Some(Author::User),
            _ => None,
        }
    }
}

/// One turn of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: Author,
    pub text: String,
    /// Quick-reply labels. Only meaningful on the last bot message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<String>,
}

impl Message {
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            author: Author::Bot,
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            author: Author::User,
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_buttons<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buttons = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_bot(&self) -> bool {
        self.author == Author::Bot
    }
}

/// Quick replies offered by the conversation right now.
///
/// Only the last message counts, and only if the bot wrote it. Older button
/// sets are stale and never surface.
pub fn quick_replies(messages: &[Message]) -> &[String] {
    match messages.last() {
        Some(last) if last.is_bot() => &last.buttons,
        _ => &[],
    }
}
