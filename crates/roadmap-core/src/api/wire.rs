//! Wire schema for the `/chatbot` endpoints.
//!
//! Canonical message shape:
//!
//! ```json
//! { "author": "bot", "text": "Hi", "buttons": "[\"Yes\",\"No\"]" }
//! ```
//!
//! The legacy `role`/`content` and `Author`/`Message`/`Buttons` spellings are
//! accepted here as aliases and nowhere else.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::buttons::parse_buttons_lenient;
use crate::error::ChatbotError;
use crate::message::{Author, Message};

#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(alias = "role", alias = "Author")]
    author: String,
    #[serde(alias = "content", alias = "Message")]
    text: String,
    #[serde(default, alias = "Buttons")]
    buttons: Value,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireLog {
    Wrapped { messages: Vec<WireMessage> },
    Bare(Vec<WireMessage>),
}

impl WireMessage {
    fn into_message(self) -> Result<Message, ChatbotError> {
        let author = Author::parse(&self.author).ok_or_else(|| {
            ChatbotError::MalformedResponse(format!("unknown author {:?}", self.author))
        })?;
        Ok(Message {
            author,
            text: self.text,
            buttons: parse_buttons_lenient(&self.buttons),
        })
    }
}

/// Decode a fetch-log response body into normalized messages.
pub fn decode_log(body: &str) -> Result<Vec<Message>, ChatbotError> {
    let log: WireLog = serde_json::from_str(body)?;
    let messages = match log {
        WireLog::Wrapped { messages } | WireLog::Bare(messages) => messages,
    };
    messages.into_iter().map(WireMessage::into_message).collect()
}

/// Pull a human-readable message out of an error body, if the server sent one.
pub fn error_text(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => ["err", "error", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        Ok(_) => None,
        // Plain-text bodies are shown as-is, but never whole HTML pages
        Err(_) if !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}
