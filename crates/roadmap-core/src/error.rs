//! Chatbot API error types

use thiserror::Error;

const GENERIC_SERVER_MESSAGE: &str = "The assistant is unavailable right now";

/// Everything that can go wrong talking to the chatbot endpoints
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatbotError {
    /// The server could not be reached (DNS, refused connection, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("server returned {status}{}", detail_suffix(.message))]
    Server { status: u16, message: Option<String> },

    /// The body was not the JSON we expect
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

impl ChatbotError {
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::Server { status, message }
    }

    /// Text suitable for an error view or banner. Malformed bodies read as a
    /// server failure.
    pub fn user_message(&self) -> String {
        match self {
            ChatbotError::Network(_) => {
                "Can not reach the server. Check your connection and try again.".to_string()
            }
            ChatbotError::Server {
                message: Some(text),
                ..
            } if !text.trim().is_empty() => text.trim().to_string(),
            ChatbotError::Server { status, .. } => {
                format!("{GENERIC_SERVER_MESSAGE} (status {status})")
            }
            ChatbotError::MalformedResponse(_) => GENERIC_SERVER_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ChatbotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatbotError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ChatbotError::server(status.as_u16(), None)
        } else {
            ChatbotError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatbotError {
    fn from(err: serde_json::Error) -> Self {
        ChatbotError::MalformedResponse(err.to_string())
    }
}
