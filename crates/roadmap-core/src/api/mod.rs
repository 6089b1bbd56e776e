pub mod http;
pub mod wire;

use async_trait::async_trait;

use crate::error::ChatbotError;
use crate::message::Message;

pub use http::HttpChatbotClient;

/// The three chatbot endpoints, as seen by the store and controller.
#[async_trait]
pub trait ChatbotApi: Send + Sync {
    /// `GET /chatbot`: the full, server-canonical log.
    async fn fetch_messages(&self) -> Result<Vec<Message>, ChatbotError>;

    /// `POST /chatbot`: append a user message. The reply body is not used;
    /// callers re-read the log.
    async fn send_message(&self, text: &str) -> Result<(), ChatbotError>;

    /// `POST /chatbot/reset`: clear the server-side history.
    async fn reset(&self) -> Result<(), ChatbotError>;
}
