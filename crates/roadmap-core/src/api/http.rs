use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use super::wire::{self, SendRequest};
use super::ChatbotApi;
use crate::config::Config;
use crate::error::ChatbotError;
use crate::message::Message;

#[derive(Clone)]
pub struct HttpChatbotClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpChatbotClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ChatbotError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatbotError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ChatbotError> {
        let client = Self::new(&config.api_root(), config.request_timeout())?;
        Ok(match config.auth_token() {
            Some(token) => client.with_auth_token(&token),
            None => client,
        })
    }

    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send and turn non-2xx statuses into `ChatbotError::Server`.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ChatbotError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Chatbot request failed");
            return Err(ChatbotError::server(status.as_u16(), wire::error_text(&body)));
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatbotApi for HttpChatbotClient {
    async fn fetch_messages(&self) -> Result<Vec<Message>, ChatbotError> {
        let url = self.url("/chatbot");
        tracing::debug!(%url, "Fetching chatbot messages");

        let response = self.execute(self.client.get(&url)).await?;
        let body = response.text().await?;
        let messages = wire::decode_log(&body)?;

        tracing::debug!(count = messages.len(), "Fetched chatbot messages");
        Ok(messages)
    }

    async fn send_message(&self, text: &str) -> Result<(), ChatbotError> {
        let url = self.url("/chatbot");
        tracing::debug!(%url, chars = text.chars().count(), "Posting chatbot message");

        let request = SendRequest { text };
        self.execute(self.client.post(&url).json(&request)).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), ChatbotError> {
        let url = self.url("/chatbot/reset");
        tracing::info!(%url, "Resetting chatbot conversation");

        self.execute(self.client.post(&url)).await?;
        Ok(())
    }
}
