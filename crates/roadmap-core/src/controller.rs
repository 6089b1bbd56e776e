//! Mediates between user input and the [`MessageStore`].
//!
//! Every mutation is followed by a full reload, so the rendered log is always
//! the server's. Nothing is rendered optimistically.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ChatbotError;
use crate::message::quick_replies;
use crate::store::{LoadOutcome, MessageStore};
use crate::view::ConversationView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text; nothing was sent.
    Skipped,
    Sent,
    /// The view was unmounted; nothing was sent.
    Detached,
}

#[derive(Debug, Default)]
struct ControllerState {
    draft: String,
    notice: Option<String>,
}

/// Cheap to clone; clones share the same draft, notice and store.
#[derive(Clone)]
pub struct ConversationController {
    store: MessageStore,
    state: Arc<Mutex<ControllerState>>,
}

impl ConversationController {
    pub fn new(store: MessageStore) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(ControllerState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Initial hydration when the view mounts.
    pub async fn start(&self) -> Result<LoadOutcome, ChatbotError> {
        self.reload().await
    }

    /// User-initiated reload from the error view.
    pub async fn retry(&self) -> Result<LoadOutcome, ChatbotError> {
        self.reload().await
    }

    async fn reload(&self) -> Result<LoadOutcome, ChatbotError> {
        let outcome = self.store.load().await?;
        if outcome == LoadOutcome::Applied {
            self.state().notice = None;
        }
        Ok(outcome)
    }

    /// Post `text` as a user message, then reload the log.
    ///
    /// Blank text is a no-op. If the post fails the draft is kept and the
    /// error is shown as a notice. After a successful post the draft is
    /// cleared, unless the user has already typed something else. Nothing is
    /// touched once the controller has been unmounted.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, ChatbotError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Skipped);
        }

        match self.store.post(text).await {
            Ok(LoadOutcome::Detached) => return Ok(SendOutcome::Detached),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Sending chatbot message failed");
                self.state().notice = Some(e.user_message());
                return Err(e);
            }
        }

        let loaded = self.store.load().await;
        if self.store.is_detached() {
            return Ok(SendOutcome::Detached);
        }

        {
            let mut state = self.state();
            if state.draft.trim() == text {
                state.draft.clear();
            }
            state.notice = None;
        }

        loaded.map(|_| SendOutcome::Sent)
    }

    pub async fn send_from_button(&self, label: &str) -> Result<SendOutcome, ChatbotError> {
        self.send(label).await
    }

    pub async fn send_draft(&self) -> Result<SendOutcome, ChatbotError> {
        let draft = self.draft();
        self.send(&draft).await
    }

    /// Ask the server to forget the conversation. If the reset request fails
    /// the current log stays on screen and a notice explains why. A reload
    /// that fails after a successful reset shows the error view instead.
    pub async fn reset(&self) -> Result<LoadOutcome, ChatbotError> {
        match self.store.reset().await {
            Ok(LoadOutcome::Detached) => Ok(LoadOutcome::Detached),
            Ok(outcome) => {
                self.state().notice = None;
                Ok(outcome)
            }
            Err(e) => {
                self.state().notice = Some(format!("Could not reset: {}", e.user_message()));
                Err(e)
            }
        }
    }

    /// Labels to render instead of the free-text input, if any.
    pub fn quick_replies(&self) -> Vec<String> {
        quick_replies(&self.store.snapshot().messages).to_vec()
    }

    pub fn view(&self) -> ConversationView {
        let notice = self.notice();
        ConversationView::from_parts(self.store.snapshot(), notice)
    }

    pub fn draft(&self) -> String {
        self.state().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.state().draft = text.into();
    }

    pub fn edit_draft<R>(&self, edit: impl FnOnce(&mut String) -> R) -> R {
        edit(&mut self.state().draft)
    }

    pub fn notice(&self) -> Option<String> {
        self.state().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state().notice = None;
    }

    /// Tear down: responses still in flight will not touch state.
    pub fn unmount(&self) {
        self.store.detach();
    }
}
