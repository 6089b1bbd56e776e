//! What a front end should draw for a given store snapshot.

use crate::message::{quick_replies, Message};
use crate::store::{Snapshot, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSurface {
    /// One button per label; no text box.
    QuickReplies(Vec<String>),
    FreeText,
}

impl InputSurface {
    pub fn buttons(&self) -> &[String] {
        match self {
            InputSurface::QuickReplies(labels) => labels,
            InputSurface::FreeText => &[],
        }
    }

    pub fn accepts_text(&self) -> bool {
        matches!(self, InputSurface::FreeText)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationView {
    /// Nothing to show yet.
    Loading,
    /// The last load failed. Blocks the log until a retry succeeds.
    Failed { message: String },
    Ready {
        messages: Vec<Message>,
        input: InputSurface,
        /// A request is in flight.
        busy: bool,
        notice: Option<String>,
    },
}

impl ConversationView {
    pub fn from_parts(snapshot: Snapshot, notice: Option<String>) -> Self {
        match snapshot.status {
            Status::Error(message) => ConversationView::Failed { message },
            Status::Initial => ConversationView::Loading,
            Status::Loading if !snapshot.loaded => ConversationView::Loading,
            status => {
                let labels = quick_replies(&snapshot.messages);
                let input = if labels.is_empty() {
                    InputSurface::FreeText
                } else {
                    InputSurface::QuickReplies(labels.to_vec())
                };
                ConversationView::Ready {
                    messages: snapshot.messages,
                    input,
                    busy: status.is_loading(),
                    notice,
                }
            }
        }
    }
}
