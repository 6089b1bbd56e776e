//! Server-confirmed message log plus the status of the last request.
//!
//! Loads replace the log wholesale, so every load takes a sequence number
//! when it is issued. A response is applied only if its sequence number is
//! newer than the last one applied; anything older is dropped. Once the store
//! is detached, no response is applied at all.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::api::ChatbotApi;
use crate::error::ChatbotError;
use crate::message::Message;

const EVENT_CAPACITY: usize = 32;

/// Status of the most recent fetch/send attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Initial,
    Loading,
    Success,
    Error(String),
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }
}

/// Fired after a load is applied. Front ends use `Replaced { grew: true }` to
/// scroll to the newest message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Replaced { count: usize, grew: bool },
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response became the store's state.
    Applied,
    /// A newer load had already been applied; the response was dropped.
    Superseded,
    /// The store was detached before or during the request.
    Detached,
}

/// Everything a renderer needs, copied out from under the lock
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub status: Status,
    /// The last applied load succeeded.
    pub loaded: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    messages: Vec<Message>,
    // Initial, Success or Error; Loading is derived from `in_flight`
    outcome: Status,
    in_flight: usize,
    issued: u64,
    applied: u64,
    detached: bool,
}

impl StoreState {
    fn status(&self) -> Status {
        if self.in_flight > 0 {
            Status::Loading
        } else {
            self.outcome.clone()
        }
    }
}

/// Marks a request as in flight until dropped.
#[must_use]
pub struct Pending {
    state: Arc<Mutex<StoreState>>,
}

impl Drop for Pending {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

struct LoadTicket {
    seq: u64,
    _pending: Pending,
}

#[derive(Clone)]
pub struct MessageStore {
    api: Arc<dyn ChatbotApi>,
    state: Arc<Mutex<StoreState>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MessageStore {
    pub fn new(api: Arc<dyn ChatbotApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            state: Arc::new(Mutex::new(StoreState::default())),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state();
        Snapshot {
            messages: state.messages.clone(),
            status: state.status(),
            loaded: state.outcome == Status::Success,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    pub fn status(&self) -> Status {
        self.state().status()
    }

    /// Mark a request as in flight. Returns `None` once detached.
    pub fn track(&self) -> Option<Pending> {
        let mut state = self.state();
        if state.detached {
            return None;
        }
        state.in_flight += 1;
        Some(Pending {
            state: Arc::clone(&self.state),
        })
    }

    fn issue_load(&self) -> Option<LoadTicket> {
        let pending = self.track()?;
        let mut state = self.state();
        state.issued += 1;
        Some(LoadTicket {
            seq: state.issued,
            _pending: pending,
        })
    }

    /// Fetch the full log and replace local state with it.
    pub async fn load(&self) -> Result<LoadOutcome, ChatbotError> {
        let Some(ticket) = self.issue_load() else {
            tracing::debug!("Store detached, skipping load");
            return Ok(LoadOutcome::Detached);
        };

        let result = self.api.fetch_messages().await;
        self.apply(ticket, result)
    }

    fn apply(
        &self,
        ticket: LoadTicket,
        result: Result<Vec<Message>, ChatbotError>,
    ) -> Result<LoadOutcome, ChatbotError> {
        let event = {
            let mut state = self.state();

            if state.detached {
                tracing::debug!(seq = ticket.seq, "Dropping response that arrived after detach");
                return Ok(LoadOutcome::Detached);
            }
            if ticket.seq <= state.applied {
                tracing::debug!(
                    seq = ticket.seq,
                    applied = state.applied,
                    "Dropping stale load response"
                );
                return Ok(LoadOutcome::Superseded);
            }
            state.applied = ticket.seq;

            match &result {
                Ok(messages) => {
                    let grew = messages.len() > state.messages.len();
                    state.messages = messages.clone();
                    state.outcome = Status::Success;
                    StoreEvent::Replaced {
                        count: messages.len(),
                        grew,
                    }
                }
                Err(e) => {
                    let message = e.user_message();
                    tracing::warn!(error = %e, seq = ticket.seq, "Loading chatbot messages failed");
                    state.outcome = Status::Error(message.clone());
                    StoreEvent::Failed { message }
                }
            }
        };

        // Release the in-flight mark before anyone reacts to the event
        drop(ticket);
        let _ = self.events.send(event);

        result.map(|_| LoadOutcome::Applied)
    }

    /// Post a user message. State is not touched; callers reload afterwards.
    ///
    /// Reports `Detached`, success or failure alike, if the store was
    /// detached while the request was out.
    pub async fn post(&self, text: &str) -> Result<LoadOutcome, ChatbotError> {
        let Some(_pending) = self.track() else {
            return Ok(LoadOutcome::Detached);
        };
        let result = self.api.send_message(text).await;
        if self.is_detached() {
            tracing::debug!(ok = result.is_ok(), "Dropping send result that arrived after detach");
            return Ok(LoadOutcome::Detached);
        }
        result.map(|()| LoadOutcome::Applied)
    }

    /// Clear the server-side conversation, then reload.
    ///
    /// Only a failed reset request is an error here. The local log then stays
    /// as it is, since the server still holds it. Once the reset went through,
    /// a failed reload is recorded in the store status like any other load
    /// and reported as `Applied`.
    pub async fn reset(&self) -> Result<LoadOutcome, ChatbotError> {
        let Some(pending) = self.track() else {
            return Ok(LoadOutcome::Detached);
        };

        let result = self.api.reset().await;
        if self.is_detached() {
            tracing::debug!(ok = result.is_ok(), "Dropping reset result that arrived after detach");
            return Ok(LoadOutcome::Detached);
        }
        if let Err(e) = result {
            tracing::warn!(error = %e, "Resetting chatbot conversation failed");
            return Err(e);
        }

        let outcome = match self.load().await {
            Ok(outcome) => outcome,
            Err(_) => LoadOutcome::Applied,
        };
        drop(pending);
        Ok(outcome)
    }

    /// Stop applying responses. Used when the view goes away.
    pub fn detach(&self) {
        let mut state = self.state();
        if !state.detached {
            tracing::debug!(in_flight = state.in_flight, "Detaching message store");
        }
        state.detached = true;
    }

    pub fn is_detached(&self) -> bool {
        self.state().detached
    }
}
