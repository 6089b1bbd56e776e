#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use roadmap_core::{ChatbotApi, ChatbotError, ConversationController, Message, MessageStore};
use tokio::sync::oneshot;

type FetchResult = Result<Vec<Message>, ChatbotError>;
type PostResult = Result<(), ChatbotError>;

/// The two POST endpoints, for gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Post {
    Send,
    Reset,
}

/// In-memory chatbot server. Sends append the user turn plus a canned bot
/// follow-up for the quick replies it knows about.
#[derive(Default)]
pub struct FakeChatbot {
    log: Mutex<Vec<Message>>,
    fail_fetch: Mutex<Option<ChatbotError>>,
    fail_send: Mutex<Option<ChatbotError>>,
    fail_reset: Mutex<Option<ChatbotError>>,
    gate_fetches: AtomicBool,
    gates: Mutex<HashMap<usize, oneshot::Sender<FetchResult>>>,
    gate_posts: AtomicBool,
    post_gates: Mutex<HashMap<(Post, usize), oneshot::Sender<PostResult>>>,
    fetch_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

pub fn greeting() -> Message {
    Message::bot("Hi! Do you want to see the roadmap?").with_buttons(["Yes", "No"])
}

fn follow_up(text: &str) -> Option<Message> {
    match text {
        "Yes" => Some(Message::bot("Great! What would you like to know first?")),
        "No" => Some(Message::bot("Okay. Come back any time.").with_buttons(["Start over"])),
        _ => None,
    }
}

impl FakeChatbot {
    pub fn with_log(log: Vec<Message>) -> Arc<Self> {
        let fake = Self::default();
        *fake.log.lock().unwrap() = log;
        Arc::new(fake)
    }

    pub fn greeting() -> Arc<Self> {
        Self::with_log(vec![greeting()])
    }

    pub fn set_log(&self, log: Vec<Message>) {
        *self.log.lock().unwrap() = log;
    }

    pub fn fail_fetch(&self, err: Option<ChatbotError>) {
        *self.fail_fetch.lock().unwrap() = err;
    }

    pub fn fail_send(&self, err: Option<ChatbotError>) {
        *self.fail_send.lock().unwrap() = err;
    }

    pub fn fail_reset(&self, err: Option<ChatbotError>) {
        *self.fail_reset.lock().unwrap() = err;
    }

    /// Hold every fetch until [`FakeChatbot::release`] is called for it.
    pub fn gate_fetches(&self) {
        self.gate_fetches.store(true, Ordering::SeqCst);
    }

    /// Resolve the `call`-th fetch (zero based).
    pub fn release(&self, call: usize, result: FetchResult) {
        let tx = self
            .gates
            .lock()
            .unwrap()
            .remove(&call)
            .expect("fetch call is not waiting");
        let _ = tx.send(result);
    }

    pub fn is_waiting(&self, call: usize) -> bool {
        self.gates.lock().unwrap().contains_key(&call)
    }

    /// Hold every send and reset until [`FakeChatbot::release_post`] is
    /// called for it. Fetches are unaffected.
    pub fn gate_posts(&self) {
        self.gate_posts.store(true, Ordering::SeqCst);
    }

    /// Resolve the `call`-th request (zero based) to `endpoint`. An `Ok`
    /// carries on as an ungated request would.
    pub fn release_post(&self, endpoint: Post, call: usize, result: PostResult) {
        let tx = self
            .post_gates
            .lock()
            .unwrap()
            .remove(&(endpoint, call))
            .expect("post call is not waiting");
        let _ = tx.send(result);
    }

    pub fn is_post_waiting(&self, endpoint: Post, call: usize) -> bool {
        self.post_gates.lock().unwrap().contains_key(&(endpoint, call))
    }

    async fn hold(&self, endpoint: Post, call: usize) -> PostResult {
        if !self.gate_posts.load(Ordering::SeqCst) {
            return Ok(());
        }
        let (tx, rx) = oneshot::channel();
        self.post_gates.lock().unwrap().insert((endpoint, call), tx);
        rx.await
            .unwrap_or_else(|_| Err(ChatbotError::Network("gate dropped".to_string())))
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn log(&self) -> Vec<Message> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatbotApi for FakeChatbot {
    async fn fetch_messages(&self) -> Result<Vec<Message>, ChatbotError> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.gate_fetches.load(Ordering::SeqCst) {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(call, tx);
            return rx
                .await
                .unwrap_or_else(|_| Err(ChatbotError::Network("gate dropped".to_string())));
        }

        if let Some(err) = self.fail_fetch.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.log())
    }

    async fn send_message(&self, text: &str) -> Result<(), ChatbotError> {
        let call = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(text.to_string());
            sent.len() - 1
        };
        self.hold(Post::Send, call).await?;

        if let Some(err) = self.fail_send.lock().unwrap().clone() {
            return Err(err);
        }

        let mut log = self.log.lock().unwrap();
        log.push(Message::user(text));
        if let Some(reply) = follow_up(text) {
            log.push(reply);
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), ChatbotError> {
        let call = self.reset_calls.fetch_add(1, Ordering::SeqCst);
        self.hold(Post::Reset, call).await?;

        if let Some(err) = self.fail_reset.lock().unwrap().clone() {
            return Err(err);
        }
        *self.log.lock().unwrap() = vec![greeting()];
        Ok(())
    }
}

pub fn store_for(fake: &Arc<FakeChatbot>) -> MessageStore {
    MessageStore::new(fake.clone())
}

pub fn controller_for(fake: &Arc<FakeChatbot>) -> ConversationController {
    ConversationController::new(store_for(fake))
}

/// Yield until `cond` holds. Panics instead of hanging forever.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
