pub mod api;
pub mod buttons;
pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use api::{ChatbotApi, HttpChatbotClient};
pub use config::Config;
pub use controller::{ConversationController, SendOutcome};
pub use error::ChatbotError;
pub use message::{quick_replies, Author, Message};
pub use store::{LoadOutcome, MessageStore, Snapshot, Status, StoreEvent};
pub use view::{ConversationView, InputSurface};
