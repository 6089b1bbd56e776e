use roadmap_core::{
    Author, ConversationController, ConversationView, InputSurface, Message, StoreEvent,
};
use tokio::task::JoinHandle;

use crate::ui::chat_paragraph;

/// Network operations the UI can start. Each runs on its own task so the
/// event loop never waits on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Load,
    Retry,
    SendDraft,
    SendButton(String),
    Reset,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub controller: ConversationController,
    pub api_root: String,

    // Input state
    pub cursor: usize, // cursor position in the draft, in chars
    pub selected_button: usize,

    // Chat area
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    tasks: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(controller: ConversationController, api_root: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            controller,
            api_root: api_root.into(),
            cursor: 0,
            selected_button: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            tasks: Vec::new(),
        }
    }

    pub fn view(&self) -> ConversationView {
        self.controller.view()
    }

    pub fn draft(&self) -> String {
        self.controller.draft()
    }

    /// Start a network operation in the background.
    pub fn spawn(&mut self, op: Op) {
        tracing::debug!(?op, "Starting chatbot operation");
        let controller = self.controller.clone();

        self.tasks.push(tokio::spawn(async move {
            // Failures already live in the store status or the notice
            let result = match op {
                Op::Load => controller.start().await.map(|_| ()),
                Op::Retry => controller.retry().await.map(|_| ()),
                Op::SendDraft => controller.send_draft().await.map(|_| ()),
                Op::SendButton(label) => controller.send_from_button(&label).await.map(|_| ()),
                Op::Reset => controller.reset().await.map(|_| ()),
            };
            if let Err(e) = result {
                tracing::debug!(error = %e, "Chatbot operation failed");
            }
        }));
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    fn reap_tasks(&mut self) {
        self.tasks.retain(|t| !t.is_finished());
    }

    /// Unmount the conversation and leave. Late responses are ignored.
    pub fn quit(&mut self) {
        self.should_quit = true;
        self.controller.unmount();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        self.reap_tasks();
        if matches!(self.view(), ConversationView::Loading)
            || matches!(self.view(), ConversationView::Ready { busy: true, .. })
        {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn on_store_event(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Replaced { grew, .. } => {
                // A fresh button set always starts at its first label
                self.selected_button = 0;
                self.clamp_cursor();
                if grew {
                    self.scroll_to_bottom();
                }
            }
            StoreEvent::Failed { message } => {
                tracing::debug!(%message, "Conversation failed to load");
            }
        }
    }

    // Draft editing. Sends may clear the draft from another task, so the
    // cursor is clamped before every edit.

    fn draft_len(&self) -> usize {
        self.controller.edit_draft(|draft| draft.chars().count())
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.draft_len());
    }

    pub fn insert_char(&mut self, c: char) {
        self.clamp_cursor();
        let cursor = self.cursor;
        self.controller.edit_draft(|draft| {
            let byte_pos = char_to_byte_index(draft, cursor);
            draft.insert(byte_pos, c);
        });
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let cursor = self.cursor;
        self.controller.edit_draft(|draft| {
            let byte_pos = char_to_byte_index(draft, cursor);
            draft.remove(byte_pos);
        });
    }

    pub fn delete(&mut self) {
        self.clamp_cursor();
        let cursor = self.cursor;
        self.controller.edit_draft(|draft| {
            if cursor < draft.chars().count() {
                let byte_pos = char_to_byte_index(draft, cursor);
                draft.remove(byte_pos);
            }
        });
    }

    pub fn cursor_left(&mut self) {
        self.clamp_cursor();
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft_len();
    }

    pub fn submit_draft(&mut self) {
        if self.draft().trim().is_empty() {
            return;
        }
        self.spawn(Op::SendDraft);
    }

    // Quick replies

    pub fn buttons(&self) -> Vec<String> {
        match self.view() {
            ConversationView::Ready {
                input: InputSurface::QuickReplies(labels),
                ..
            } => labels,
            _ => Vec::new(),
        }
    }

    pub fn next_button(&mut self) {
        let count = self.buttons().len();
        if count > 0 {
            self.selected_button = (self.selected_button + 1) % count;
        }
    }

    pub fn prev_button(&mut self) {
        let count = self.buttons().len();
        if count > 0 {
            self.selected_button = (self.selected_button + count - 1) % count;
        }
    }

    /// Send the label at `idx`; out-of-range picks are ignored.
    pub fn press_button(&mut self, idx: usize) {
        if let Some(label) = self.buttons().get(idx).cloned() {
            self.selected_button = idx;
            self.spawn(Op::SendButton(label));
        }
    }

    pub fn press_selected_button(&mut self) {
        self.press_button(self.selected_button);
    }

    // Scrolling

    pub fn scroll_down(&mut self) {
        let max = self.max_scroll();
        self.chat_scroll = (self.chat_scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.visible_height() / 2).max(1);
        self.chat_scroll = self.chat_scroll.saturating_add(half).min(self.max_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.visible_height() / 2).max(1);
        self.chat_scroll = self.chat_scroll.saturating_sub(half);
    }

    /// Scroll chat to bottom so the newest message is visible
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn max_scroll(&self) -> u16 {
        match self.view() {
            ConversationView::Ready { messages, busy, .. } => {
                chat_line_count(&messages, busy, self.chat_width)
                    .saturating_sub(self.visible_height())
            }
            _ => 0,
        }
    }
}

/// Rendered height of the conversation at `width`, wrapped the way
/// `ui::render_chat` wraps it.
pub fn chat_line_count(messages: &[Message], busy: bool, width: u16) -> u16 {
    // Before the first draw the width is unknown
    let width = if width > 0 { width } else { 50 };
    let lines = chat_paragraph(messages, busy, 0).line_count(width);
    u16::try_from(lines).unwrap_or(u16::MAX)
}

pub fn author_label(author: Author) -> &'static str {
    match author {
        Author::Bot => "Roadmap:",
        Author::User => "You:",
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
