use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use roadmap_core::{ConversationView, InputSurface};
use crate::app::{App, Op};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Store(event) => app.on_store_event(event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys that work in any view
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
            app.quit();
            return;
        }
        KeyCode::Char('r') if ctrl => {
            app.spawn(Op::Reset);
            return;
        }
        KeyCode::Char('d') if ctrl => {
            app.scroll_half_page_down();
            return;
        }
        KeyCode::Char('u') if ctrl => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_half_page_down();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_half_page_up();
            return;
        }
        _ => {}
    }

    match app.view() {
        ConversationView::Loading => {
            if key.code == KeyCode::Esc {
                app.quit();
            }
        }
        ConversationView::Failed { .. } => handle_failed(app, key),
        ConversationView::Ready { input, notice, .. } => {
            if key.code == KeyCode::Esc {
                if notice.is_some() {
                    app.controller.dismiss_notice();
                } else {
                    app.quit();
                }
                return;
            }
            match input {
                InputSurface::QuickReplies(_) => handle_quick_replies(app, key),
                InputSurface::FreeText => handle_free_text(app, key),
            }
        }
    }
}

fn handle_failed(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') | KeyCode::Enter => app.spawn(Op::Retry),
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        _ => {}
    }
}

fn handle_quick_replies(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => app.next_button(),
        KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => app.prev_button(),
        KeyCode::Enter | KeyCode::Char(' ') => app.press_selected_button(),
        KeyCode::Char(c @ '1'..='9') => {
            let idx = (c as usize) - ('1' as usize);
            app.press_button(idx);
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        _ => {}
    }
}

fn handle_free_text(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_draft(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(),
        MouseEventKind::ScrollUp => app.scroll_up(),
        _ => {}
    }
}
