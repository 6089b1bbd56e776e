use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use roadmap_core::{Author, ConversationView, InputSurface, Message};
use crate::app::{author_label, App};
use crate::markup::parse_markup_line;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let view = app.view();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, &view, frame, header_area);

    match &view {
        ConversationView::Loading => render_loading(app, frame, body_area),
        ConversationView::Failed { message } => render_failed(message, frame, body_area),
        ConversationView::Ready {
            messages,
            input,
            busy,
            notice,
        } => render_ready(app, messages, input, *busy, notice.as_deref(), frame, body_area),
    }

    render_footer(&view, frame, footer_area);
}

fn render_header(app: &App, view: &ConversationView, frame: &mut Frame, area: Rect) {
    let status = match view {
        ConversationView::Loading => Span::styled("loading", Style::default().fg(Color::DarkGray)),
        ConversationView::Failed { .. } => Span::styled("error", Style::default().fg(Color::Red)),
        ConversationView::Ready { busy: true, .. } => {
            Span::styled("syncing", Style::default().fg(Color::Yellow))
        }
        ConversationView::Ready { .. } => Span::styled("ready", Style::default().fg(Color::Green)),
    };

    let header = Line::from(vec![
        Span::styled(
            " Roadmap ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.api_root.as_str(), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        status,
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_footer(view: &ConversationView, frame: &mut Frame, area: Rect) {
    let hints = match view {
        ConversationView::Loading => "Esc quit",
        ConversationView::Failed { .. } => "r retry | q quit",
        ConversationView::Ready {
            input: InputSurface::QuickReplies(_),
            notice,
            ..
        } => {
            if notice.is_some() {
                "1-9/Enter choose | Tab move | Esc dismiss | Ctrl-R reset | Ctrl-C quit"
            } else {
                "1-9/Enter choose | Tab move | PgUp/PgDn scroll | Ctrl-R reset | Esc quit"
            }
        }
        ConversationView::Ready { notice, .. } => {
            if notice.is_some() {
                "Enter send | Esc dismiss | Ctrl-R reset | Ctrl-C quit"
            } else {
                "Enter send | PgUp/PgDn scroll | Ctrl-R reset | Esc quit"
            }
        }
    };
    let footer = Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray)));
    frame.render_widget(footer, area);
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((app.animation_frame as usize) + 1);
    let text = Paragraph::new(Span::styled(
        format!("Loading{}", dots),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(" Roadmap "));
    frame.render_widget(text, area);
}

fn render_failed(message: &str, frame: &mut Frame, area: Rect) {
    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            format!("Can not load messages: {}", message),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press r to try again.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Roadmap ");
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(widget, area);
}

fn render_ready(
    app: &mut App,
    messages: &[Message],
    input: &InputSurface,
    busy: bool,
    notice: Option<&str>,
    frame: &mut Frame,
    area: Rect,
) {
    let notice_height = if notice.is_some() { 3 } else { 0 };

    let [chat_area, notice_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(notice_height),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    render_chat(app, messages, busy, frame, chat_area);

    if let Some(text) = notice {
        let banner = Paragraph::new(Span::styled(text, Style::default().fg(Color::Red)))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Notice "),
            );
        frame.render_widget(banner, notice_area);
    }

    match input {
        InputSurface::QuickReplies(labels) => render_buttons(app, labels, frame, input_area),
        InputSurface::FreeText => render_input(app, frame, input_area),
    }
}

fn render_chat(app: &App, messages: &[Message], busy: bool, frame: &mut Frame, area: Rect) {
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Conversation ");

    let chat = chat_paragraph(messages, busy, app.animation_frame)
        .block(chat_block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

/// The conversation body without border or scroll. Scroll limits are measured
/// on this same paragraph, so they always agree with what is drawn.
pub fn chat_paragraph(
    messages: &[Message],
    busy: bool,
    animation_frame: u8,
) -> Paragraph<'static> {
    let chat_text = if messages.is_empty() && !busy {
        Text::from(Span::styled(
            "No messages yet. Say hello!",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line<'static>> = Vec::new();

        for msg in messages {
            let color = match msg.author {
                Author::User => Color::Cyan,
                Author::Bot => Color::Yellow,
            };
            lines.push(Line::from(Span::styled(
                author_label(msg.author),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            match msg.author {
                Author::User => {
                    for line in msg.text.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                Author::Bot => {
                    for line in msg.text.lines() {
                        lines.push(parse_markup_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        if busy {
            let dots = ".".repeat((animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Waiting for the server{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    Paragraph::new(chat_text).wrap(Wrap { trim: false })
}

fn render_buttons(app: &App, labels: &[String], frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Quick replies ");

    let mut spans: Vec<Span> = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        let style = if i == app.selected_button {
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Magenta)
        };
        spans.push(Span::styled(format!(" {}. {} ", i + 1, label), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    let draft = app.draft();
    let cursor_pos = app.cursor.min(draft.chars().count());

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled(
            "Type your message...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}
