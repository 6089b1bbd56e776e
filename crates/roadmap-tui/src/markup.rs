//! Light markup in bot messages: `**bold**` and `*italic*`.
//!
//! Text is only styled, never interpreted. Unclosed markers stay literal.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Parse a line of text and convert **bold** and *italic* markup to styled spans
pub fn parse_markup_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(start) = rest.find('*') {
        let (marker, style) = if rest[start..].starts_with("**") {
            ("**", Style::default().add_modifier(Modifier::BOLD))
        } else {
            ("*", Style::default().add_modifier(Modifier::ITALIC))
        };

        let after_open = &rest[start + marker.len()..];
        // Content must hug its markers, so "2 * 3" is not emphasis
        let closing = after_open.find(marker).filter(|&end| {
            let inner = &after_open[..end];
            end > 0 && inner.trim() == inner
        });

        match closing {
            Some(end) => {
                plain.push_str(&rest[..start]);
                if !plain.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut plain)));
                }
                spans.push(Span::styled(after_open[..end].to_string(), style));
                rest = &after_open[end + marker.len()..];
            }
            _ => {
                // No closing marker, treat as literal
                plain.push_str(&rest[..start + marker.len()]);
                rest = after_open;
            }
        }
    }
    plain.push_str(rest);

    if !plain.is_empty() {
        spans.push(Span::raw(plain));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}
