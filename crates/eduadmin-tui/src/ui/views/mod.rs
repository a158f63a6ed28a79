//! Route content rendering.
//!
//! Views render strictly from store state. The panels here cover the states
//! every list view shares: loading skeleton, error with retry, and empty.

pub mod tests;
pub mod user;
pub mod users;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::styles;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
}

/// Placeholder rows shown while a page is loading with nothing cached.
pub fn render_skeleton(frame: &mut Frame, area: Rect, title: &str, rows: usize) {
    let width = area.width.saturating_sub(4) as usize;
    let mut lines = Vec::with_capacity(rows * 2);
    for i in 0..rows {
        // Alternate bar lengths so rows read as separate items
        let len = if i % 2 == 0 { width * 3 / 4 } else { width / 2 };
        lines.push(Line::from(Span::styled("▆".repeat(len), styles::skeleton_style())));
        lines.push(Line::from(Span::styled("▂".repeat(width / 3), styles::skeleton_style())));
    }
    frame.render_widget(Paragraph::new(lines).block(panel(title)), area);
}

pub fn render_error(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), styles::error_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[r]", styles::help_key_style()),
            Span::styled(" to retry", styles::muted_style()),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel(title));
    frame.render_widget(paragraph, area);
}

pub fn render_empty(frame: &mut Frame, area: Rect, title: &str, message: &str, hint: Option<Line<'_>>) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), styles::muted_style())),
    ];
    if let Some(hint) = hint {
        lines.push(Line::from(""));
        lines.push(hint);
    }
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(panel(title));
    frame.render_widget(paragraph, area);
}

pub fn render_loading(frame: &mut Frame, area: Rect, title: &str) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Loading...", styles::muted_style())),
    ])
    .alignment(Alignment::Center)
    .block(panel(title));
    frame.render_widget(paragraph, area);
}
