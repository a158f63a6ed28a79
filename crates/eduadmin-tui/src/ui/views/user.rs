use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use eduadmin_core::utils::{format_date, format_uz_phone};

use crate::app::App;
use crate::ui::styles;

use super::{render_error, render_loading};

/// Render the user detail view with its editable active flag.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = " User ";
    let Some(form) = app.user_form.as_ref() else {
        render_loading(frame, area, title);
        return;
    };

    let Some(user) = app.viewed_user() else {
        if app.is_viewed_user_unreadable() {
            render_error(frame, area, title, "This user's record could not be read");
            return;
        }
        match form.load_error {
            Some(ref error) if !app.is_user_loading(&form.user_id) => {
                render_error(frame, area, title, error)
            }
            _ => render_loading(frame, area, title),
        }
        return;
    };

    let placeholder = "-";
    let mut lines = vec![
        Line::from(Span::styled(user.full_name(), styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Role:    ", styles::muted_style()),
            Span::raw(user.role.clone().unwrap_or_else(|| placeholder.to_string())),
        ]),
        Line::from(vec![
            Span::styled("Phone:   ", styles::muted_style()),
            Span::raw(
                user.phone
                    .as_deref()
                    .map(format_uz_phone)
                    .unwrap_or_else(|| placeholder.to_string()),
            ),
        ]),
        Line::from(vec![
            Span::styled("Joined:  ", styles::muted_style()),
            Span::raw(
                user.created_at
                    .as_deref()
                    .map(format_date)
                    .unwrap_or_else(|| placeholder.to_string()),
            ),
        ]),
        Line::from(""),
    ];

    let active = form.is_active.unwrap_or(user.is_active);
    let (mark, mark_style) = if active {
        ("[x] Active", styles::success_style())
    } else {
        ("[ ] Active", styles::muted_style())
    };
    let mut toggle = vec![Span::styled(mark, mark_style)];
    if app.user_has_changed() {
        toggle.push(Span::styled("  (changed)", styles::highlight_style()));
    }
    lines.push(Line::from(toggle));
    lines.push(Line::from(""));

    let enabled = app.can_submit_user_update();
    let label = if form.is_updating { " Saving... " } else { " Save " };
    lines.push(Line::from(vec![
        Span::styled(label, styles::button_style(enabled)),
        Span::styled("  [Space] toggle  [Enter] save", styles::muted_style()),
    ]));

    if app.is_user_loading(&form.user_id) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Refreshing...", styles::muted_style())));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(paragraph, area);
}
