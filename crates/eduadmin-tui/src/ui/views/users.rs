use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use eduadmin_core::utils::format_uz_phone;

use crate::app::App;
use crate::route::Route;
use crate::ui::styles;

use super::{render_empty, render_error, render_skeleton};

/// Skeleton rows while a users list loads.
const SKELETON_ROWS: usize = 8;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Route::Users { role } = app.route else {
        return;
    };
    let title = format!(" Users - {} ", role.map(|r| r.as_str()).unwrap_or("all"));

    let Some(collection) = app.current_users() else {
        render_skeleton(frame, area, &title, SKELETON_ROWS);
        return;
    };

    if let (Some(error), false) = (collection.error.as_deref(), collection.is_loading) {
        render_error(frame, area, &title, error);
        return;
    }
    if collection.items.is_none() {
        render_skeleton(frame, area, &title, SKELETON_ROWS);
        return;
    }

    let users = app.current_user_list();
    if users.is_empty() {
        render_empty(frame, area, &title, "No users found", None);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Role"),
        Cell::from("Phone"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = users
        .iter()
        .map(|u| {
            let status = if u.is_active {
                Span::styled("Active", styles::success_style())
            } else {
                Span::styled("Inactive", styles::muted_style())
            };
            Row::new(vec![
                Cell::from(u.full_name()),
                Cell::from(u.role.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(u.phone.as_deref().map(format_uz_phone).unwrap_or_else(|| "-".to_string())),
                Cell::from(status),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Length(12),
        Constraint::Length(20),
        Constraint::Length(10),
    ];

    let suffix = if collection.is_loading { " - refreshing..." } else { "" };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!("{}({}){} ", title, users.len(), suffix))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection.min(users.len().saturating_sub(1))));

    frame.render_stateful_widget(table, area, &mut state);
}
