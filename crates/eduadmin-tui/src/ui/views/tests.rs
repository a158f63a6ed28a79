use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use eduadmin_core::models::TestStatus;
use eduadmin_core::utils::{format_date, format_time, truncate_string};

use crate::app::App;
use crate::route::Route;
use crate::ui::styles;

use super::{render_empty, render_error, render_skeleton};

/// Page links shown in the pagination bar.
const PAGE_LINKS: u32 = 5;

/// Maximum characters of a test title in the table.
const TITLE_MAX_LEN: usize = 48;

/// Render the tests list for the current route.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Route::Tests { page, .. } = app.route else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Page info
            Constraint::Min(5),    // List
            Constraint::Length(1), // Pagination
        ])
        .split(area);

    render_page_info(frame, app, page, chunks[0]);

    let title = " Tests ";
    let Some(cached) = app.current_tests_page() else {
        render_skeleton(frame, chunks[1], title, app.config.page_size as usize);
        return;
    };

    if let (Some(error), false) = (cached.error.as_deref(), cached.is_loading) {
        render_error(frame, chunks[1], title, error);
    } else if cached.data.is_none() {
        render_skeleton(frame, chunks[1], title, app.config.page_size as usize);
    } else if app.current_tests().is_empty() {
        let hint = (page > 1).then(|| {
            Line::from(vec![
                Span::styled("[g]", styles::help_key_style()),
                Span::styled(" back to page 1", styles::muted_style()),
            ])
        });
        render_empty(frame, chunks[1], title, &format!("No tests found on page {}", page), hint);
    } else {
        render_table(frame, app, chunks[1], cached.is_loading);
        render_pagination(frame, app, page, chunks[2]);
    }
}

fn render_page_info(frame: &mut Frame, app: &App, page: u32, area: Rect) {
    let text = match app.current_tests_metadata() {
        Some(meta) => format!(
            " Page {} / {} • Total {}",
            page,
            meta.total_pages.max(1),
            meta.total
        ),
        None => format!(" Page {}", page),
    };
    frame.render_widget(Paragraph::new(Span::styled(text, styles::muted_style())), area);
}

fn status_style(status: TestStatus) -> ratatui::style::Style {
    match status {
        TestStatus::Regular => styles::muted_style(),
        TestStatus::Copied => styles::highlight_style(),
        TestStatus::Template | TestStatus::FromTemplate => styles::success_style(),
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect, refreshing: bool) {
    let tests = app.current_tests();
    let show_author = !app.is_teacher();

    let mut header_cells = vec![Cell::from("Title")];
    if show_author {
        header_cells.push(Cell::from("Author"));
    }
    header_cells.extend([
        Cell::from("Status"),
        Cell::from("Parts"),
        Cell::from("Subm."),
        Cell::from("Created"),
    ]);
    let header = Row::new(header_cells).style(styles::title_style()).height(1);

    let rows: Vec<Row> = tests
        .iter()
        .map(|test| {
            let statuses: Vec<Span> = test
                .statuses()
                .into_iter()
                .enumerate()
                .flat_map(|(i, s)| {
                    let sep = (i > 0).then(|| Span::styled(", ", styles::muted_style()));
                    sep.into_iter().chain(std::iter::once(Span::styled(s.label(), status_style(s))))
                })
                .collect();

            let created = test
                .created_at
                .as_deref()
                .map(|ts| format!("{} {}", format_date(ts), format_time(ts)))
                .unwrap_or_else(|| "-".to_string());

            let mut cells = vec![Cell::from(truncate_string(&test.title, TITLE_MAX_LEN))];
            if show_author {
                cells.push(Cell::from(test.author_name()));
            }
            cells.extend([
                Cell::from(Line::from(statuses)),
                Cell::from(format!("{:>5}", test.total_parts)),
                Cell::from(format!("{:>5}", test.total_submissions)),
                Cell::from(created),
            ]);
            Row::new(cells).style(styles::list_item_style())
        })
        .collect();

    let mut widths = vec![Constraint::Fill(3)];
    if show_author {
        widths.push(Constraint::Fill(2));
    }
    widths.extend([
        Constraint::Length(24),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(16),
    ]);

    let title = if refreshing {
        format!(" Tests ({}) - refreshing... ", tests.len())
    } else {
        format!(" Tests ({}) ", tests.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection.min(tests.len().saturating_sub(1))));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_pagination(frame: &mut Frame, app: &App, page: u32, area: Rect) {
    let total = app
        .current_tests_metadata()
        .map(|m| m.total_pages)
        .unwrap_or(page)
        .max(page);

    let nav = |label: &'static str, enabled: bool| {
        Span::styled(
            label,
            if enabled { styles::help_key_style() } else { styles::disabled_style() },
        )
    };

    let mut spans = vec![Span::raw(" "), nav("‹ prev", page > 1), Span::raw("  ")];
    for p in page_window(page, total, PAGE_LINKS) {
        if p == page {
            spans.push(Span::styled(format!("[{}]", p), styles::tab_style(true)));
        } else {
            spans.push(Span::styled(format!(" {} ", p), styles::muted_style()));
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(" "));
    spans.push(nav("next ›", app.has_next_page()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Up to `max` consecutive page numbers around `current`, within `1..=total`.
pub fn page_window(current: u32, total: u32, max: u32) -> Vec<u32> {
    if total == 0 || max == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let span = max.min(total);
    let start = current
        .saturating_sub(span / 2)
        .max(1)
        .min(total - span + 1);
    (start..start + span).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_page_window_at_start() {
        assert_eq!(page_window(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 10, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_page_window_centered() {
        assert_eq!(page_window(5, 10, 5), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_page_window_at_end() {
        assert_eq!(page_window(10, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(9, 10, 5), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_page_window_fewer_pages_than_links() {
        assert_eq!(page_window(2, 3, 5), vec![1, 2, 3]);
        assert_eq!(page_window(1, 1, 5), vec![1]);
    }

    #[test]
    fn test_page_window_empty() {
        assert!(page_window(1, 0, 5).is_empty());
        assert!(page_window(1, 4, 0).is_empty());
    }
}
