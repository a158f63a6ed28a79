use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use eduadmin_core::store::CollectionKey;

use crate::app::{App, AppState};
use crate::route::Route;

use super::styles;
use super::views::{tests as tests_view, user, users};

/// Maximum rows of the teacher selector before it scrolls.
const SELECTOR_MAX_ROWS: u16 = 16;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::SelectingTeacher => render_teacher_selector(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  EduAdmin";
    let location = format!("  {} · {}", app.route.title(), app.route);
    let signed_in = app
        .current_user()
        .map(|u| format!("{} ({})  ", u.full_name(), u.role.as_deref().unwrap_or("-")))
        .unwrap_or_default();
    let help_hint = "[?] Help";

    let used = title.len() + location.chars().count() + signed_in.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(location, styles::muted_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(signed_in, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let main_tabs = [
        ("[1] Tests", matches!(app.route, Route::Tests { .. })),
        ("[2] Users", matches!(app.route, Route::Users { .. } | Route::User { .. })),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in main_tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    // Active filter on the right
    let filter = match &app.route {
        Route::Tests { .. } if !app.is_teacher() => Some(format!("[t]eacher: {}", app.current_teacher_label())),
        Route::Users { role } => Some(format!(
            "[f]ilter role: {}",
            role.map(|r| r.as_str()).unwrap_or("all")
        )),
        _ => None,
    };
    if let Some(filter) = filter {
        let main_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = (area.width as usize).saturating_sub(main_width + filter.chars().count() + 2);
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(filter, styles::highlight_style()));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match &app.route {
        Route::Tests { .. } => tests_view::render(frame, app, area),
        Route::Users { .. } => users::render(frame, app, area),
        Route::User { .. } => user::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.route {
        Route::Tests { .. } => "←/→ page | [r]etry | [q]uit",
        Route::Users { .. } => "[Enter] open | [r]etry | [q]uit",
        Route::User { .. } => "[Space] toggle | [Enter] save | [Esc] back",
    };

    let (left_text, left_style) = match app.toast {
        Some(ref toast) => (format!(" {} ", toast.message), styles::toast_style(toast.level)),
        None => match app.data_age() {
            Some(age) => (format!(" Updated {} ", age), styles::muted_style()),
            None => (String::new(), styles::muted_style()),
        },
    };
    let right_text = if app.can_go_back() && !matches!(app.route, Route::User { .. }) {
        format!(" [Esc] back | {} ", shortcuts)
    } else {
        format!(" {} ", shortcuts)
    };

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 25, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  EduAdmin", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1 / 2", "Tests / users"),
        help_line("↑/↓ j/k", "Move selection"),
        help_line("Enter", "Open / save"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Tests", styles::highlight_style())),
        help_line("←/→ h/l", "Previous / next page"),
        help_line("g", "First page"),
        help_line("t", "Choose teacher"),
        Line::from(""),
        Line::from(Span::styled(" Users", styles::highlight_style())),
        help_line("f", "Cycle role filter"),
        help_line("Space", "Toggle active (detail)"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("r", "Retry / reload"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_teacher_selector(frame: &mut Frame, app: &App) {
    let options = app.teacher_options();
    let rows = (options.len() as u16).min(SELECTOR_MAX_ROWS);
    // 32-char labels plus marker and borders
    let area = centered_rect_fixed(40, rows + 4, frame.area());

    frame.render_widget(Clear, area);

    let loading = app
        .store
        .collections()
        .is_collection_loading(&CollectionKey::TeacherNames);
    let title = if loading { " Teacher (loading...) " } else { " Teacher " };

    let items: Vec<ListItem> = options
        .iter()
        .map(|(_, label)| ListItem::new(Line::from(format!(" {}", label))))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .title_bottom(Line::from(" [Enter] select  [Esc] cancel ").style(styles::muted_style()))
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .style(styles::list_item_style())
        .highlight_style(styles::selected_style())
        .highlight_symbol("▶");

    let mut state = ListState::default();
    state.select(Some(app.teacher_selection.min(options.len().saturating_sub(1))));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
