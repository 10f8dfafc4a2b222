use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{betting, drivers, standings, teams};

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
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  F1INSIGHT";
    let help_hint = "[?] Help";

    let user_part = match app.display_username {
        Some(ref name) => format!("  {}", name),
        None => "  not logged in".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(user_part.clone(), styles::muted_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.len() + user_part.len() + help_hint.len() + 4),
        )),
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
        ("[1] Standings", app.current_tab == Tab::Standings),
        ("[2] Drivers", app.current_tab == Tab::Drivers),
        ("[3] Teams", app.current_tab == Tab::Teams),
        ("[4] Betting", app.current_tab == Tab::Betting),
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

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Standings => standings::render(frame, app, area),
        Tab::Drivers => drivers::render(frame, app, area),
        Tab::Teams => teams::render(frame, app, area),
        Tab::Betting => betting::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [L]ogout | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" Season {} ", app.standings_season)
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(52, 24, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("     ╔═╗╔═╗  ╦╔╗╔╔═╗╦╔═╗╦ ╦╔╦╗", styles::title_style())),
        Line::from(Span::styled("     ╠╣  ║   ║║║║╚═╗║║ ╦╠═╣ ║", styles::title_style())),
        Line::from(Span::styled("     ╚  ═╩═  ╩╝╚╝╚═╝╩╚═╝╩ ╩ ╩", styles::title_style())),
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("  1-4       ", "Switch tabs"),
        help_line("  ←/→       ", "Prev/next tab"),
        help_line("  Tab       ", "Switch focus (list ↔ detail)"),
        help_line("  ↑/↓       ", "Navigate list"),
        help_line("  Enter     ", "Select / drill down"),
        help_line("  Esc       ", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("  /         ", "Search drivers"),
        help_line("  c         ", "Compare with selected driver"),
        help_line("  s/r/b     ", "Detail: stats/races/box plot"),
        help_line("  u         ", "Refresh data"),
        help_line("  L         ", "Log out"),
        help_line("  q         ", "Quit"),
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

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(46, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![];

    lines.push(Line::from(Span::styled("      ╔═╗╔═╗  ╦╔╗╔╔═╗╦╔═╗╦ ╦╔╦╗", styles::title_style())));
    lines.push(Line::from(Span::styled("      ╠╣  ║   ║║║║╚═╗║║ ╦╠═╣ ║", styles::title_style())));
    lines.push(Line::from(Span::styled("      ╚  ═╩═  ╩╝╚╝╚═╝╩╚═╝╩ ╩ ╩", styles::title_style())));
    lines.push(Line::from(""));

    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let username_display = format!("{:<16}", app.login_username);
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Username: [", styles::muted_style()),
        Span::styled(format!("{}{}", username_display, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.len().min(16));
    let password_display = format!("{:<16}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    lines.push(Line::from(""));

    let login_focused = app.login_focus == LoginFocus::LoginButton;
    let register_focused = app.login_focus == LoginFocus::RegisterButton;
    let button = |label: &str, focused: bool| {
        if focused {
            Span::styled(format!(" ▶ {} ◀ ", label), styles::selected_style())
        } else {
            Span::styled(format!("   {}   ", label), styles::list_item_style())
        }
    };
    lines.push(Line::from(vec![
        Span::raw("      ["),
        button("Login", login_focused),
        Span::raw("]  ["),
        button("Register", register_focused),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 9, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled("      ╔═╗╔═╗  ╦╔╗╔╔═╗╦╔═╗╦ ╦╔╦╗", styles::title_style())),
        Line::from(Span::styled("      ╠╣  ║   ║║║║╚═╗║║ ╦╠═╣ ║", styles::title_style())),
        Line::from(Span::styled("      ╚  ═╩═  ╩╝╚╝╚═╝╩╚═╝╩ ╩ ╩", styles::title_style())),
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
