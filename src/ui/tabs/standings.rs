//! Standings tab - driver and constructor championship tables.

use ratatui::{
    layout::{Constraint, Rect},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, StandingsView};
use crate::ui::styles;
use crate::utils::{format_points, format_position};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref error) = app.standings_error {
        let message = Paragraph::new(Line::from(format!(" {}", error)))
            .style(styles::error_style())
            .block(
                Block::default()
                    .title(format!(" Standings {} ", app.standings_season))
                    .borders(Borders::ALL)
                    .border_style(styles::border_style(true)),
            );
        frame.render_widget(message, area);
        return;
    }

    match app.standings_view {
        StandingsView::Drivers => render_driver_table(frame, app, area),
        StandingsView::Teams => render_team_table(frame, app, area),
    }
}

fn render_driver_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Pos"),
        Cell::from("Driver"),
        Cell::from("Nationality"),
        Cell::from("Team"),
        Cell::from("Points"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .driver_standings
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == app.standings_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new([
                Cell::from(format_position(row.position)),
                Cell::from(row.driver.clone()),
                Cell::from(row.nationality.clone().unwrap_or_default()),
                Cell::from(row.team.clone().unwrap_or_default()),
                Cell::from(format!("{:>6}", format_points(row.points))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(32),
        Constraint::Percentage(20),
        Constraint::Percentage(28),
        Constraint::Length(8),
    ];

    let title = table_title(app, "Drivers");
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
    state.select(Some(app.standings_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_team_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Pos"),
        Cell::from("Team"),
        Cell::from("Points"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .team_standings
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == app.standings_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new([
                Cell::from(format_position(row.position)),
                Cell::from(row.team.clone()),
                Cell::from(format!("{:>6}", format_points(row.points))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(70),
        Constraint::Length(8),
    ];

    let title = table_title(app, "Constructors");
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
    state.select(Some(app.standings_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn table_title(app: &App, which: &str) -> String {
    let loading = if app.standings_loading { " (loading...)" } else { "" };
    format!(
        " {} Championship {}{} - [d]rivers [t]eams [-/+] season ",
        which, app.standings_season, loading
    )
}
