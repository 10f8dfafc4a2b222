//! Teams tab - constructor roster with detail panel and charts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, DetailView, Focus};
use crate::ui::styles;
use crate::ui::tabs::drivers::{render_box_plot, render_race_chart};
use crate::utils::{format_optional, format_points, format_position};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_team_list(frame, app, chunks[0]);
    render_team_detail(frame, app, chunks[1]);
}

fn render_team_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Pos"),
        Cell::from("Team"),
        Cell::from("Nationality"),
        Cell::from("Pts"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let style = if i == app.team_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new([
                Cell::from(format_position(team.position)),
                Cell::from(team.name.clone()),
                Cell::from(team.nationality.clone().unwrap_or_default()),
                Cell::from(format!("{:>5}", format_points(team.points))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Percentage(44),
        Constraint::Percentage(32),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Teams ({}) ", app.teams.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.team_selection));
    frame.render_stateful_widget(table, area, &mut state);

    if let Some(ref error) = app.teams_error {
        let line_area = Rect::new(
            area.x + 1,
            area.y + area.height.saturating_sub(2),
            area.width.saturating_sub(2),
            1,
        );
        let paragraph =
            Paragraph::new(Line::from(format!(" {}", error))).style(styles::error_style());
        frame.render_widget(paragraph, line_area);
    }
}

fn render_team_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    match app.team_detail_view {
        DetailView::Stats => render_stats(frame, app, area, focused),
        DetailView::RaceChart => {
            let name = app
                .team_detail
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "Team".to_string());
            let series: Vec<(&str, &[crate::models::RaceResult])> =
                vec![(name.as_str(), &app.team_races)];
            match crate::charts::line_chart_data(&series) {
                Some(data) => render_race_chart(frame, area, &data, focused),
                None => render_placeholder(frame, app, area, focused, "No race data yet"),
            }
        }
        DetailView::BoxPlot => {
            let name = app
                .team_detail
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "Team".to_string());
            let series: Vec<(&str, &[crate::models::SeasonBoxPlot])> =
                vec![(name.as_str(), &app.team_box_plots)];
            match crate::charts::box_plot_data(&series) {
                Some(data) => render_box_plot(frame, area, &data, focused),
                None => render_placeholder(frame, app, area, focused, "No season data yet"),
            }
        }
    }
}

fn detail_title(app: &App) -> String {
    let name = app
        .team_detail
        .as_ref()
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "Team".to_string());
    format!(" {} - [s]tats [r]aces [b]ox plot ", name)
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect, focused: bool, message: &str) {
    let text = if let Some(ref error) = app.team_detail_error {
        format!(" {}", error)
    } else {
        format!(" {}", message)
    };
    let style = if app.team_detail_error.is_some() {
        styles::error_style()
    } else {
        styles::muted_style()
    };
    let paragraph = Paragraph::new(Line::from(text)).style(style).block(
        Block::default()
            .title(detail_title(app))
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused)),
    );
    frame.render_widget(paragraph, area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect, focused: bool) {
    let block = Block::default()
        .title(detail_title(app))
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let detail = match app.team_detail {
        Some(ref t) => t,
        None => {
            render_placeholder(frame, app, area, focused, "Select a team");
            return;
        }
    };

    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {:<22}", label), styles::muted_style()),
            Span::styled(value, styles::list_item_style()),
        ])
    };
    let fmt_count =
        |value: Option<i64>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::from(Span::styled(format!(" {}", detail.name), styles::title_style())),
        Line::from(""),
        stat("Nationality", format_optional(&detail.nationality, "-")),
        stat("First entry", format_optional(&detail.first_entry, "-")),
        Line::from(""),
        Line::from(Span::styled(" Career", styles::highlight_style())),
        stat("Championships", fmt_count(detail.world_championships)),
        stat("Wins", fmt_count(detail.career_wins)),
        stat("Podiums", fmt_count(detail.career_podiums)),
        stat("Pole positions", fmt_count(detail.career_poles)),
        stat("Points", format_points(detail.career_points)),
        Line::from(""),
        Line::from(Span::styled(" This season", styles::highlight_style())),
        stat("Wins", fmt_count(detail.current_season_wins)),
        stat("Podiums", fmt_count(detail.current_season_podiums)),
        stat("Points", format_points(detail.current_season_points)),
    ];

    if !detail.drivers.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Drivers", styles::highlight_style())));
        for driver in &detail.drivers {
            lines.push(Line::from(Span::styled(
                format!("   {}", driver),
                styles::list_item_style(),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
