//! Betting tab - groups, per-race bets and evaluated results.
//!
//! The whole tab sits behind the profile probe; an unauthorized session is
//! routed to the login overlay before any of these views show data.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, BetForm, BettingView, BET_FORM_FIELDS};
use crate::ui::styles;
use crate::utils::{format_date, format_optional};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.betting_view {
        BettingView::Groups => render_groups(frame, app, area),
        BettingView::GroupDetail => render_group_detail(frame, app, area),
        BettingView::Races => render_races(frame, app, area),
        BettingView::BetForm => render_bet_form(frame, app, area),
        BettingView::BetShow => render_bet_show(frame, app, area),
        BettingView::Evaluated => render_evaluated(frame, app, area),
        BettingView::CreateGroup => render_create_group(frame, app, area),
        BettingView::JoinGroup => render_join_group(frame, app, area),
    }
}

fn bordered(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
}

fn render_inline_error(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref error) = app.betting_error {
        if area.height < 3 {
            return;
        }
        let line_area = Rect::new(
            area.x + 1,
            area.y + area.height - 2,
            area.width.saturating_sub(2),
            1,
        );
        let paragraph =
            Paragraph::new(Line::from(format!(" {}", error))).style(styles::error_style());
        frame.render_widget(paragraph, line_area);
    }
}

fn render_groups(frame: &mut Frame, app: &App, area: Rect) {
    let groups = app.visible_groups();

    let header = Row::new([
        Cell::from("Group"),
        Cell::from("Owner"),
        Cell::from("Members"),
        Cell::from("Created"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let style = if i == app.group_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new([
                Cell::from(group.group_name.clone()),
                Cell::from(group.owner.clone().unwrap_or_default()),
                Cell::from(group.members.len().to_string()),
                Cell::from(
                    group
                        .created_at
                        .as_deref()
                        .map(format_date)
                        .unwrap_or_default(),
                ),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(35),
        Constraint::Percentage(25),
        Constraint::Length(8),
        Constraint::Percentage(25),
    ];

    let loading = if app.betting_loading { " (loading...)" } else { "" };
    let title = format!(
        " My Groups ({}){} - [n]ew [j]oin [l]eave [Enter] open ",
        groups.len(),
        loading
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(title))
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.group_selection));
    frame.render_stateful_widget(table, area, &mut state);
    render_inline_error(frame, app, area);
}

fn render_group_detail(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.group_info {
        Some(ref info) => format!(" {} - [r]aces [e]valuated [Esc] back ", info.group_name),
        None => " Group - loading... ".to_string(),
    };
    let block = bordered(title);

    let mut lines = Vec::new();
    if let Some(ref info) = app.group_info {
        lines.push(Line::from(vec![
            Span::styled(" Owner: ", styles::muted_style()),
            Span::styled(format_optional(&info.owner, "-"), styles::list_item_style()),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Leaderboard", styles::highlight_style())));

        let mut stats = info.bet_stats.clone();
        stats.sort_by(|a, b| b.points.cmp(&a.points));
        for (i, stat) in stats.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:>2}. ", i + 1), styles::muted_style()),
                Span::styled(format!("{:<24}", stat.user), styles::list_item_style()),
                Span::styled(format!("{:>4} pts", stat.points), styles::highlight_style()),
            ]));
        }
    } else {
        lines.push(Line::from(Span::styled(" Loading...", styles::muted_style())));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
    render_inline_error(frame, app, area);
}

fn render_races(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Circuit"),
        Cell::from("Season"),
        Cell::from("Date"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .races_to_bet
        .iter()
        .enumerate()
        .map(|(i, race)| {
            let style = if i == app.race_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new([
                Cell::from(race.circuit.clone().unwrap_or_else(|| race.id.clone())),
                Cell::from(race.season.clone().unwrap_or_default()),
                Cell::from(race.date.as_deref().map(format_date).unwrap_or_default()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(50),
        Constraint::Length(8),
        Constraint::Percentage(30),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(
            " Races open for betting - [p]lace [v]iew [u]pdate [x] delete [Esc] back ".to_string(),
        ))
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.race_selection));
    frame.render_stateful_widget(table, area, &mut state);
    render_inline_error(frame, app, area);
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::styled(format!(" {:<14}[", label), styles::muted_style()),
        Span::styled(format!("{:<24}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_bet_form(frame: &mut Frame, app: &App, area: Rect) {
    let form: &BetForm = &app.bet_form;
    let action = if form.editing { "Update" } else { "Place" };
    let block = bordered(format!(
        " {} bet for {} - [Tab] next field [Enter] submit [Esc] cancel ",
        action, form.race_id
    ));

    debug_assert_eq!(BET_FORM_FIELDS, 6);
    let lines = vec![
        Line::from(""),
        field_line("Winner", &form.top_3[0], form.focus == 0),
        field_line("Second", &form.top_3[1], form.focus == 1),
        field_line("Third", &form.top_3[2], form.focus == 2),
        Line::from(""),
        field_line("Last 5", &form.last_5, form.focus == 3),
        field_line("Last 10", &form.last_10, form.focus == 4),
        field_line("Fastest lap", &form.fastest_lap, form.focus == 5),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
    render_inline_error(frame, app, area);
}

fn render_bet_show(frame: &mut Frame, app: &App, area: Rect) {
    let block = bordered(" Your bet - [u]pdate [x] delete [Esc] back ".to_string());

    let lines = match app.current_bet {
        Some(ref bet) => vec![
            Line::from(Span::styled(
                format!(" Race: {}", bet.race.as_deref().unwrap_or("-")),
                styles::title_style(),
            )),
            Line::from(""),
            Line::from(format!(" Top 3:       {}", bet.bet_top_3.join(", "))),
            Line::from(format!(" Last 5:      {}", bet.bet_last_5)),
            Line::from(format!(" Last 10:     {}", bet.bet_last_10)),
            Line::from(format!(" Fastest lap: {}", bet.bet_fastest_lap)),
        ],
        None => vec![Line::from(Span::styled(" Loading...", styles::muted_style()))],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
    render_inline_error(frame, app, area);
}

fn render_evaluated(frame: &mut Frame, app: &App, area: Rect) {
    let block = bordered(" Evaluated bets - [Esc] back ".to_string());

    let mut lines = Vec::new();
    match app.evaluated {
        Some(ref data) if data.bets.is_empty() => {
            lines.push(Line::from(Span::styled(
                " No evaluated bets yet.",
                styles::muted_style(),
            )));
        }
        Some(ref data) => {
            lines.push(Line::from(Span::styled(" Standings", styles::highlight_style())));
            for entry in &data.standings {
                lines.push(Line::from(format!(
                    "   {:<24}{:>4} pts",
                    entry.user, entry.points
                )));
            }
            // Group the scored bets by race, newest heading first
            let mut races: Vec<&str> = data.bets.iter().map(|b| b.race.as_str()).collect();
            races.dedup();
            for race in races {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(" {}", race),
                    styles::title_style(),
                )));
                for bet in data.bets.iter().filter(|b| b.race == race) {
                    lines.push(Line::from(format!(
                        "   {:<16} top3: {:<28} FL: {:<12}{:>3} pts",
                        bet.user,
                        bet.bet_top_3.join(", "),
                        bet.bet_fastest_lap,
                        bet.points
                    )));
                }
            }
        }
        None => lines.push(Line::from(Span::styled(" Loading...", styles::muted_style()))),
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
    render_inline_error(frame, app, area);
}

fn render_create_group(frame: &mut Frame, app: &App, area: Rect) {
    let block = bordered(" Create group - [Enter] create [Esc] cancel ".to_string());
    let lines = vec![
        Line::from(""),
        field_line("Group name", &app.group_name_input, true),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
    render_inline_error(frame, app, area);
}

fn render_join_group(frame: &mut Frame, app: &App, area: Rect) {
    let username = app.display_username.clone().unwrap_or_default();

    let header = Row::new([Cell::from("Group"), Cell::from("Owner"), Cell::from("Members")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let style = if i == app.group_selection {
                styles::selected_style()
            } else if group.members.iter().any(|m| m == &username) {
                styles::muted_style()
            } else {
                styles::list_item_style()
            };
            Row::new([
                Cell::from(group.group_name.clone()),
                Cell::from(group.owner.clone().unwrap_or_default()),
                Cell::from(group.members.len().to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(45),
        Constraint::Percentage(30),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(
            " Join a group - [Enter] join [Esc] back ".to_string(),
        ))
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.group_selection));
    frame.render_stateful_widget(table, area, &mut state);
    render_inline_error(frame, app, area);
}
