//! Drivers tab - roster with detail panel, race chart and box plot.
//!
//! The chart panels also serve the Teams tab; both feed adapter output from
//! `crate::charts` into ratatui's `Chart` and `Canvas` widgets.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points, Rectangle},
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState,
    },
    Frame,
};

use crate::app::{App, AppState, DetailView, Focus};
use crate::charts::{BandScale, BoxPlotData, LineChartData, LinearScale};
use crate::ui::styles;
use crate::utils::{format_date, format_optional, format_points};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_driver_list(frame, app, chunks[0]);
    render_driver_detail(frame, app, chunks[1]);
}

fn render_driver_list(frame: &mut Frame, app: &App, area: Rect) {
    let drivers = app.filtered_drivers();
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("No"),
        Cell::from("Driver"),
        Cell::from("Team"),
        Cell::from("Pts"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = drivers
        .iter()
        .enumerate()
        .map(|(i, driver)| {
            let style = if i == app.driver_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let marker = if app.compare_selection == Some(i) { "◆ " } else { "" };
            Row::new([
                Cell::from(
                    driver
                        .driver_number
                        .map(|n| n.to_string())
                        .unwrap_or_default(),
                ),
                Cell::from(format!("{}{}", marker, driver.full_name())),
                Cell::from(driver.team.clone().unwrap_or_default()),
                Cell::from(format!("{:>5}", format_points(driver.points))),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Percentage(48),
        Constraint::Percentage(32),
        Constraint::Length(6),
    ];

    let title = if matches!(app.state, AppState::Searching) {
        format!(" Drivers - search: {}▌ ", app.search_query)
    } else if app.search_query.is_empty() {
        format!(" Drivers ({}) - [/] search [c]ompare ", drivers.len())
    } else {
        format!(" Drivers ({}) - filter: {} ", drivers.len(), app.search_query)
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.driver_selection));
    frame.render_stateful_widget(table, area, &mut state);

    if let Some(ref error) = app.drivers_error {
        render_error_overlay(frame, area, error);
    }
}

fn render_driver_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let primary = app
        .driver_detail
        .as_ref()
        .map(|d| d.full_name())
        .unwrap_or_else(|| "Driver".to_string());
    let compare_name = app.driver_name_at(app.compare_selection);

    match app.detail_view {
        DetailView::Stats => render_stats(frame, app, area, focused),
        DetailView::RaceChart => {
            let mut series: Vec<(&str, &[crate::models::RaceResult])> =
                vec![(primary.as_str(), &app.driver_races)];
            if let Some(ref name) = compare_name {
                series.push((name.as_str(), &app.compare_races));
            }
            match crate::charts::line_chart_data(&series) {
                Some(data) => render_race_chart(frame, area, &data, focused),
                None => render_placeholder(frame, app, area, focused, "No race data yet"),
            }
        }
        DetailView::BoxPlot => {
            let mut series: Vec<(&str, &[crate::models::SeasonBoxPlot])> =
                vec![(primary.as_str(), &app.driver_box_plots)];
            if let Some(ref name) = compare_name {
                series.push((name.as_str(), &app.compare_box_plots));
            }
            match crate::charts::box_plot_data(&series) {
                Some(data) => render_box_plot(frame, area, &data, focused),
                None => render_placeholder(frame, app, area, focused, "No season data yet"),
            }
        }
    }
}

fn render_placeholder(frame: &mut Frame, app: &App, area: Rect, focused: bool, message: &str) {
    let text = if app.driver_detail_loading {
        " Loading...".to_string()
    } else if let Some(ref error) = app.driver_detail_error {
        format!(" {}", error)
    } else {
        format!(" {}", message)
    };
    let style = if app.driver_detail_error.is_some() {
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

fn detail_title(app: &App) -> String {
    let name = app
        .driver_detail
        .as_ref()
        .map(|d| d.full_name())
        .unwrap_or_else(|| "Driver".to_string());
    format!(" {} - [s]tats [r]aces [b]ox plot ", name)
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect, focused: bool) {
    let block = Block::default()
        .title(detail_title(app))
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let detail = match app.driver_detail {
        Some(ref d) => d,
        None => {
            render_placeholder(frame, app, area, focused, "Select a driver");
            return;
        }
    };

    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {:<22}", label), styles::muted_style()),
            Span::styled(value, styles::list_item_style()),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(format!(" {}", detail.full_name()), styles::title_style())),
        Line::from(""),
        stat(
            "Born",
            detail
                .date_of_birth
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| "-".to_string()),
        ),
        stat("Nationality", format_optional(&detail.place_of_birth, "-")),
        stat("Team", format_optional(&detail.current_team, "-")),
        Line::from(""),
        Line::from(Span::styled(" Career", styles::highlight_style())),
        stat("Grands Prix", fmt_count(detail.grand_prix_entered)),
        stat("Championships", fmt_count(detail.world_championships)),
        stat("Wins", fmt_count(detail.career_wins)),
        stat("Podiums", fmt_count(detail.career_podiums)),
        stat("Pole positions", fmt_count(detail.career_poles)),
        stat("Points", format_points(detail.career_points)),
        stat("Best grid position", fmt_count(detail.best_grid_position)),
        Line::from(""),
        Line::from(Span::styled(" This season", styles::highlight_style())),
        stat("Wins", fmt_count(detail.current_season_wins)),
        stat("Podiums", fmt_count(detail.current_season_podiums)),
        stat("Poles", fmt_count(detail.current_season_poles)),
        stat("Points", format_points(detail.current_season_points)),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn fmt_count(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn render_error_overlay(frame: &mut Frame, area: Rect, error: &str) {
    // One-line inline error at the bottom of the panel
    if area.height < 3 {
        return;
    }
    let line_area = Rect::new(area.x + 1, area.y + area.height - 2, area.width.saturating_sub(2), 1);
    let paragraph = Paragraph::new(Line::from(format!(" {}", error))).style(styles::error_style());
    frame.render_widget(paragraph, line_area);
}

// ============================================================================
// Shared chart panels (also used by the Teams tab)
// ============================================================================

/// Race-by-race line chart. Positions are plotted inverted so P1 sits at
/// the top, matching how race charts are usually read.
pub fn render_race_chart(frame: &mut Frame, area: Rect, data: &LineChartData, focused: bool) {
    let [y0, y1] = data.y_bounds;
    let flip = |points: &[(f64, f64)]| -> Vec<(f64, f64)> {
        points.iter().map(|(x, y)| (*x, y0 + y1 - *y)).collect()
    };

    let mut flipped: Vec<(String, Vec<(f64, f64)>, Vec<(f64, f64)>)> = Vec::new();
    for series in &data.series {
        flipped.push((series.label.clone(), flip(&series.result), flip(&series.grid)));
    }

    let mut datasets = Vec::new();
    for (i, (label, result, grid)) in flipped.iter().enumerate() {
        let (result_style, grid_style) = if i == 0 {
            (styles::result_line_style(), styles::grid_line_style())
        } else {
            (styles::compare_line_style(), styles::muted_style())
        };
        datasets.push(
            Dataset::default()
                .name(format!("{} result", label))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(result_style)
                .data(result),
        );
        datasets.push(
            Dataset::default()
                .name(format!("{} grid", label))
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(grid_style)
                .data(grid),
        );
    }

    // Axis labels stay in position space even though the data is flipped
    let y_top = format!("P{}", 1);
    let y_bottom = format!("P{}", (y1 - 1.0).max(1.0) as i64);
    let x_first = format!("R{}", (data.x_bounds[0] + 0.5) as i64);
    let x_last = format!("R{}", (data.x_bounds[1] - 0.5) as i64);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Grid vs. finish by round ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .x_axis(
            Axis::default()
                .bounds(data.x_bounds)
                .labels([x_first, x_last])
                .style(styles::muted_style()),
        )
        .y_axis(
            Axis::default()
                .bounds([y0, y1])
                .labels([y_bottom, y_top])
                .style(styles::muted_style()),
        );

    frame.render_widget(chart, area);
}

/// Season box plots drawn on a canvas: whisker, interquartile box, median
/// tick and outlier points per glyph, paired boxes offset around each
/// season's center.
pub fn render_box_plot(frame: &mut Frame, area: Rect, data: &BoxPlotData, focused: bool) {
    let band = BandScale::new(data.seasons.clone(), [0.0, 100.0], 0.4);
    // Inverted range puts the best (lowest) position at the top
    let [lo, hi] = data.value_bounds;
    let value_scale = LinearScale::new([lo, hi], [92.0, 8.0]);

    let glyphs = data.glyphs.clone();
    let seasons = data.seasons.clone();
    let labels = data.labels.clone();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" Finishing positions by season ({}) ", labels.join(" vs ")))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(move |ctx| {
            let bandwidth = band.bandwidth();
            let half_box = (bandwidth * 0.35).min(6.0);

            for glyph in &glyphs {
                let center = match band.center(&glyph.season) {
                    Some(c) => c + glyph.offset * bandwidth,
                    None => continue,
                };
                let color = if glyph.series == 0 {
                    styles::PRIMARY
                } else {
                    styles::COMPARE
                };

                let y_min = value_scale.map(glyph.min);
                let y_max = value_scale.map(glyph.max);
                let y_q1 = value_scale.map(glyph.first_quartile);
                let y_q3 = value_scale.map(glyph.third_quartile);
                let y_med = value_scale.map(glyph.median);

                // Whisker spanning min..max
                ctx.draw(&CanvasLine {
                    x1: center,
                    y1: y_min,
                    x2: center,
                    y2: y_max,
                    color,
                });
                // Interquartile box
                ctx.draw(&Rectangle {
                    x: center - half_box,
                    y: y_q3.min(y_q1),
                    width: half_box * 2.0,
                    height: (y_q1 - y_q3).abs(),
                    color,
                });
                // Median tick
                ctx.draw(&CanvasLine {
                    x1: center - half_box,
                    y1: y_med,
                    x2: center + half_box,
                    y2: y_med,
                    color,
                });
                // Outliers beyond the quartiles
                let points: Vec<(f64, f64)> = glyph
                    .outliers
                    .iter()
                    .map(|v| (center, value_scale.map(*v)))
                    .collect();
                ctx.draw(&Points {
                    coords: &points,
                    color: styles::ACCENT,
                });
            }

            // Season labels along the bottom
            for season in &seasons {
                if let Some(center) = band.center(season) {
                    ctx.print(
                        center - 2.0,
                        2.0,
                        Line::styled(season.clone(), styles::muted_style()),
                    );
                }
            }
        });

    frame.render_widget(canvas, area);
}
