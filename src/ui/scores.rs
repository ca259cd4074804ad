//! Scores view rendering.
//!
//! Three gauges (past average, current, predicted), the headline score with
//! its trend, and a sparkline of the scores polled this session.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::animate::AnimatedValue;
use crate::app::App;
use crate::data::{percent_change, ScoreBand, Trend};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the Scores view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::vertical([
        Constraint::Length(5), // Gauges
        Constraint::Min(4),    // Trend
        Constraint::Length(3), // Sparkline
    ])
    .split(area);

    render_gauges(frame, app, rows[0]);
    render_trend(frame, app, rows[1]);
    render_sparkline(frame, app, rows[2]);
}

fn render_gauges(frame: &mut Frame, app: &App, area: Rect) {
    let prediction = &app.shown.snapshot.prediction;
    let cols = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(area);

    let past_title = format!(" Past {}h Avg ", app.history_hours);
    let past_status = match app.past_average {
        Some(avg) => ScoreBand::classify(avg).label().to_string(),
        None => "no history".to_string(),
    };

    render_gauge(frame, app, cols[0], &past_title, &app.gauges.past_average, &past_status);
    render_gauge(
        frame,
        app,
        cols[1],
        " Current ",
        &app.gauges.current,
        &prediction.current_health.status,
    );
    render_gauge(
        frame,
        app,
        cols[2],
        " Predicted (30m) ",
        &app.gauges.predicted,
        prediction.predicted_status(),
    );
}

fn render_gauge(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    value: &AnimatedValue,
    status: &str,
) {
    let shown = value.displayed();
    // Color follows where the value is heading, not the frame in between
    let band = ScoreBand::classify(value.target());

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let ratio = if value.max() > 0.0 {
        (shown / value.max()).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(app.theme.band_color(band)))
        .ratio(ratio)
        .label(Span::styled(
            format!("{:.0} · {}", shown, status),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(gauge, area);
}

fn render_trend(frame: &mut Frame, app: &App, area: Rect) {
    let prediction = &app.shown.snapshot.prediction;
    let current = prediction.current_health.score;
    let change = prediction.change();
    let trend = Trend::classify(change);
    let band = ScoreBand::classify(current);

    let trend_style = match trend {
        Trend::RapidlyImproving | Trend::Improving => Style::default().fg(app.theme.excellent),
        Trend::Stable => Style::default().fg(app.theme.highlight),
        Trend::Declining => Style::default().fg(app.theme.warning),
        Trend::RapidlyDeclining => Style::default()
            .fg(app.theme.critical)
            .add_modifier(Modifier::BOLD),
    };

    let percent = percent_change(current, prediction.predicted_score())
        .map(|p| format!(" ({:+.1}%)", p))
        .unwrap_or_default();

    let mut lines = vec![
        Line::from(vec![
            Span::raw(" Health score "),
            Span::styled(
                format!("{:.0}", app.gauges.score_number.displayed()),
                app.theme.band_style(band).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" / 100  "),
            Span::styled(
                format!("{} ({})", band.label(), band.range_label()),
                app.theme.band_style(band),
            ),
        ]),
        Line::from(vec![
            Span::raw(" Trend        "),
            Span::styled(format!("{} {}", trend.arrow(), trend.label()), trend_style),
            Span::raw(format!("  {:+.0} pts{}", change, percent)),
        ]),
    ];

    if let Some(delta) = app.history.last_change() {
        lines.push(Line::from(vec![
            Span::raw(" Since last   "),
            Span::styled(
                format!("{:+.0} pts", delta),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]));
    }

    let legend: Vec<Span> = [
        ScoreBand::Excellent,
        ScoreBand::Good,
        ScoreBand::Fair,
        ScoreBand::Critical,
    ]
    .iter()
    .flat_map(|b| {
        [
            Span::styled(" ■ ", app.theme.band_style(*b)),
            Span::raw(format!("{} {} ", b.label(), b.range_label())),
        ]
    })
    .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(legend).style(Style::default().add_modifier(Modifier::DIM)));

    let block = Block::default()
        .title(" Trend ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_sparkline(frame: &mut Frame, app: &App, area: Rect) {
    let levels = app.history.sparkline();
    let content = if levels.is_empty() {
        Line::from(Span::styled(
            " collecting live scores...",
            Style::default().add_modifier(Modifier::DIM),
        ))
    } else {
        // Keep the most recent values that fit inside the border
        let width = area.width.saturating_sub(3) as usize;
        let skip = levels.len().saturating_sub(width);
        let spark: String = levels[skip..]
            .iter()
            .map(|&l| SPARKLINE_CHARS[l as usize])
            .collect();
        Line::from(Span::styled(
            format!(" {}", spark),
            Style::default().fg(app.theme.highlight),
        ))
    };

    let block = Block::default()
        .title(format!(" Session ({} polls) ", app.history.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(content).block(block), area);
}
