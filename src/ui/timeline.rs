//! Timeline view: two hours of scores, now, and the 30 minute prediction.

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{
    build_timeline, PointKind, TimelinePoint,
    timeline::{PREDICTION_HORIZON_MINUTES, TIMELINE_POINTS, TIMELINE_SPACING_MINUTES},
};

/// Render the Timeline view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.shown.snapshot;
    let points = build_timeline(&snapshot.history, Some(&snapshot.prediction), Utc::now());

    let rows = Layout::vertical([Constraint::Min(8), Constraint::Length(3)]).split(area);

    render_chart(frame, app, &points, rows[0]);
    render_legend(frame, app, &points, rows[1]);
}

fn series(points: &[TimelinePoint], kinds: &[PointKind]) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|p| kinds.contains(&p.kind))
        .map(|p| (p.offset_minutes as f64, p.score))
        .collect()
}

fn render_chart(frame: &mut Frame, app: &App, points: &[TimelinePoint], area: Rect) {
    // Past line runs through now so it joins the prediction segment
    let past = series(
        points,
        &[PointKind::Historical, PointKind::Estimated, PointKind::Current],
    );
    let estimated = series(points, &[PointKind::Estimated]);
    let ahead = series(points, &[PointKind::Current, PointKind::Predicted]);

    let datasets = vec![
        Dataset::default()
            .name("Score")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.highlight))
            .data(&past),
        Dataset::default()
            .name("Estimated")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(app.theme.border))
            .data(&estimated),
        Dataset::default()
            .name("Predicted")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.predicted))
            .data(&ahead),
    ];

    let start = -((TIMELINE_POINTS as i64) * TIMELINE_SPACING_MINUTES) as f64;
    let end = PREDICTION_HORIZON_MINUTES as f64;

    let x_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([start, end])
        .labels(vec![
            Span::raw(format!("{}m", start)),
            Span::raw(format!("{}m", start / 2.0)),
            Span::styled("NOW", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("+{}m", end)),
        ]);

    let y_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([0.0, 100.0])
        .labels(vec![
            Span::raw("0"),
            Span::raw("40"),
            Span::raw("60"),
            Span::raw("80"),
            Span::raw("100"),
        ]);

    let block = Block::default()
        .title(" Score Timeline ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

fn render_legend(frame: &mut Frame, app: &App, points: &[TimelinePoint], area: Rect) {
    let estimated = points
        .iter()
        .filter(|p| p.kind == PointKind::Estimated)
        .count();

    let mut spans = Vec::new();
    for p in points.iter().filter(|p| p.offset_minutes >= -30) {
        let style = match p.kind {
            PointKind::Predicted => Style::default().fg(app.theme.predicted),
            PointKind::Current => Style::default().add_modifier(Modifier::BOLD),
            PointKind::Estimated => Style::default().add_modifier(Modifier::DIM),
            PointKind::Historical => Style::default(),
        };
        spans.push(Span::styled(format!(" {} {:.0} ", p.label(), p.score), style));
        spans.push(Span::raw("│"));
    }
    spans.pop();

    let note = if estimated > 0 {
        format!(" {} of {} past points estimated ", estimated, TIMELINE_POINTS)
    } else {
        " all past points from history ".to_string()
    };

    let block = Block::default()
        .title(note)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo_prediction;

    #[test]
    fn test_series_selects_kinds_in_order() {
        let points = build_timeline(&[], Some(&demo_prediction()), Utc::now());
        let ahead = series(&points, &[PointKind::Current, PointKind::Predicted]);
        assert_eq!(ahead, vec![(0.0, 78.0), (30.0, 75.0)]);

        let estimated = series(&points, &[PointKind::Estimated]);
        assert_eq!(estimated.len(), TIMELINE_POINTS);
        assert_eq!(estimated[0].0, -120.0);
    }
}
