//! Vitals view rendering.
//!
//! Left: each vital against its reference range. Right: the radar panel,
//! drawn as one normalized bar per axis.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::{radar_axes, ScoreBand, VitalKind, VitalReading};

/// Render the Vitals view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let empty = VitalReading::default();
    let vitals = app.shown.snapshot.vitals().unwrap_or(&empty);

    render_table(frame, app, vitals, cols[0]);
    render_radar(frame, app, vitals, cols[1]);
}

fn format_value(kind: VitalKind, value: f64) -> String {
    match kind {
        VitalKind::Temperature => format!("{:.1} {}", value, kind.unit()),
        _ => format!("{:.0} {}", value, kind.unit()),
    }
}

fn render_table(frame: &mut Frame, app: &App, vitals: &VitalReading, area: Rect) {
    let header = Row::new(vec!["Vital", "Value", "Normal", "Status"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = VitalKind::ALL
        .iter()
        .map(|&kind| match kind.value(vitals) {
            Some(value) => {
                let status = kind.classify(value);
                let style = app.theme.vital_style(status);
                Row::new(vec![
                    Cell::from(kind.label()),
                    Cell::from(format_value(kind, value)).style(style),
                    Cell::from(kind.normal_range()),
                    Cell::from(status.symbol()).style(style),
                ])
            }
            None => Row::new(vec![
                Cell::from(kind.label()),
                Cell::from("-"),
                Cell::from(kind.normal_range()),
                Cell::from("N/A"),
            ])
            .style(Style::default().add_modifier(Modifier::DIM)),
        })
        .collect();

    let widths = [
        Constraint::Length(17),
        Constraint::Length(12),
        Constraint::Min(14),
        Constraint::Length(6),
    ];

    let title = match vitals.timestamp.as_deref() {
        Some(ts) => format!(" Vitals @ {} ", ts),
        None => " Vitals ".to_string(),
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}

/// A horizontal bar of `width` cells filled to `percent`.
fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn render_radar(frame: &mut Frame, app: &App, vitals: &VitalReading, area: Rect) {
    let bar_width = (area.width as usize).saturating_sub(26).clamp(4, 30);

    let lines: Vec<Line> = radar_axes(vitals)
        .into_iter()
        .map(|axis| {
            let color = if axis.label == "Score" {
                app.theme.band_color(ScoreBand::classify(axis.actual))
            } else {
                app.theme.highlight
            };
            Line::from(vec![
                Span::raw(format!(" {:<10} ", axis.label)),
                Span::styled(bar(axis.normalized, bar_width), Style::default().fg(color)),
                Span::styled(
                    format!(" {:.0}{}", axis.actual, axis.unit),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Profile (normalized) ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar(0.0, 4), "░░░░");
        assert_eq!(bar(50.0, 4), "██░░");
        assert_eq!(bar(150.0, 4), "████");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(VitalKind::Temperature, 36.84), "36.8 °C");
        assert_eq!(format_value(VitalKind::HeartRate, 82.0), "82 BPM");
    }
}
