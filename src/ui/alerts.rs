//! Alerts view rendering.
//!
//! Active alerts (most severe first), model/profile status, and the
//! emergency notification history.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{AlertSeverity, Notification};

/// Render the Alerts view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let bottom = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    render_alerts(frame, app, rows[0]);
    render_status(frame, app, bottom[0]);
    render_notifications(frame, app, bottom[1]);
}

fn severity_label(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::High => "HIGH",
        AlertSeverity::Medium => "MED",
        AlertSeverity::Low => "LOW",
    }
}

fn panel(app: &App, title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let alerts = &app.shown.snapshot.alerts;
    let title = format!(" Alerts ({}) ", alerts.len());

    if alerts.is_empty() {
        let text = Paragraph::new(Line::from(Span::styled(
            " No active alerts",
            Style::default().fg(app.theme.excellent),
        )))
        .block(panel(app, title));
        frame.render_widget(text, area);
        return;
    }

    let header = Row::new(vec!["Sev", "Type", "Message", "When"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = alerts
        .iter()
        .map(|a| {
            Row::new(vec![
                Cell::from(severity_label(a.severity)).style(app.theme.severity_style(a.severity)),
                Cell::from(a.kind.clone()),
                Cell::from(a.message.clone()),
                Cell::from(a.timestamp.clone().unwrap_or_default())
                    .style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(14),
        Constraint::Min(20),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(app, title));
    frame.render_widget(table, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = &app.shown.snapshot.status;

    let lines: Vec<Line> = if status.is_empty() {
        vec![Line::from(Span::styled(
            " unavailable",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        status
            .iter()
            .map(|(key, value)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {}: ", key),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value.clone()),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines)
        .block(panel(app, " Model Status ".to_string()))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// One-line summary of who answered an emergency.
fn responders(n: &Notification) -> String {
    let guardian = n.responding_guardian.as_deref().unwrap_or("no guardian yet");
    let hospital = n.accepting_hospital.as_deref().unwrap_or("no hospital yet");
    format!(
        "{} | {} ({} contacted)",
        guardian, hospital, n.hospitals_contacted
    )
}

fn render_notifications(frame: &mut Frame, app: &App, area: Rect) {
    let notifications = &app.shown.snapshot.notifications;
    let title = format!(" Emergencies ({}) ", notifications.len());

    if notifications.is_empty() {
        let text = Paragraph::new(Line::from(Span::styled(
            " No emergency notifications",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(panel(app, title));
        frame.render_widget(text, area);
        return;
    }

    let header = Row::new(vec!["When", "Status", "Score", "Responders"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = notifications
        .iter()
        .map(|n| {
            let score = match (n.current_score, n.predicted_score) {
                (Some(c), Some(p)) => format!("{:.0}→{:.0}", c, p),
                (Some(c), None) => format!("{:.0}", c),
                _ => "-".to_string(),
            };
            Row::new(vec![
                Cell::from(n.timestamp.clone().unwrap_or_default()),
                Cell::from(n.status.clone()),
                Cell::from(score),
                Cell::from(responders(n)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(app, title));
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responders_summary() {
        let n = Notification {
            status: "resolved".to_string(),
            responding_guardian: Some("Asha".to_string()),
            accepting_hospital: None,
            hospitals_contacted: 3,
            ..Default::default()
        };
        assert_eq!(responders(&n), "Asha | no hospital yet (3 contacted)");
    }
}
