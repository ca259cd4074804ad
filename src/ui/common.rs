//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and the help
//! and emergency confirmation overlays.

use chrono::Utc;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_ago;
use crate::data::ScoreBand;
use crate::source::DataOrigin;

/// Render the header bar with patient overview.
///
/// Displays: band indicator, patient, origin badge, source, refresh state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.shown.snapshot;
    let score = snapshot.prediction.current_health.score;
    let band = ScoreBand::classify(score);

    let mut spans = vec![
        Span::styled(" ● ", app.theme.band_style(band)),
        Span::styled("VITALWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ Patient "),
        Span::styled(
            snapshot.patient_id.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::styled(
            format!(" {} ", app.shown.origin.badge()),
            app.theme.origin_style(app.shown.origin),
        ),
        Span::raw(" │ "),
        Span::styled(
            app.source_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ];

    if app.is_refreshing() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "⟳ refreshing",
            Style::default().fg(app.theme.highlight),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the inline fetch warning, time since last update and the
/// available controls. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "r:refresh e:export !:emergency Tab:switch ?:help q:quit";

    let updated = app
        .state
        .as_ref()
        .and_then(|s| s.last_update)
        .map(|t| {
            let elapsed = (Utc::now() - t).to_std().unwrap_or_default();
            format!("Updated {}", format_ago(elapsed))
        })
        .unwrap_or_else(|| "Waiting for first update".to_string());

    let failure = app.state.as_ref().and_then(|s| match &s.outcome {
        Some(Err(e)) => Some(e.short()),
        _ => None,
    });

    let line = match failure {
        Some(reason) => {
            let fallback = match app.shown.origin {
                DataOrigin::Demo => "showing demo data",
                _ => "showing last known data",
            };
            Line::from(vec![
                Span::styled(
                    format!(" ⚠ {} ", reason),
                    Style::default()
                        .fg(app.theme.warning)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("({}) | {} | {}", fallback, updated, controls),
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ])
        }
        None => Line::from(Span::styled(
            format!(" {} | {}", updated, controls),
            Style::default().add_modifier(Modifier::DIM),
        )),
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Center a `width` x `height` box inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the emergency confirmation dialog.
pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "Trigger emergency?",
            Style::default()
                .fg(app.theme.critical)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Guardians and nearby hospitals for patient {} will be notified.",
            app.shown.snapshot.patient_id
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", app.theme.header),
            Span::raw(" confirm   "),
            Span::styled("n", app.theme.header),
            Span::raw(" cancel"),
        ]),
    ];

    let block = Block::default()
        .title(" Emergency ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.critical));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    let dialog = centered(area, 50, 9);
    frame.render_widget(Clear, dialog);
    frame.render_widget(paragraph, dialog);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  Tab         Next view"),
        Line::from("  1-4         Jump to view"),
        Line::from(""),
        section(" Data"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from(""),
        section(" Actions"),
        Line::from("  !         Trigger emergency"),
        Line::from("  q         Quit"),
        Line::from(""),
        section(" Badges"),
        Line::from("  LIVE        Latest fetch succeeded"),
        Line::from("  LAST KNOWN  Latest fetch failed"),
        Line::from("  DEMO        No data received yet"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_area = centered(area, 42, 24);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &App, draw: fn(&mut Frame, &App, Rect)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 1)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw(frame, app, area)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_header_shows_demo_badge_before_data() {
        let (_tx, source) = ChannelSource::create("P007", "test");
        let app = App::new(Box::new(source));
        let header = rendered(&app, render_header);
        assert!(header.contains("DEMO"));
    }

    #[test]
    fn test_centered_fits_small_area() {
        let area = Rect::new(0, 0, 30, 10);
        let inner = centered(area, 42, 24);
        assert!(inner.width <= 26);
        assert!(inner.height <= 8);
    }
}
