//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{AlertSeverity, ScoreBand, VitalStatus};
use crate::source::DataOrigin;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for the Excellent band and normal vitals.
    pub excellent: Color,
    /// Color for the Good band.
    pub good: Color,
    /// Color for the Fair band and warning vitals.
    pub warning: Color,
    /// Color for the Critical band and critical vitals.
    pub critical: Color,
    /// Color for the predicted series and estimated points.
    pub predicted: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            excellent: Color::Green,
            good: Color::LightGreen,
            warning: Color::Yellow,
            critical: Color::Red,
            predicted: Color::Magenta,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            excellent: Color::Green,
            good: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            predicted: Color::Magenta,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a score band.
    pub fn band_color(&self, band: ScoreBand) -> Color {
        match band {
            ScoreBand::Excellent => self.excellent,
            ScoreBand::Good => self.good,
            ScoreBand::Fair => self.warning,
            ScoreBand::Critical => self.critical,
        }
    }

    /// Style for a score band
    pub fn band_style(&self, band: ScoreBand) -> Style {
        let style = Style::default().fg(self.band_color(band));
        if band == ScoreBand::Critical {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Style for a single vital's status
    pub fn vital_style(&self, status: VitalStatus) -> Style {
        match status {
            VitalStatus::Normal => Style::default().fg(self.excellent),
            VitalStatus::Warning => Style::default().fg(self.warning),
            VitalStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    pub fn severity_style(&self, severity: AlertSeverity) -> Style {
        match severity {
            AlertSeverity::Low => Style::default().fg(self.highlight),
            AlertSeverity::Medium => Style::default().fg(self.warning),
            AlertSeverity::High => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Badge style for where the data on screen came from.
    pub fn origin_style(&self, origin: DataOrigin) -> Style {
        let base = Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);
        match origin {
            DataOrigin::Live => base.fg(self.excellent),
            DataOrigin::LastKnown => base.fg(self.warning),
            DataOrigin::Demo => base.fg(self.predicted),
        }
    }
}
