use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Default file written by the export key.
pub const EXPORT_FILE: &str = "vitalwatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Emergency confirmation only accepts an explicit answer
    if app.confirm_emergency {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_emergency(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.confirm_emergency(false),
            _ => {}
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Scores),
        KeyCode::Char('2') => app.set_view(View::Timeline),
        KeyCode::Char('3') => app.set_view(View::Vitals),
        KeyCode::Char('4') => app.set_view(View::Alerts),

        // Refresh now
        KeyCode::Char('r') => app.refresh(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Emergency
        KeyCode::Char('!') => app.request_emergency(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.prev_view(),
        MouseEventKind::ScrollDown => app.next_view(),

        // Tab clicks (row 1, after header)
        MouseEventKind::Down(MouseButton::Left) if mouse.row == 1 => {
            if let Some(view) = tab_at(mouse.column) {
                app.set_view(view);
            }
        }

        _ => {}
    }
}

/// Map a column on the tab bar to the tab drawn there.
fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        // " N:Label " plus the divider
        let width = view.label().len() as u16 + 5;
        if column < start + width {
            return Some(view);
        }
        start += width;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;

    fn app() -> App {
        let (_tx, source) = ChannelSource::create("P001", "test");
        App::new(Box::new(source))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_view_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::Vitals);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Alerts);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::Vitals);
        handle_key_event(&mut app, key(KeyCode::Left));
        assert_eq!(app.current_view, View::Timeline);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);

        // 'q' closes help instead of quitting
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_refresh_sets_status() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('r')));
        assert_eq!(app.get_status_message(), Some("Refreshing..."));
    }

    #[test]
    fn test_tab_hit_testing() {
        assert_eq!(tab_at(0), Some(View::Scores));
        assert_eq!(tab_at(10), Some(View::Scores));
        assert_eq!(tab_at(11), Some(View::Timeline));
        assert_eq!(tab_at(200), None);
    }
}
