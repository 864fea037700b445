use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};
use crate::ui::common::tab_title;

/// Where `e` writes the snapshot.
pub const EXPORT_PATH: &str = "harvestwatch_export.json";

/// Row of the tab bar (below the header).
const TAB_ROW: u16 = 1;

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

    match key.code {
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
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Trends),
        KeyCode::Char('3') => app.set_view(View::Solar),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Pump control
        KeyCode::Char('a') => app.toggle_mode(),
        KeyCode::Char('p') => {
            app.toggle_pump();
        }

        // Poll now
        KeyCode::Char('r') => match app.reload_data() {
            Ok(true) => app.set_status_message("Updated".to_string()),
            Ok(false) => app.set_status_message("No new data".to_string()),
            Err(e) => app.set_status_message(format!("Reload failed: {}", e)),
        },

        KeyCode::Char('?') => app.toggle_help(),

        // Export
        KeyCode::Char('e') => {
            let export_path = Path::new(EXPORT_PATH);
            match app.export_state(export_path) {
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
        MouseEventKind::Down(MouseButton::Left) => {
            if app.show_help {
                app.show_help = false;
                return;
            }
            if mouse.row == TAB_ROW {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
            }
        }
        MouseEventKind::ScrollDown => app.next_view(),
        MouseEventKind::ScrollUp => app.prev_view(),
        _ => {}
    }
}

/// The tab under a column of the tab bar.
///
/// Each tab is its title plus one column of padding on both sides, and tabs
/// are separated by a one-column divider.
fn tab_at(column: u16) -> Option<View> {
    let mut start = 0u16;
    for view in View::ALL {
        let width = tab_title(view).chars().count() as u16 + 2;
        if column < start + width {
            return Some(view);
        }
        start += width + 1;
    }
    None
}
