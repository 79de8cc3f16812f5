//! TUI layout compositing — assembles all UI panels.

mod banner;
mod header;
mod log;
pub mod screen;
mod status;

use ratatui::prelude::*;

use crate::app::App;

/// Render the full TUI layout.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let snapshot = &app.snapshot;

    // ┌──────────────────────────────────┐
    // │ Header                           │
    // │ Error banner (only when set)     │
    // ├────────────┬─────────────────────┤
    // │ Agent log  │     Game screen     │
    // │            │                     │
    // ├────────────┴─────────────────────┤
    // │ Status (team grid + stats)       │
    // └──────────────────────────────────┘

    let banner_height = u16::from(snapshot.error.is_some());

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                            // header
            Constraint::Length(banner_height),                // banner
            Constraint::Min(10),                              // content
            Constraint::Length(status::height(&snapshot.game)), // status
        ])
        .split(area);

    header::draw(frame, snapshot, main_layout[0]);

    if let Some(error) = &snapshot.error {
        banner::draw(frame, error, main_layout[1]);
    }

    // Content: Log | Screen
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // log
            Constraint::Percentage(60), // screen
        ])
        .split(main_layout[2]);

    log::draw(frame, app, content_layout[0]);
    screen::draw(frame, app, content_layout[1]);
    status::draw(frame, &snapshot.game, main_layout[3]);
}
