//! Error banner — shown while the store carries an error string.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn draw(frame: &mut Frame, error: &str, area: Rect) {
    let banner = Paragraph::new(format!(" ⚠ {} ", error))
        .style(Style::default().fg(Color::LightRed).bg(Color::Rgb(60, 0, 0)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, area);
}
