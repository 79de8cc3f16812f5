//! Title bar — connection indicator and session progress.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use pokedash_core::store::{ConnectionStatus, Snapshot};

pub fn draw(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let (indicator, label, color) = match snapshot.status {
        ConnectionStatus::Connecting => ("◌", "Connecting".to_string(), Color::Yellow),
        ConnectionStatus::Connected => ("●", "Connected".to_string(), Color::Green),
        ConnectionStatus::Reconnecting { attempt } => (
            "◌",
            format!("Disconnected (retry #{})", attempt),
            Color::Red,
        ),
        ConnectionStatus::GaveUp => ("✕", "Disconnected".to_string(), Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            " Pokémon Gym ",
            Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
        ),
        Span::raw(" "),
        Span::styled(format!("{} {}", indicator, label), Style::default().fg(color)),
    ];

    let game = &snapshot.game;
    if let Some(step) = game.step_number {
        spans.push(Span::styled(
            format!("  step {}", step),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(score) = game.score {
        spans.push(Span::styled(
            format!("  score {:.1}", score),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
