//! Scrollable action log — agent reasoning, actions, and lifecycle lines.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use pokedash_core::format;
use pokedash_core::types::{AgentAction, LogEntry, LogKind, LogLine};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Agent (↑/↓ scroll, End follow) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.snapshot.log.is_empty() {
        let empty = Paragraph::new("Waiting for agent actions...")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let paragraph = Paragraph::new(lines(&app.snapshot.log)).wrap(Wrap { trim: false });

    // Bottom-anchored: offset 0 shows the newest rows.
    let total = paragraph.line_count(inner.width);
    let max_top = total.saturating_sub(inner.height as usize);
    let top = max_top.saturating_sub(app.log_scroll);

    let paragraph = paragraph.scroll((top.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, inner);
}

/// Display lines for the whole log, oldest first.
pub fn lines(entries: &[LogEntry]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in entries {
        match entry {
            LogEntry::Action(action) => push_action(&mut lines, action),
            LogEntry::Line(line) => lines.push(log_line(line)),
        }
    }
    lines
}

fn push_action(lines: &mut Vec<Line<'static>>, action: &AgentAction) {
    let muted = Style::default().fg(Color::DarkGray);
    let body = Style::default().fg(Color::White);

    if let Some(reasoning) = &action.reasoning {
        lines.push(Line::styled("<thinking>", muted));
        for line in reasoning.lines() {
            lines.push(Line::styled(format!("  {}", line), body));
        }
        lines.push(Line::styled("</thinking>", muted));
    }

    lines.push(Line::from(vec![
        Span::styled(
            format!("[{}] ", format::timestamp(action.timestamp)),
            muted,
        ),
        Span::styled(
            format::action_heading(&action.kind),
            Style::default().fg(Color::Yellow),
        ),
    ]));
    for line in format::action_details(&action.kind).lines() {
        lines.push(Line::styled(format!("  {}", line), body));
    }
    lines.push(Line::raw(""));
}

fn log_line(line: &LogLine) -> Line<'static> {
    let fg = match line.kind {
        LogKind::Thinking => Color::Blue,
        LogKind::Action => Color::Green,
        LogKind::Error => Color::Red,
    };
    Line::from(vec![
        Span::styled(
            format!("[{}] ", format::timestamp(line.timestamp)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(line.message.clone(), Style::default().fg(fg)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pokedash_core::events::DashboardEvent;
    use pokedash_core::store::StateStore;
    use pokedash_core::types::{ActionKind, GameState};
    use serde_json::json;

    use crate::ui::tests::render_to_string;

    fn action(kind: &str, details: serde_json::Value, reasoning: Option<&str>) -> AgentAction {
        AgentAction {
            kind: ActionKind::from_parts(kind, details),
            reasoning: reasoning.map(String::from),
            timestamp: Utc::now(),
        }
    }

    fn app_with(actions: Vec<AgentAction>) -> App {
        let mut store = StateStore::new(50);
        for a in actions {
            store.apply(DashboardEvent::StateUpdate {
                state: GameState::placeholder(),
                action: Some(a),
            });
        }
        App::new(store.snapshot())
    }

    #[test]
    fn test_press_key_renders_button() {
        let app = app_with(vec![action("press_key", json!({"button": "A"}), None)]);
        let screen = render_to_string(60, 10, |f| draw(f, &app, f.area()));
        assert!(screen.contains("Using tool: press_key"));
        assert!(screen.contains("Button: A"));
    }

    #[test]
    fn test_wait_renders_frames() {
        let app = app_with(vec![action("wait", json!({"frames": 30}), None)]);
        let screen = render_to_string(60, 10, |f| draw(f, &app, f.area()));
        assert!(screen.contains("Frames: 30"));
    }

    #[test]
    fn test_reasoning_is_wrapped_in_thinking_markers() {
        let a = action("wait", json!({"frames": 1}), Some("first line\nsecond line"));
        let rendered: Vec<String> = lines(&[LogEntry::Action(a)])
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(rendered[0], "<thinking>");
        assert_eq!(rendered[1], "  first line");
        assert_eq!(rendered[2], "  second line");
        assert_eq!(rendered[3], "</thinking>");
    }

    #[test]
    fn test_follows_newest_entry() {
        let actions = (0..40)
            .map(|i| action("press_key", json!({"button": format!("K{}", i)}), None))
            .collect();
        let app = app_with(actions);
        let screen = render_to_string(60, 12, |f| draw(f, &app, f.area()));
        assert!(screen.contains("Button: K39"));
        assert!(!screen.contains("Button: K0 "));
    }

    #[test]
    fn test_empty_log_placeholder() {
        let app = App::new(StateStore::new(50).snapshot());
        let screen = render_to_string(60, 6, |f| draw(f, &app, f.area()));
        assert!(screen.contains("Waiting for agent actions..."));
    }
}
