//! Status panel — team grid plus location, coordinates, money, badges.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use pokedash_core::format;
use pokedash_core::types::{GameState, Pokemon};

pub const TEAM_COLUMNS: usize = 6;
const CELL_HEIGHT: u16 = 2;

fn team_rows(team: &[Pokemon]) -> u16 {
    team.len().div_ceil(TEAM_COLUMNS).max(1) as u16
}

/// Height the panel wants, borders included.
pub fn height(game: &GameState) -> u16 {
    let dialog = u16::from(game.dialog.as_deref().is_some_and(|d| !d.trim().is_empty()));
    team_rows(&game.team) * CELL_HEIGHT + 1 + dialog + 2
}

pub fn draw(frame: &mut Frame, game: &GameState, area: Rect) {
    let block = Block::default()
        .title(" Status ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(team_rows(&game.team) * CELL_HEIGHT), // team grid
            Constraint::Min(1),                                      // info
        ])
        .split(inner);

    draw_team(frame, &game.team, layout[0]);
    draw_info(frame, game, layout[1]);
}

fn draw_team(frame: &mut Frame, team: &[Pokemon], area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CELL_HEIGHT); team_rows(team) as usize])
        .split(area);

    for (row_area, members) in rows.iter().zip(team.chunks(TEAM_COLUMNS)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, TEAM_COLUMNS as u32); TEAM_COLUMNS])
            .split(*row_area);

        for (cell, pokemon) in cells.iter().zip(members) {
            frame.render_widget(Paragraph::new(member_lines(pokemon)), *cell);
        }
    }
}

fn member_lines(pokemon: &Pokemon) -> Vec<Line<'static>> {
    let name = if pokemon.nickname.is_empty() {
        pokemon.species.clone()
    } else {
        pokemon.nickname.clone()
    };
    let hp_color = match format::hp_ratio(&pokemon.hp) {
        r if r > 0.5 => Color::Green,
        r if r > 0.2 => Color::Yellow,
        _ => Color::Red,
    };
    vec![
        Line::from(vec![
            Span::styled(name, Style::default().fg(Color::Cyan)),
            Span::raw(" "),
            Span::styled(format::level(pokemon.level), Style::default().fg(Color::Yellow)),
        ]),
        Line::styled(format::hp_fraction(&pokemon.hp), Style::default().fg(hp_color)),
    ]
}

fn draw_info(frame: &mut Frame, game: &GameState, area: Rect) {
    let label = Style::default().fg(Color::Cyan);
    let stat = Style::default().fg(Color::Yellow);

    let mut lines = vec![Line::from(vec![
        Span::styled("Location: ", label),
        Span::raw(game.location.clone()),
        Span::styled("  Coords: ", label),
        Span::raw(format::coordinates(game.coordinates)),
        Span::styled("  Money: ", stat),
        Span::raw(format::money(game.money)),
        Span::styled("  Badges: ", stat),
        Span::raw(game.badges.to_string()),
    ])];

    if let Some(dialog) = game.dialog.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::from(vec![
            Span::styled("Dialog: ", label),
            Span::styled(dialog.replace('\n', " "), Style::default().italic()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedash_core::types::{Coordinates, Hp};

    use crate::ui::tests::render_to_string;

    fn pokemon(nickname: &str, level: u32, current: u32, max: u32) -> Pokemon {
        Pokemon {
            nickname: nickname.to_string(),
            species: "Pidgey".to_string(),
            level,
            hp: Hp { current, max },
        }
    }

    #[test]
    fn test_coordinates_verbatim() {
        let game = GameState {
            location: "PALLET TOWN".into(),
            coordinates: Coordinates(12, 7),
            money: 3000,
            badges: 2,
            ..GameState::placeholder()
        };
        let out = render_to_string(100, height(&game), |f| draw(f, &game, f.area()));
        assert!(out.contains("(12, 7)"));
        assert!(out.contains("PALLET TOWN"));
        assert!(out.contains("₽3000"));
        assert!(out.contains("Badges: 2"));
    }

    #[test]
    fn test_empty_team_renders() {
        let game = GameState::placeholder();
        assert_eq!(height(&game), 2 + 1 + 2);
        let out = render_to_string(100, height(&game), |f| draw(f, &game, f.area()));
        assert!(out.contains("Location: Loading..."));
        assert!(!out.contains("HP:"));
    }

    #[test]
    fn test_team_grid() {
        let game = GameState {
            team: vec![
                pokemon("SPARKY", 12, 30, 35),
                pokemon("", 4, 2, 15),
                pokemon("BUBBLES", 9, 20, 22),
            ],
            ..GameState::placeholder()
        };
        let out = render_to_string(120, height(&game), |f| draw(f, &game, f.area()));
        assert!(out.contains("SPARKY Lv.12"));
        assert!(out.contains("HP: 30/35"));
        // no nickname falls back to species
        assert!(out.contains("Pidgey Lv.4"));
        assert!(out.contains("BUBBLES Lv.9"));
    }

    #[test]
    fn test_large_team_wraps_rows() {
        let game = GameState {
            team: (0..8).map(|i| pokemon(&format!("P{}", i), 5, 10, 10)).collect(),
            dialog: Some("Welcome!".into()),
            ..GameState::placeholder()
        };
        assert_eq!(height(&game), 2 * 2 + 1 + 1 + 2);
        let out = render_to_string(120, height(&game), |f| draw(f, &game, f.area()));
        assert!(out.contains("P7 Lv.5"));
        assert!(out.contains("Dialog: Welcome!"));
    }
}
