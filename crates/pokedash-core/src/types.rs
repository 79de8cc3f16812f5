//! Core types — GameState, Pokemon, AgentAction, LogLine, LogEntry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Game state ──

/// Map coordinates. Always a full pair on the wire (`[x, y]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coordinates(pub i32, pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hp {
    pub current: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pokemon {
    pub nickname: String,
    pub species: String,
    pub level: u32,
    pub hp: Hp,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryItem {
    pub item: String,
    pub quantity: u32,
}

/// Full snapshot of the remote game session. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub location: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub money: u32,
    /// The evaluator sends a list of badge names, older backends send a count.
    #[serde(default, deserialize_with = "badge_count")]
    pub badges: u32,
    #[serde(default, rename = "pokemons", alias = "team")]
    pub team: Vec<Pokemon>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub dialog: Option<String>,
    #[serde(default)]
    pub collision_map: Option<String>,
    #[serde(default, rename = "screenshot_base64")]
    pub screenshot: String,

    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub rival_name: Option<String>,
    #[serde(default)]
    pub valid_moves: Vec<String>,
    #[serde(default)]
    pub step_number: Option<u64>,
    #[serde(default)]
    pub execution_time: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl GameState {
    /// Placeholder shown before the first payload arrives.
    pub fn placeholder() -> Self {
        Self {
            location: "Loading...".into(),
            coordinates: Coordinates(0, 0),
            money: 0,
            badges: 0,
            team: Vec::new(),
            inventory: Vec::new(),
            dialog: None,
            collision_map: None,
            screenshot: String::new(),
            player_name: None,
            rival_name: None,
            valid_moves: Vec::new(),
            step_number: None,
            execution_time: None,
            score: None,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BadgesWire {
    Count(u32),
    Names(Vec<String>),
}

fn badge_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<BadgesWire>::deserialize(deserializer)? {
        Some(BadgesWire::Count(n)) => n,
        Some(BadgesWire::Names(names)) => names.len() as u32,
        None => 0,
    })
}

// ── Agent actions ──

/// What the agent did. Unknown kinds keep their raw details for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    PressKey { button: String },
    Wait { frames: u64 },
    Other { kind: String, details: Value },
}

impl ActionKind {
    /// Classify a `type` + `details` pair. A known kind whose details lack the
    /// expected field falls back to `Other` so the raw payload is still shown.
    pub fn from_parts(kind: &str, details: Value) -> Self {
        match kind {
            "press_key" => {
                if let Some(button) = details.get("button").and_then(|v| v.as_str()) {
                    return ActionKind::PressKey {
                        button: button.to_string(),
                    };
                }
            }
            "wait" => {
                if let Some(frames) = details.get("frames").and_then(|v| v.as_u64()) {
                    return ActionKind::Wait { frames };
                }
            }
            _ => {}
        }
        ActionKind::Other {
            kind: kind.to_string(),
            details,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ActionKind::PressKey { .. } => "press_key",
            ActionKind::Wait { .. } => "wait",
            ActionKind::Other { kind, .. } => kind,
        }
    }
}

/// Wire shape of an action. Both `type` and `details` are required; anything
/// else is not an action.
#[derive(Debug, Deserialize)]
pub struct ActionWire {
    #[serde(rename = "type")]
    pub kind: String,
    pub details: Value,
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentAction {
    pub kind: ActionKind,
    pub reasoning: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AgentAction {
    pub fn from_wire(wire: ActionWire, received_at: DateTime<Utc>) -> Self {
        let timestamp = wire
            .timestamp
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(received_at);
        let reasoning = wire.reasoning.filter(|r| !r.trim().is_empty());
        Self {
            kind: ActionKind::from_parts(&wire.kind, wire.details),
            reasoning,
            timestamp,
        }
    }
}

// ── Log lines ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Thinking,
    Action,
    Error,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogKind::Thinking => write!(f, "thinking"),
            LogKind::Action => write!(f, "action"),
            LogKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub kind: LogKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogLine {
    pub fn now(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One row of the action log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Action(AgentAction),
    Line(LogLine),
}

impl LogEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LogEntry::Action(a) => a.timestamp,
            LogEntry::Line(l) => l.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_game_state_evaluator_shape() {
        let state: GameState = serde_json::from_value(json!({
            "location": "PALLET TOWN",
            "coordinates": [12, 7],
            "money": 3000,
            "badges": ["BOULDER", "CASCADE"],
            "pokemons": [
                {"nickname": "SPARKY", "species": "Pikachu", "level": 12, "hp": {"current": 30, "max": 35}}
            ],
            "inventory": [{"item": "POTION", "quantity": 2}],
            "dialog": null,
            "screenshot_base64": "abc",
            "step_number": 4
        }))
        .unwrap();

        assert_eq!(state.coordinates, Coordinates(12, 7));
        assert_eq!(state.badges, 2);
        assert_eq!(state.team.len(), 1);
        assert_eq!(state.team[0].hp.max, 35);
        assert_eq!(state.inventory[0].item, "POTION");
        assert_eq!(state.screenshot, "abc");
        assert_eq!(state.step_number, Some(4));
    }

    #[test]
    fn test_game_state_team_alias_and_badge_count() {
        let state: GameState = serde_json::from_value(json!({
            "location": "ROUTE 1",
            "coordinates": [1, 2],
            "badges": 3,
            "team": []
        }))
        .unwrap();
        assert_eq!(state.badges, 3);
        assert!(state.team.is_empty());
        assert_eq!(state.money, 0);
    }

    #[test]
    fn test_game_state_requires_full_coordinates() {
        let missing = serde_json::from_value::<GameState>(json!({"location": "X"}));
        assert!(missing.is_err());

        let partial = serde_json::from_value::<GameState>(json!({"coordinates": [4]}));
        assert!(partial.is_err());
    }

    #[test]
    fn test_action_kind_classification() {
        assert_eq!(
            ActionKind::from_parts("press_key", json!({"button": "A"})),
            ActionKind::PressKey {
                button: "A".into()
            }
        );
        assert_eq!(
            ActionKind::from_parts("wait", json!({"frames": 30})),
            ActionKind::Wait { frames: 30 }
        );
        // Known kind, missing field
        let odd = ActionKind::from_parts("press_key", json!({"button": null, "frames": null}));
        assert_eq!(odd.name(), "press_key");
        assert!(matches!(odd, ActionKind::Other { .. }));
    }

    #[test]
    fn test_action_timestamp_fallback() {
        let received = Utc::now();
        let wire: ActionWire = serde_json::from_value(json!({
            "type": "wait",
            "details": {"frames": 5},
            "reasoning": "   "
        }))
        .unwrap();
        let action = AgentAction::from_wire(wire, received);
        assert_eq!(action.timestamp, received);
        assert!(action.reasoning.is_none());

        let wire: ActionWire = serde_json::from_value(json!({
            "type": "wait",
            "details": {"frames": 5},
            "timestamp": 1_700_000_000_000i64
        }))
        .unwrap();
        let action = AgentAction::from_wire(wire, received);
        assert_eq!(action.timestamp.timestamp_millis(), 1_700_000_000_000);
    }
}
