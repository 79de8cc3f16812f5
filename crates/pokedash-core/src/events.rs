//! DashboardEvent — everything the state store can be told, plus the decoder
//! that turns inbound WebSocket text frames into events.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::DashError;
use crate::types::{ActionWire, AgentAction, GameState, LogKind, LogLine};

/// Events sent from the connection tasks to the store actor.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Full state replacement, optionally with the action that produced it.
    StateUpdate {
        state: GameState,
        action: Option<AgentAction>,
    },

    /// Named `gameState` push. Replaces the state like `StateUpdate`, except
    /// that `screenshot: None` keeps the screenshot already held.
    StatePush {
        state: GameState,
        screenshot: Option<String>,
    },

    /// `/initialize` answered with the starting state.
    Initialized(GameState),

    /// `/initialize` failed. Carries the reason for the log.
    InitFailed(String),

    /// A screenshot pushed separately from the state.
    Screenshot(String),

    /// Free-form agent log line.
    Log(LogLine),

    /// Socket opened.
    Connected,

    /// Socket closed or connect failed; `attempt` numbers the reconnect about
    /// to be made, counting from 1 since the last successful open.
    Disconnected { attempt: u32 },

    /// Connect failure or socket error. Always followed by `Disconnected` or `GaveUp`.
    ConnectionError(String),

    /// Reconnect cap reached; no further attempts will be made.
    GaveUp { attempts: u32 },

    /// Live video stream became available.
    StreamUrl(String),
}

/// `{ "state": ..., "action": ... }` frames from the evaluator server.
#[derive(Debug, Deserialize)]
struct StateFrame {
    state: GameState,
    #[serde(default)]
    action: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AiLogWire {
    #[serde(rename = "type")]
    kind: LogKind,
    message: String,
}

/// `{ "event": ..., "data": ... }` frames carrying named events.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
enum NamedFrame {
    #[serde(rename = "gameState")]
    GameState(Value),

    #[serde(rename = "screenshot")]
    Screenshot(String),

    #[serde(rename = "aiLog")]
    AiLog(AiLogWire),
}

/// Decode one text frame. `received_at` stamps payloads that carry no time.
pub fn decode_frame(text: &str, received_at: DateTime<Utc>) -> Result<DashboardEvent, DashError> {
    let value: Value = serde_json::from_str(text)?;

    if value.get("state").is_some() {
        let frame: StateFrame = serde_json::from_value(value)?;
        let action = frame.action.and_then(|raw| decode_action(raw, received_at));
        return Ok(DashboardEvent::StateUpdate {
            state: frame.state,
            action,
        });
    }

    if value.get("event").is_some() {
        let frame: NamedFrame = serde_json::from_value(value)?;
        return Ok(match frame {
            NamedFrame::GameState(data) => {
                let carries_screenshot = data.get("screenshot_base64").is_some();
                let mut state: GameState = serde_json::from_value(data)?;
                let screenshot =
                    carries_screenshot.then(|| std::mem::take(&mut state.screenshot));
                DashboardEvent::StatePush { state, screenshot }
            }
            NamedFrame::Screenshot(data) => DashboardEvent::Screenshot(data),
            NamedFrame::AiLog(log) => DashboardEvent::Log(LogLine {
                kind: log.kind,
                message: log.message,
                timestamp: received_at,
            }),
        });
    }

    Err(DashError::UnrecognizedFrame)
}

/// An action must carry both `type` and `details`; other shapes are dropped.
fn decode_action(raw: Value, received_at: DateTime<Utc>) -> Option<AgentAction> {
    if raw.is_null() {
        return None;
    }
    match serde_json::from_value::<ActionWire>(raw) {
        Ok(wire) => Some(AgentAction::from_wire(wire, received_at)),
        Err(e) => {
            debug!("Dropping action with unrecognized shape: {}", e);
            None
        }
    }
}
