//! Text formatting shared by the renderers.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::{ActionKind, Coordinates, Hp};

/// Detail line for an action: `Button: A`, `Frames: 30`, or the raw details.
pub fn action_details(kind: &ActionKind) -> String {
    match kind {
        ActionKind::PressKey { button } => format!("Button: {}", button),
        ActionKind::Wait { frames } => format!("Frames: {}", frames),
        ActionKind::Other { details, .. } => match details {
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        },
    }
}

pub fn action_heading(kind: &ActionKind) -> String {
    format!("Using tool: {}", kind.name())
}

pub fn coordinates(c: Coordinates) -> String {
    format!("({}, {})", c.0, c.1)
}

pub fn hp_fraction(hp: &Hp) -> String {
    format!("HP: {}/{}", hp.current, hp.max)
}

/// Gauge ratio in [0, 1]. Zero max HP reads as empty.
pub fn hp_ratio(hp: &Hp) -> f64 {
    if hp.max == 0 {
        return 0.0;
    }
    (hp.current as f64 / hp.max as f64).clamp(0.0, 1.0)
}

pub fn level(level: u32) -> String {
    format!("Lv.{}", level)
}

pub fn money(amount: u32) -> String {
    format!("₽{}", amount)
}

pub fn timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%H:%M:%S").to_string()
}
