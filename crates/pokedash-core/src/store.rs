//! State store — the single owner of the game state and the action log.
//!
//! `StateStore` holds the transitions; `spawn_store` runs it as an actor that
//! drains `DashboardEvent`s and publishes a `Snapshot` on a watch channel.
//! Renderers only ever see snapshots.

use std::collections::VecDeque;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::events::DashboardEvent;
use crate::types::{GameState, LogEntry, LogKind, LogLine};

/// Bounded event channel between the connection tasks and the store.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

pub const RECONNECTING_BANNER: &str = "WebSocket connection closed. Reconnecting...";
pub const INIT_FAILED_BANNER: &str = "Failed to initialize game";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    GaveUp,
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub game: GameState,
    pub log: Vec<LogEntry>,
    pub status: ConnectionStatus,
    pub error: Option<String>,
    pub stream_url: Option<String>,
    /// Number of events applied so far.
    pub revision: u64,
}

impl Snapshot {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        StateStore::new(1).snapshot()
    }
}

pub struct StateStore {
    game: GameState,
    log: VecDeque<LogEntry>,
    capacity: usize,
    status: ConnectionStatus,
    error: Option<String>,
    stream_url: Option<String>,
    revision: u64,
}

impl StateStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            game: GameState::placeholder(),
            log: VecDeque::with_capacity(capacity),
            capacity,
            status: ConnectionStatus::Connecting,
            error: None,
            stream_url: None,
            revision: 0,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apply(&mut self, event: DashboardEvent) {
        self.revision += 1;
        match event {
            DashboardEvent::StateUpdate { state, action } => {
                self.game = state;
                if let Some(action) = action {
                    self.push(LogEntry::Action(action));
                }
            }
            DashboardEvent::StatePush { state, screenshot } => {
                let held = std::mem::take(&mut self.game.screenshot);
                self.game = state;
                self.game.screenshot = screenshot.unwrap_or(held);
            }
            DashboardEvent::Initialized(state) => {
                self.game = state;
                self.push_line(LogKind::Action, "Game environment initialized");
            }
            DashboardEvent::InitFailed(reason) => {
                self.error = Some(INIT_FAILED_BANNER.to_string());
                self.push_line(
                    LogKind::Error,
                    format!("Failed to initialize game: {}", reason),
                );
            }
            DashboardEvent::Screenshot(data) => {
                self.game.screenshot = data;
            }
            DashboardEvent::Log(line) => {
                self.push(LogEntry::Line(line));
            }
            DashboardEvent::Connected => {
                self.status = ConnectionStatus::Connected;
                self.error = None;
                self.push_line(LogKind::Action, "Connected to server");
            }
            DashboardEvent::Disconnected { attempt } => {
                if self.status == ConnectionStatus::Connected {
                    self.push_line(LogKind::Error, "Disconnected from server");
                }
                self.status = ConnectionStatus::Reconnecting { attempt };
                self.error = Some(RECONNECTING_BANNER.to_string());
            }
            DashboardEvent::ConnectionError(message) => {
                self.error = Some(message);
            }
            DashboardEvent::GaveUp { attempts } => {
                self.status = ConnectionStatus::GaveUp;
                let message = format!("Gave up reconnecting after {} attempts", attempts);
                self.push_line(LogKind::Error, message.clone());
                self.error = Some(message);
            }
            DashboardEvent::StreamUrl(url) => {
                self.stream_url = Some(url);
            }
        }
    }

    fn push_line(&mut self, kind: LogKind, message: impl Into<String>) {
        self.push(LogEntry::Line(LogLine::now(kind, message)));
    }

    /// Append, evicting the oldest entries past capacity.
    fn push(&mut self, entry: LogEntry) {
        self.log.push_back(entry);
        while self.log.len() > self.capacity {
            self.log.pop_front();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            game: self.game.clone(),
            log: self.log.iter().cloned().collect(),
            status: self.status,
            error: self.error.clone(),
            stream_url: self.stream_url.clone(),
            revision: self.revision,
        }
    }
}

/// Run the store as its own task. The task ends when every event sender is
/// dropped; the last snapshot stays readable on the returned receiver.
pub fn spawn_store(
    mut rx: mpsc::Receiver<DashboardEvent>,
    capacity: usize,
) -> (watch::Receiver<Snapshot>, JoinHandle<()>) {
    let mut store = StateStore::new(capacity);
    let (snapshot_tx, snapshot_rx) = watch::channel(store.snapshot());

    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            debug!("store event: {}", event_name(&event));
            store.apply(event);
            // Receivers may all be gone during shutdown; keep draining anyway.
            let _ = snapshot_tx.send(store.snapshot());
        }
        info!("Event channel closed, store stopping");
    });

    (snapshot_rx, handle)
}

fn event_name(event: &DashboardEvent) -> &'static str {
    match event {
        DashboardEvent::StateUpdate { .. } => "state_update",
        DashboardEvent::StatePush { .. } => "state_push",
        DashboardEvent::Initialized(_) => "initialized",
        DashboardEvent::InitFailed(_) => "init_failed",
        DashboardEvent::Screenshot(_) => "screenshot",
        DashboardEvent::Log(_) => "log",
        DashboardEvent::Connected => "connected",
        DashboardEvent::Disconnected { .. } => "disconnected",
        DashboardEvent::ConnectionError(_) => "connection_error",
        DashboardEvent::GaveUp { .. } => "gave_up",
        DashboardEvent::StreamUrl(_) => "stream_url",
    }
}
