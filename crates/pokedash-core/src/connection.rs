//! Connection manager — the `/initialize` handshake and the WebSocket session
//! loop. Both only ever send `DashboardEvent`s to the store.

use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::DashError;
use crate::events::{decode_frame, DashboardEvent};
use crate::types::GameState;

pub const CONNECT_FAILED_BANNER: &str = "Failed to connect to game server";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Fixed-delay reconnection with an optional cap on reconnects made since
/// the last successful open. The initial connect is not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delay: config.reconnect_delay(),
            max_attempts: config.max_reconnect_attempts,
        }
    }

    /// True once `retries` reconnects have used up the cap.
    pub fn exhausted(&self, retries: u32) -> bool {
        matches!(self.max_attempts, Some(max) if retries >= max)
    }
}

/// Handles for the tasks started by [`spawn`].
pub struct ConnectionTasks {
    pub init: JoinHandle<()>,
    pub session: JoinHandle<()>,
}

impl ConnectionTasks {
    /// Wait for both tasks, giving up after `timeout`.
    pub async fn join(self, timeout: Duration) {
        let joined = async {
            let _ = self.init.await;
            let _ = self.session.await;
        };
        if tokio::time::timeout(timeout, joined).await.is_err() {
            warn!("Connection tasks did not stop within {:?}", timeout);
        }
    }
}

/// Start the one-shot initialize call and the session loop.
/// Flip `shutdown` to `true` (or drop its sender) to stop both.
pub fn spawn(
    config: Config,
    tx: mpsc::Sender<DashboardEvent>,
    shutdown: watch::Receiver<bool>,
) -> ConnectionTasks {
    let init = tokio::spawn(run_init(config.clone(), tx.clone(), shutdown.clone()));
    let session = tokio::spawn(run_session(config, tx, shutdown));
    ConnectionTasks { init, session }
}

/// `POST /initialize` and parse the returned state.
pub async fn initialize(client: &reqwest::Client, config: &Config) -> Result<GameState, DashError> {
    let url = config.initialize_url();
    let body = json!({
        "headless": config.headless,
        "sound": config.sound,
    });

    let timeout_secs = config.init_timeout_secs;
    let resp = client
        .post(&url)
        .timeout(config.init_timeout())
        .json(&body)
        .send()
        .await
        .map_err(|e| timeout_or_http(e, timeout_secs))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DashError::Status(status));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| timeout_or_http(e, timeout_secs))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn timeout_or_http(e: reqwest::Error, timeout_secs: u64) -> DashError {
    if e.is_timeout() {
        DashError::Timeout(timeout_secs)
    } else {
        DashError::Http(e)
    }
}

/// Run `initialize` once and report the outcome. Not retried.
pub async fn run_init(
    config: Config,
    tx: mpsc::Sender<DashboardEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let client = reqwest::Client::new();

    let result = tokio::select! {
        result = initialize(&client, &config) => result,
        _ = shutdown.changed() => {
            debug!("Shutdown before initialize finished");
            return;
        }
    };

    match result {
        Ok(state) => {
            info!("Game environment initialized at {}", state.location);
            let _ = tx.send(DashboardEvent::Initialized(state)).await;
            if let Some(url) = config.stream_url.clone() {
                let _ = tx.send(DashboardEvent::StreamUrl(url)).await;
            }
        }
        Err(e) => {
            warn!("Initialize failed: {}", e);
            let _ = tx.send(DashboardEvent::InitFailed(e.to_string())).await;
        }
    }
}

enum SessionEnd {
    Closed,
    Failed(DashError),
    Shutdown,
    StoreGone,
}

/// Keep one WebSocket session alive until shutdown, the store going away,
/// or the reconnect cap.
pub async fn run_session(
    config: Config,
    tx: mpsc::Sender<DashboardEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let policy = ReconnectPolicy::from_config(&config);
    // Reconnects made since the last successful open.
    let mut retries: u32 = 0;

    loop {
        if *shutdown.borrow() {
            return;
        }

        let connect = tokio::select! {
            result = connect_async(config.ws_url.as_str()) => result,
            _ = shutdown.changed() => return,
        };

        match connect {
            Ok((ws, _)) => {
                retries = 0;
                info!("Connected to {}", config.ws_url);
                if tx.send(DashboardEvent::Connected).await.is_err() {
                    return;
                }
                match pump(ws, &tx, &mut shutdown).await {
                    SessionEnd::Shutdown | SessionEnd::StoreGone => return,
                    SessionEnd::Closed => info!("WebSocket closed by server"),
                    SessionEnd::Failed(e) => {
                        warn!("WebSocket error: {}", e);
                        if tx
                            .send(DashboardEvent::ConnectionError(CONNECT_FAILED_BANNER.into()))
                            .await
                            .is_err()
                        {
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Connect to {} failed: {}", config.ws_url, e);
                if tx
                    .send(DashboardEvent::ConnectionError(CONNECT_FAILED_BANNER.into()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }

        if policy.exhausted(retries) {
            warn!("Giving up after {} reconnect attempts", retries);
            let _ = tx.send(DashboardEvent::GaveUp { attempts: retries }).await;
            return;
        }

        retries = retries.saturating_add(1);
        if tx
            .send(DashboardEvent::Disconnected { attempt: retries })
            .await
            .is_err()
        {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(policy.delay) => {}
            _ = shutdown.changed() => return,
        }
    }
}

/// Forward frames from an open socket until it ends.
async fn pump(
    ws: WsStream,
    tx: &mpsc::Sender<DashboardEvent>,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match decode_frame(&text, Utc::now()) {
                        Ok(event) => {
                            if tx.send(event).await.is_err() {
                                let _ = write.close().await;
                                return SessionEnd::StoreGone;
                            }
                        }
                        Err(e) => debug!("Dropping frame: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => return SessionEnd::Closed,
                Some(Ok(_)) => {}
                Some(Err(e)) => return SessionEnd::Failed(e.into()),
            },
            _ = shutdown.changed() => {
                let _ = write.close().await;
                return SessionEnd::Shutdown;
            }
        }
    }
}
