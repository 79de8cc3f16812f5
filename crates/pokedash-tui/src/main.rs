//! pokedash-tui — Terminal dashboard for watching an agent play Pokémon.
//! Uses Ratatui + Crossterm for rendering.

mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::{mpsc, watch};
use tracing::info;

use pokedash_core::config::Config;
use pokedash_core::connection;
use pokedash_core::store::{self, Snapshot, EVENT_CHANNEL_CAPACITY};

use app::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file (not stdout, since we own the terminal)
    let _guard = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(|| -> Box<dyn io::Write> {
            match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("pokedash-tui.log")
            {
                Ok(file) => Box::new(file),
                Err(_) => Box::new(io::sink()),
            }
        })
        .try_init();

    // Optional first argument: path to a config file
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&PathBuf::from(path))?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::load_from_dir(&cwd)?
        }
    };

    info!(
        "Starting dashboard: api={} ws={}",
        config.api_base, config.ws_url
    );

    // backend -> connection tasks -> store -> snapshots -> UI
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (mut snapshot_rx, store_task) = store::spawn_store(event_rx, config.log_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tasks = connection::spawn(config, event_tx, shutdown_rx);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let initial = snapshot_rx.borrow_and_update().clone();
    let result = run(&mut terminal, App::new(initial), &mut snapshot_rx);

    // Cleanup
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    // Stop the connection tasks; the store ends once their senders drop.
    let _ = shutdown_tx.send(true);
    tasks.join(Duration::from_secs(2)).await;
    let _ = tokio::time::timeout(Duration::from_secs(1), store_task).await;
    info!("Dashboard stopped");

    result
}

/// Main event loop: pull the latest snapshot, draw, handle keys.
fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    snapshots: &mut watch::Receiver<Snapshot>,
) -> Result<()> {
    loop {
        if snapshots.has_changed().unwrap_or(false) {
            app.update(snapshots.borrow_and_update().clone());
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match (key.code, key.modifiers) {
                    // Quit
                    (KeyCode::Char('c'), KeyModifiers::CONTROL) => app.should_quit = true,
                    (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => app.should_quit = true,
                    // Scroll
                    (KeyCode::Up, _) | (KeyCode::PageUp, _) => app.scroll_up(),
                    (KeyCode::Down, _) | (KeyCode::PageDown, _) => app.scroll_down(),
                    (KeyCode::End, _) => app.follow_tail(),
                    _ => {}
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
