//! App state — latest snapshot plus local view state (scroll, decoded screen).

use pokedash_core::store::Snapshot;

use crate::ui::screen::{self, Screen};

/// The main application state.
pub struct App {
    pub snapshot: Snapshot,
    /// Rows scrolled up from the newest log entry. 0 = follow the tail.
    pub log_scroll: usize,
    pub screen: Option<Screen>,
    pub should_quit: bool,
}

impl App {
    pub fn new(snapshot: Snapshot) -> Self {
        let mut app = App {
            snapshot: Snapshot::default(),
            log_scroll: 0,
            screen: None,
            should_quit: false,
        };
        app.update(snapshot);
        app
    }

    /// Take a new snapshot from the store. The screenshot is only decoded
    /// again when it actually changed.
    pub fn update(&mut self, snapshot: Snapshot) {
        if snapshot.game.screenshot != self.snapshot.game.screenshot {
            self.screen = screen::decode(&snapshot.game.screenshot);
        }

        self.snapshot = snapshot;
    }

    pub fn scroll_up(&mut self) {
        self.log_scroll = self.log_scroll.saturating_add(3);
    }

    pub fn scroll_down(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(3);
    }

    pub fn follow_tail(&mut self) {
        self.log_scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedash_core::events::DashboardEvent;
    use pokedash_core::store::StateStore;
    use pokedash_core::types::{LogKind, LogLine};

    #[test]
    fn test_scroll_bounds() {
        let mut app = App::new(Snapshot::default());
        app.scroll_down();
        assert_eq!(app.log_scroll, 0);
        app.scroll_up();
        app.scroll_up();
        assert_eq!(app.log_scroll, 6);
        app.follow_tail();
        assert_eq!(app.log_scroll, 0);
    }

    #[test]
    fn test_update_keeps_scroll_and_takes_state() {
        let mut store = StateStore::new(50);
        let mut app = App::new(store.snapshot());
        app.scroll_up();

        store.apply(DashboardEvent::Connected);
        store.apply(DashboardEvent::Log(LogLine::now(LogKind::Thinking, "two")));
        app.update(store.snapshot());
        assert_eq!(app.log_scroll, 3);
        assert_eq!(app.snapshot.log.len(), 2);
        assert!(app.snapshot.is_connected());
    }

    #[test]
    fn test_empty_screenshot_does_not_decode() {
        let app = App::new(Snapshot::default());
        assert!(app.screen.is_none());
    }
}
