//! Screen navigation state.

use std::time::{Duration, Instant};

/// How long a first back press stays armed.
pub const DEFAULT_EXIT_WINDOW: Duration = Duration::from_secs(2);

/// Hint shown after the first back press.
pub const EXIT_HINT: &str = "Please click BACK again to exit";

/// What a back press on the capture screen should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// Show [`EXIT_HINT`] and stay.
    ConfirmExit,
    /// Leave the app.
    Exit,
}

/// "Press back twice to exit" state for one screen.
///
/// The caller supplies the clock, so the guard never schedules anything.
#[derive(Debug, Clone)]
pub struct BackPressGuard {
    window: Duration,
    armed_at: Option<Instant>,
}

impl Default for BackPressGuard {
    fn default() -> Self {
        Self::new(DEFAULT_EXIT_WINDOW)
    }
}

impl BackPressGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register a back press at `now`.
    pub fn press(&mut self, now: Instant) -> BackAction {
        match self.armed_at {
            Some(armed) if now.saturating_duration_since(armed) < self.window => {
                self.armed_at = None;
                BackAction::Exit
            }
            _ => {
                self.armed_at = Some(now);
                BackAction::ConfirmExit
            }
        }
    }

    /// Whether a press at `now` would exit.
    pub fn is_armed(&self, now: Instant) -> bool {
        self.armed_at
            .is_some_and(|armed| now.saturating_duration_since(armed) < self.window)
    }
}
