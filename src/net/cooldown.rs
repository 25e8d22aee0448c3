use std::time::{Duration, Instant};

/// Suppresses remote attempts for `window` after a failed one.
///
/// Owned by the single loop that drives a session, so no locking.
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    failed_at: Option<Instant>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            failed_at: None,
        }
    }

    pub fn is_active(&self, now: Instant) -> bool {
        match self.failed_at {
            Some(at) => now.saturating_duration_since(at) < self.window,
            None => false,
        }
    }

    pub fn trip(&mut self, now: Instant) {
        self.failed_at = Some(now);
    }

    pub fn clear(&mut self) {
        self.failed_at = None;
    }

    /// Time left before remote attempts resume.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.failed_at {
            Some(at) => self.window.saturating_sub(now.saturating_duration_since(at)),
            None => Duration::ZERO,
        }
    }
}
