use std::time::{Duration, Instant};
use tracing::debug;

/// How long an announcement stays on screen.
pub const ANNOUNCEMENT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Shown without drawing attention.
    Polite,
    /// Errors and destructive actions.
    Assertive,
}

/// Sink for user-facing notices. Announcing never fails.
pub trait Announcer {
    fn announce(&mut self, message: &str, priority: Priority);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub priority: Priority,
    pub expires_at: Instant,
}

/// Single-line status area; the latest announcement replaces the previous one.
#[derive(Debug, Default)]
pub struct StatusLine {
    current: Option<Announcement>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Announcement> {
        self.current.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.message.as_str())
    }

    /// Drops the announcement once it has expired. Returns whether anything
    /// changed.
    pub fn clear_expired(&mut self, now: Instant) -> bool {
        match &self.current {
            Some(a) if a.expires_at <= now => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

impl Announcer for StatusLine {
    fn announce(&mut self, message: &str, priority: Priority) {
        debug!(?priority, "{message}");
        self.current = Some(Announcement {
            message: message.to_string(),
            priority,
            expires_at: Instant::now() + ANNOUNCEMENT_TTL,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_announcement_wins_until_it_expires() {
        let mut status = StatusLine::new();
        status.announce("Fetching weather data...", Priority::Polite);
        status.announce("Weather fetch failed. Please try again.", Priority::Assertive);

        let current = status.current().unwrap();
        assert_eq!(current.priority, Priority::Assertive);
        assert_eq!(status.message(), Some("Weather fetch failed. Please try again."));

        assert!(!status.clear_expired(Instant::now()));
        assert!(status.clear_expired(Instant::now() + ANNOUNCEMENT_TTL + Duration::from_millis(1)));
        assert_eq!(status.message(), None);
    }
}
