//! Transient notice: a short message that dismisses itself.
//!
//! Notices and event tooltips suppress each other: the host hides the tooltip
//! when a notice appears and drops the notice when a tooltip opens.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub shown_at: Instant,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct NoticeSlot {
    ttl: Duration,
    current: Option<Notice>,
}

impl NoticeSlot {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    /// Show `message`, replacing any notice already up.
    pub fn show(&mut self, message: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            message: message.into(),
            shown_at: now,
            expires_at: now + self.ttl,
        });
    }

    pub fn dismiss(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Drop the notice once its timer has run out. Returns true if it expired.
    pub fn expire(&mut self, now: Instant) -> bool {
        match &self.current {
            Some(n) if now >= n.expires_at => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn is_showing(&self) -> bool {
        self.current.is_some()
    }
}
