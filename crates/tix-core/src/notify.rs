//! Self-expiring queue of user-facing status messages.
//!
//! Each entry carries its own deadline (creation time + TTL), so one
//! long-lived notification never pins another. Time is injected as plain
//! milliseconds; the owning loop calls [`NotificationQueue::expire_due`] on
//! its ticks, which means early dismiss and timeout expiry are both ordinary
//! removals and cannot race into a double-remove.

use serde::Serialize;
use std::fmt;

/// Default time-to-live for a notification.
pub const DEFAULT_TTL_MILLIS: i64 = 5_000;

/// Visual flavor of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Queue-unique id; never reused within a queue's lifetime.
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    /// When the entry was pushed, in caller-supplied milliseconds.
    pub created_at_millis: i64,
    /// When the entry self-evicts.
    pub deadline_millis: i64,
}

/// Insertion-ordered notification queue with per-entry expiry.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    next_id: u64,
    ttl_millis: i64,
}

impl NotificationQueue {
    /// Queue with the standard 5 second TTL.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL_MILLIS)
    }

    /// Queue with a custom TTL (tests use short ones).
    #[must_use]
    pub const fn with_ttl(ttl_millis: i64) -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            ttl_millis,
        }
    }

    /// Append a message; returns its queue-unique id.
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>, now_millis: i64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            kind,
            message: message.into(),
            created_at_millis: now_millis,
            deadline_millis: now_millis.saturating_add(self.ttl_millis),
        });
        id
    }

    /// Remove an entry before its deadline. Unknown ids are a no-op.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    /// Evict every entry whose own deadline has passed; returns how many.
    pub fn expire_due(&mut self, now_millis: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| n.deadline_millis > now_millis);
        before - self.entries.len()
    }

    /// Live entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_TTL_MILLIS, NotificationKind, NotificationQueue};

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut q = NotificationQueue::new();
        let a = q.push(NotificationKind::Info, "a", 0);
        let b = q.push(NotificationKind::Info, "b", 0);
        let c = q.push(NotificationKind::Info, "c", 0);
        assert!(a < b && b < c);
        q.dismiss(b);
        let d = q.push(NotificationKind::Info, "d", 0);
        assert!(d > c);
    }

    #[test]
    fn entries_keep_insertion_order() {
        let mut q = NotificationQueue::new();
        q.push(NotificationKind::Success, "first", 10);
        q.push(NotificationKind::Error, "second", 20);
        let messages: Vec<&str> = q.entries().iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);
    }

    #[test]
    fn each_entry_expires_on_its_own_deadline() {
        let mut q = NotificationQueue::new();
        q.push(NotificationKind::Success, "early", 0);
        q.push(NotificationKind::Info, "late", 3_000);

        // Just before the first deadline nothing happens.
        assert_eq!(q.expire_due(DEFAULT_TTL_MILLIS - 1), 0);
        assert_eq!(q.len(), 2);

        // First entry goes; the later push keeps its own timer.
        assert_eq!(q.expire_due(DEFAULT_TTL_MILLIS), 1);
        assert_eq!(q.entries()[0].message, "late");

        assert_eq!(q.expire_due(3_000 + DEFAULT_TTL_MILLIS), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn dismiss_then_expire_does_not_double_remove() {
        let mut q = NotificationQueue::with_ttl(100);
        let id = q.push(NotificationKind::Error, "gone early", 0);
        assert!(q.dismiss(id));
        assert!(!q.dismiss(id));
        assert_eq!(q.expire_due(1_000), 0);
    }

    #[test]
    fn unknown_dismiss_is_noop() {
        let mut q = NotificationQueue::new();
        assert!(!q.dismiss(42));
    }
}
