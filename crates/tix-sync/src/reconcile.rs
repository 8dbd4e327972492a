//! The single writer of the ticket store.
//!
//! The reconciler owns the [`TicketStore`] and applies normalized change
//! events to it; nothing else gets a mutable handle. Apply outcomes tell
//! the caller whether the view should jump back to page one (fresh inserts
//! sort first, so staying deep in the pagination would hide them).

use crate::event::ChangeEvent;
use tix_core::model::{Ticket, TicketId};
use tix_core::notify::{NotificationKind, NotificationQueue};
use tix_core::store::{TicketStore, Upserted};
use tracing::{debug, info};

/// What applying one event did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Baseline replaced (initial load or forced resync).
    SnapshotLoaded { count: usize },
    /// A ticket the store had never seen; it now sits at the front.
    Inserted(TicketId),
    /// Fields replaced in place (includes replayed duplicate inserts).
    Updated(TicketId),
    Removed(TicketId),
    /// Delete for an id the store never had; nothing happened.
    AlreadyAbsent(TicketId),
}

impl Applied {
    /// Should the view reset to the first page after this?
    #[must_use]
    pub const fn resets_page(&self) -> bool {
        matches!(self, Self::Inserted(_) | Self::SnapshotLoaded { .. })
    }
}

/// Owns the store; applies events; hands out read-only views.
#[derive(Debug, Default)]
pub struct Reconciler {
    store: TicketStore,
}

impl Reconciler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            store: TicketStore::new(),
        }
    }

    /// Apply one normalized event. A fresh insert also pushes a
    /// "new ticket" notification, mirroring the dashboard behavior;
    /// duplicate inserts coalesce into silent updates.
    pub fn apply(
        &mut self,
        event: ChangeEvent,
        notices: &mut NotificationQueue,
        now_millis: i64,
    ) -> Applied {
        match event {
            ChangeEvent::Snapshot(tickets) => {
                let count = tickets.len();
                self.store.replace_all(tickets);
                info!(count, "store baseline replaced");
                Applied::SnapshotLoaded { count }
            }
            ChangeEvent::Inserted(ticket) | ChangeEvent::Updated(ticket) => {
                let id = ticket.id.clone();
                match self.store.upsert(ticket) {
                    Upserted::Inserted => {
                        debug!(id = %id, "ticket inserted");
                        notices.push(NotificationKind::Success, "New ticket received", now_millis);
                        Applied::Inserted(id)
                    }
                    Upserted::Replaced => {
                        debug!(id = %id, "ticket updated in place");
                        Applied::Updated(id)
                    }
                }
            }
            ChangeEvent::Deleted(id) => {
                if self.store.remove(&id) {
                    debug!(id = %id, "ticket removed");
                    Applied::Removed(id)
                } else {
                    debug!(id = %id, "delete for unknown ticket ignored");
                    Applied::AlreadyAbsent(id)
                }
            }
        }
    }

    /// Read-only view of the store.
    #[must_use]
    pub const fn store(&self) -> &TicketStore {
        &self.store
    }

    /// Ordered tickets, for projection.
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        self.store.snapshot()
    }
}
