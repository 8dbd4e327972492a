//! Mutation coordinator: immediate user feedback without touching the store.
//!
//! Create, edit, and delete go straight to the backend; the store only ever
//! changes when the stream delivers the confirming event. That keeps one
//! authoritative write path at the cost of a short visible delay between
//! "create succeeded" and the ticket appearing — the feed's resync path is
//! the mitigation when the stream goes quiet.

use crate::api::{ApiError, TicketApi};
use std::collections::HashSet;
use tix_core::model::TicketId;
use tix_core::notify::{NotificationKind, NotificationQueue};
use tracing::{debug, warn};

/// UI-facing result of a mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The backend accepted the request; the stream will deliver the change.
    Accepted,
    /// The request failed; an error notification was queued.
    Rejected,
    /// A delete for this id is already outstanding; nothing was sent.
    InFlight,
    /// The coordinator was torn down; nothing was sent, nothing was queued.
    Closed,
}

impl MutationOutcome {
    /// Whether the view should jump back to the first page (new tickets
    /// sort first).
    #[must_use]
    pub const fn resets_page(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Wraps a [`TicketApi`] with notification plumbing and the
/// one-in-flight-delete-per-id rule.
pub struct MutationCoordinator<A: TicketApi> {
    api: A,
    deletes_in_flight: HashSet<TicketId>,
    closed: bool,
}

impl<A: TicketApi> MutationCoordinator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            deletes_in_flight: HashSet::new(),
            closed: false,
        }
    }

    /// Send a create request. Never inserts a local placeholder: the
    /// classifier owns category/sentiment and the stream supplies the
    /// authoritative record.
    pub fn create(
        &mut self,
        description: &str,
        notices: &mut NotificationQueue,
        now_millis: i64,
    ) -> MutationOutcome {
        if self.closed {
            return MutationOutcome::Closed;
        }
        let description = description.trim();
        if description.is_empty() {
            notices.push(NotificationKind::Error, "Description is required", now_millis);
            return MutationOutcome::Rejected;
        }

        match self.api.create_ticket(description) {
            Ok(()) => {
                debug!("create accepted");
                notices.push(
                    NotificationKind::Success,
                    "Ticket created successfully",
                    now_millis,
                );
                MutationOutcome::Accepted
            }
            Err(err) => {
                warn!(error = %err, code = %err.error_code(), "create failed");
                let message = match err {
                    ApiError::Transport { .. } => "Connection error while creating ticket",
                    ApiError::Rejected { .. } => "Failed to create ticket",
                };
                notices.push(NotificationKind::Error, message, now_millis);
                MutationOutcome::Rejected
            }
        }
    }

    /// Send an edit. The backend re-runs classification, so the updated
    /// fields arrive via a later stream update; the store is not rewritten
    /// here.
    pub fn edit(
        &mut self,
        id: &TicketId,
        description: &str,
        notices: &mut NotificationQueue,
        now_millis: i64,
    ) -> MutationOutcome {
        if self.closed {
            return MutationOutcome::Closed;
        }
        let description = description.trim();
        if description.is_empty() {
            notices.push(NotificationKind::Error, "Description is required", now_millis);
            return MutationOutcome::Rejected;
        }

        match self.api.update_ticket(id, description) {
            Ok(()) => {
                debug!(id = %id, "edit accepted");
                notices.push(
                    NotificationKind::Success,
                    "Ticket updated; re-evaluation pending",
                    now_millis,
                );
                MutationOutcome::Accepted
            }
            Err(err) => {
                warn!(id = %id, error = %err, code = %err.error_code(), "edit failed");
                // Surface the backend's own reason verbatim when it sent one.
                let message = match (&err, err.detail()) {
                    (_, Some(detail)) => detail.to_string(),
                    (ApiError::Transport { .. }, None) => {
                        "Connection error while updating ticket".to_string()
                    }
                    (ApiError::Rejected { .. }, None) => "Failed to update ticket".to_string(),
                };
                notices.push(NotificationKind::Error, message, now_millis);
                MutationOutcome::Rejected
            }
        }
    }

    /// Send a delete. The entry stays visible until the stream confirms;
    /// a second delete for the same id while one is outstanding is ignored.
    pub fn delete(
        &mut self,
        id: &TicketId,
        notices: &mut NotificationQueue,
        now_millis: i64,
    ) -> MutationOutcome {
        if self.closed {
            return MutationOutcome::Closed;
        }
        if !self.begin_delete(id) {
            debug!(id = %id, "delete already in flight, ignoring");
            return MutationOutcome::InFlight;
        }

        let result = self.api.delete_ticket(id);
        self.finish_delete(id);

        // Teardown may have happened while the request was out; a late
        // completion must not queue anything.
        if self.closed {
            return MutationOutcome::Closed;
        }

        match result {
            Ok(()) => {
                debug!(id = %id, "delete accepted");
                notices.push(
                    NotificationKind::Success,
                    "Ticket deleted successfully",
                    now_millis,
                );
                MutationOutcome::Accepted
            }
            Err(err) => {
                warn!(id = %id, error = %err, code = %err.error_code(), "delete failed");
                let message = match err {
                    ApiError::Transport { .. } => "Connection error while deleting ticket",
                    ApiError::Rejected { .. } => "Failed to delete ticket",
                };
                notices.push(NotificationKind::Error, message, now_millis);
                MutationOutcome::Rejected
            }
        }
    }

    /// Mark a delete as outstanding. False when one already is.
    pub fn begin_delete(&mut self, id: &TicketId) -> bool {
        self.deletes_in_flight.insert(id.clone())
    }

    /// Clear the outstanding marker for an id.
    pub fn finish_delete(&mut self, id: &TicketId) {
        self.deletes_in_flight.remove(id);
    }

    /// Whether a delete for `id` is outstanding.
    #[must_use]
    pub fn delete_in_flight(&self, id: &TicketId) -> bool {
        self.deletes_in_flight.contains(id)
    }

    /// Tear down: all later (or late-completing) mutations become no-ops.
    pub fn close(&mut self) {
        self.closed = true;
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::{MutationCoordinator, MutationOutcome};
    use crate::api::{ApiError, TicketApi};
    use std::cell::RefCell;
    use tix_core::model::{Ticket, TicketId};
    use tix_core::notify::{NotificationKind, NotificationQueue};

    /// Scripted backend: fails on demand, records every call.
    #[derive(Default)]
    struct ScriptedApi {
        fail_status: Option<u16>,
        fail_transport: bool,
        detail: Option<String>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedApi {
        fn error(&self) -> Option<ApiError> {
            if self.fail_transport {
                return Some(ApiError::Transport {
                    message: "connection refused".to_string(),
                });
            }
            self.fail_status.map(|status| ApiError::Rejected {
                status,
                detail: self.detail.clone(),
            })
        }
    }

    impl TicketApi for ScriptedApi {
        fn create_ticket(&self, description: &str) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(format!("create:{description}"));
            self.error().map_or(Ok(()), Err)
        }

        fn update_ticket(&self, id: &TicketId, description: &str) -> Result<(), ApiError> {
            self.calls
                .borrow_mut()
                .push(format!("update:{id}:{description}"));
            self.error().map_or(Ok(()), Err)
        }

        fn delete_ticket(&self, id: &TicketId) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(format!("delete:{id}"));
            self.error().map_or(Ok(()), Err)
        }

        fn fetch_tickets(&self) -> Result<Vec<Ticket>, ApiError> {
            self.calls.borrow_mut().push("fetch".to_string());
            Ok(Vec::new())
        }

        fn health(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[test]
    fn successful_create_notifies_and_resets_page() {
        let mut coord = MutationCoordinator::new(ScriptedApi::default());
        let mut notices = NotificationQueue::new();
        let outcome = coord.create("no puedo entrar", &mut notices, 0);
        assert_eq!(outcome, MutationOutcome::Accepted);
        assert!(outcome.resets_page());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices.entries()[0].kind, NotificationKind::Success);
    }

    #[test]
    fn failed_create_queues_exactly_one_error() {
        let api = ScriptedApi {
            fail_status: Some(500),
            ..ScriptedApi::default()
        };
        let mut coord = MutationCoordinator::new(api);
        let mut notices = NotificationQueue::new();
        let outcome = coord.create("x", &mut notices, 0);
        assert_eq!(outcome, MutationOutcome::Rejected);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices.entries()[0].kind, NotificationKind::Error);
    }

    #[test]
    fn transport_failure_gets_connection_message() {
        let api = ScriptedApi {
            fail_transport: true,
            ..ScriptedApi::default()
        };
        let mut coord = MutationCoordinator::new(api);
        let mut notices = NotificationQueue::new();
        coord.create("x", &mut notices, 0);
        assert!(notices.entries()[0].message.contains("Connection error"));
    }

    #[test]
    fn empty_description_is_rejected_locally() {
        let mut coord = MutationCoordinator::new(ScriptedApi::default());
        let mut notices = NotificationQueue::new();
        let outcome = coord.create("   ", &mut notices, 0);
        assert_eq!(outcome, MutationOutcome::Rejected);
        assert!(coord.api.calls.borrow().is_empty());
    }

    #[test]
    fn edit_surfaces_backend_detail_verbatim() {
        let api = ScriptedApi {
            fail_status: Some(422),
            detail: Some("description is required".to_string()),
            ..ScriptedApi::default()
        };
        let mut coord = MutationCoordinator::new(api);
        let mut notices = NotificationQueue::new();
        coord.edit(&TicketId::new("t1"), "nuevo texto", &mut notices, 0);
        assert_eq!(notices.entries()[0].message, "description is required");
    }

    #[test]
    fn edit_without_detail_gets_generic_message() {
        let api = ScriptedApi {
            fail_status: Some(500),
            ..ScriptedApi::default()
        };
        let mut coord = MutationCoordinator::new(api);
        let mut notices = NotificationQueue::new();
        coord.edit(&TicketId::new("t1"), "texto", &mut notices, 0);
        assert_eq!(notices.entries()[0].message, "Failed to update ticket");
    }

    #[test]
    fn second_delete_for_same_id_is_ignored_while_outstanding() {
        let mut coord = MutationCoordinator::new(ScriptedApi::default());
        let mut notices = NotificationQueue::new();
        let id = TicketId::new("t1");

        // Simulate an outstanding request.
        assert!(coord.begin_delete(&id));
        let outcome = coord.delete(&id, &mut notices, 0);
        assert_eq!(outcome, MutationOutcome::InFlight);
        assert!(notices.is_empty());
        assert!(coord.api.calls.borrow().is_empty());

        // After the first completes, deletes work again.
        coord.finish_delete(&id);
        assert_eq!(coord.delete(&id, &mut notices, 0), MutationOutcome::Accepted);
    }

    #[test]
    fn delete_failure_keeps_entry_and_reports() {
        let api = ScriptedApi {
            fail_status: Some(500),
            ..ScriptedApi::default()
        };
        let mut coord = MutationCoordinator::new(api);
        let mut notices = NotificationQueue::new();
        let id = TicketId::new("t1");
        assert_eq!(coord.delete(&id, &mut notices, 0), MutationOutcome::Rejected);
        assert!(!coord.delete_in_flight(&id));
        assert_eq!(notices.entries()[0].kind, NotificationKind::Error);
    }

    #[test]
    fn closed_coordinator_is_a_noop() {
        let mut coord = MutationCoordinator::new(ScriptedApi::default());
        let mut notices = NotificationQueue::new();
        coord.close();
        assert_eq!(
            coord.create("x", &mut notices, 0),
            MutationOutcome::Closed
        );
        assert_eq!(
            coord.delete(&TicketId::new("t1"), &mut notices, 0),
            MutationOutcome::Closed
        );
        assert!(notices.is_empty());
        assert!(coord.api.calls.borrow().is_empty());
    }
}
