//! The canonical in-memory ticket collection.
//!
//! One store instance is owned by the reconciler (the stream's event
//! handler); everything else gets read-only views. Order is arrival order:
//! tickets the store has never seen go to the front, updates stay where the
//! ticket already sits. That keeps display positions stable across repeated
//! re-renders while still floating genuinely new tickets to page one.

use crate::model::{Ticket, TicketId};

/// Outcome of an upsert, so callers can tell a fresh arrival from a
/// coalesced duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    /// The id was not present; the ticket was inserted at the front.
    Inserted,
    /// The id existed; fields were replaced in place, position unchanged.
    Replaced,
}

/// Ordered collection of tickets, unique by id.
///
/// All operations are synchronous and touch nothing but internal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
}

impl TicketStore {
    /// Empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tickets: Vec::new(),
        }
    }

    /// Insert `ticket` if its id is unknown, else replace the existing
    /// record in place. An at-least-once stream may replay an insert; the
    /// replay coalesces into a replace here, never a duplicate row.
    pub fn upsert(&mut self, ticket: Ticket) -> Upserted {
        if let Some(slot) = self.position(&ticket.id) {
            self.tickets[slot] = ticket;
            Upserted::Replaced
        } else {
            self.tickets.insert(0, ticket);
            Upserted::Inserted
        }
    }

    /// Remove the ticket with `id`. Absent ids are a no-op, not an error:
    /// a delete notification can outlive its row.
    pub fn remove(&mut self, id: &TicketId) -> bool {
        match self.position(id) {
            Some(slot) => {
                self.tickets.remove(slot);
                true
            }
            None => false,
        }
    }

    /// Replace the whole collection. Used for the initial snapshot load and
    /// for forced resyncs after the stream lost its place.
    pub fn replace_all(&mut self, tickets: Vec<Ticket>) {
        self.tickets = tickets;
        self.dedup_by_id();
    }

    /// Current ordered sequence, read-only.
    #[must_use]
    pub fn snapshot(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Look up one ticket by id.
    #[must_use]
    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.position(id).map(|slot| &self.tickets[slot])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    fn position(&self, id: &TicketId) -> Option<usize> {
        self.tickets.iter().position(|t| &t.id == id)
    }

    /// A backend snapshot should already be unique by primary key, but the
    /// uniqueness invariant must hold no matter what arrives. First
    /// occurrence wins (snapshots are ordered newest-first).
    fn dedup_by_id(&mut self) {
        let mut seen = std::collections::HashSet::with_capacity(self.tickets.len());
        self.tickets.retain(|t| seen.insert(t.id.clone()));
    }
}
