//! tix-core: the in-memory half of the realtime ticket dashboard.
//!
//! Everything in this crate is pure state and pure functions: the ticket
//! model, the reconciling [`store::TicketStore`], the [`project`] view
//! projection, and the time-injected [`notify::NotificationQueue`]. No I/O
//! happens here; the sync layer feeds events in and reads views out.
//!
//! # Conventions
//!
//! - **Errors**: stable `E####` codes in [`error`], shared by every layer.
//! - **Time**: callers pass milliseconds; nothing here reads the wall clock.

pub mod error;
pub mod model;
pub mod notify;
pub mod project;
pub mod store;

pub use model::{Ticket, TicketId};
pub use store::TicketStore;
