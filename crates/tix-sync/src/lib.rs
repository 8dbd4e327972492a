//! tix-sync: everything between the backend and the in-memory store.
//!
//! The change stream arrives as provider-specific JSON; [`event`] normalizes
//! it, [`feed`] runs the subscription (snapshot-first, reconnect-with-resync)
//! on a reader thread and publishes over a channel, and [`reconcile`] owns
//! the single writable [`tix_core::TicketStore`]. Mutations go the other way:
//! [`coordinator`] wraps the HTTP endpoints in [`api`] and never touches the
//! store — the stream's confirming event is the only write path.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod event;
pub mod feed;
pub mod reconcile;
pub mod status;
pub mod transport;

pub use api::{ApiError, HttpApi, TicketApi};
pub use config::ApiConfig;
pub use coordinator::{MutationCoordinator, MutationOutcome};
pub use event::ChangeEvent;
pub use feed::{FeedMessage, Subscription, subscribe};
pub use reconcile::Reconciler;
pub use status::ConnectionStatus;
