//! Change-event normalization.
//!
//! The realtime provider delivers row-change payloads tagged `INSERT`,
//! `UPDATE`, or `DELETE`, carrying the new row (insert/update) or the prior
//! row (delete). [`normalize_value`] turns one raw payload into a
//! [`ChangeEvent`] or a [`MalformedEvent`] describing exactly which required
//! piece was missing. Malformed payloads are dropped by the feed, never
//! panicked on; the feed answers them with a fresh snapshot.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tix_core::error::ErrorCode;
use tix_core::model::{Ticket, TicketId};

/// The three live change kinds the provider can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    #[serde(alias = "insert")]
    Insert,
    #[serde(alias = "update")]
    Update,
    #[serde(alias = "delete")]
    Delete,
}

impl ChangeAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw provider payload for one row change.
#[derive(Debug, Clone, Deserialize)]
pub struct RowChange {
    /// Change kind tag. Both `type` and `eventType` spellings are accepted.
    #[serde(rename = "type", alias = "eventType")]
    pub action: ChangeAction,
    /// The row after the change (insert/update).
    #[serde(default)]
    pub new: Option<Value>,
    /// The row before the change (delete; at minimum its id).
    #[serde(default)]
    pub old: Option<Value>,
}

/// A normalized store-facing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Full baseline from a snapshot fetch or forced resync.
    Snapshot(Vec<Ticket>),
    Inserted(Ticket),
    Updated(Ticket),
    Deleted(TicketId),
}

/// Why a raw payload could not be normalized.
#[derive(Debug, thiserror::Error)]
pub enum MalformedEvent {
    /// The payload was not a recognizable change envelope at all.
    #[error("unrecognizable change envelope: {source}")]
    BadEnvelope {
        #[source]
        source: serde_json::Error,
    },

    /// An insert/update arrived without its row.
    #[error("{action} change is missing its row payload")]
    MissingRow { action: ChangeAction },

    /// The row was present but did not decode as a ticket.
    #[error("failed to decode {action} row: {source}")]
    BadRow {
        action: ChangeAction,
        #[source]
        source: serde_json::Error,
    },

    /// A delete arrived without the deleted row's id.
    #[error("delete change is missing the deleted row id")]
    MissingDeletedId,
}

impl MalformedEvent {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        ErrorCode::MalformedEvent
    }
}

/// Normalize a decoded [`RowChange`].
pub fn normalize(change: RowChange) -> Result<ChangeEvent, MalformedEvent> {
    match change.action {
        action @ (ChangeAction::Insert | ChangeAction::Update) => {
            let row = change.new.ok_or(MalformedEvent::MissingRow { action })?;
            let ticket: Ticket = serde_json::from_value(row)
                .map_err(|source| MalformedEvent::BadRow { action, source })?;
            Ok(match action {
                ChangeAction::Insert => ChangeEvent::Inserted(ticket),
                _ => ChangeEvent::Updated(ticket),
            })
        }
        ChangeAction::Delete => {
            let id = change
                .old
                .as_ref()
                .and_then(|old| old.get("id"))
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .ok_or(MalformedEvent::MissingDeletedId)?;
            Ok(ChangeEvent::Deleted(TicketId::new(id)))
        }
    }
}

/// Normalize straight from the wire-level JSON value.
pub fn normalize_value(raw: Value) -> Result<ChangeEvent, MalformedEvent> {
    let change: RowChange =
        serde_json::from_value(raw).map_err(|source| MalformedEvent::BadEnvelope { source })?;
    normalize(change)
}
