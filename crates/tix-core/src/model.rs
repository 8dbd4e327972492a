//! The ticket entity and its classifier-owned labels.
//!
//! Tickets are created by the backend; the AI classifier fills in
//! `category` and `sentiment` asynchronously, flipping `processed` to true
//! exactly once. The dashboard never invents these fields locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque backend-assigned ticket identifier.
///
/// Immutable once set; equality on this id alone decides upsert/remove
/// behavior in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Wrap a raw backend id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing fragment used for compact display (`#a1b2c3d4`).
    ///
    /// The id is opaque, so the cut counts characters, not bytes.
    #[must_use]
    pub fn short(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(7)
            .map_or(0, |(offset, _)| offset);
        &self.0[start..]
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// A support ticket as delivered by the snapshot fetch and the change stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub created_at: DateTime<Utc>,
    pub description: String,
    /// Classification label, e.g. `Facturación`. Set only by the classifier.
    #[serde(default)]
    pub category: Option<String>,
    /// Sentiment label, e.g. `Negativo`. Same provenance as `category`.
    #[serde(default)]
    pub sentiment: Option<String>,
    /// False until the classifier completes; monotonic under normal operation.
    #[serde(default)]
    pub processed: bool,
}

/// Coarse reading of a sentiment label, for display accents only.
///
/// The backend vocabulary is Spanish (`Positivo`/`Neutral`/`Negativo`) but
/// English labels are accepted too. Unknown labels stay unknown; the raw
/// string is always what gets displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentTone {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl SentimentTone {
    /// Classify an optional raw sentiment label.
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return Self::Unknown;
        };
        match label.trim().to_lowercase().as_str() {
            "positivo" | "positive" => Self::Positive,
            "negativo" | "negative" => Self::Negative,
            "neutral" => Self::Neutral,
            _ => Self::Unknown,
        }
    }

    /// Single-character accent used by the pretty renderer.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Positive => "+",
            Self::Negative => "-",
            Self::Neutral => "=",
            Self::Unknown => "?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SentimentTone, Ticket, TicketId};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ticket_deserializes_wire_payload() {
        let json = r#"{
            "id": "b9f2c6de-0001",
            "created_at": "2025-03-01T09:30:00+00:00",
            "description": "la app no carga",
            "category": "Técnico",
            "sentiment": "Negativo",
            "processed": true
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id.as_str(), "b9f2c6de-0001");
        assert_eq!(ticket.category.as_deref(), Some("Técnico"));
        assert!(ticket.processed);
    }

    #[test]
    fn unprocessed_ticket_defaults_classifier_fields() {
        let json = r#"{
            "id": "t-1",
            "created_at": "2025-03-01T09:30:00Z",
            "description": "hola"
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert!(ticket.category.is_none());
        assert!(ticket.sentiment.is_none());
        assert!(!ticket.processed);
    }

    #[test]
    fn ticket_roundtrips_through_json() {
        let ticket = Ticket {
            id: TicketId::new("abc-123"),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            description: "no puedo pagar".to_string(),
            category: Some("Facturación".to_string()),
            sentiment: Some("Neutral".to_string()),
            processed: true,
        };
        let json = serde_json::to_string(&ticket).unwrap();
        let back: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(ticket, back);
    }

    #[test]
    fn short_id_takes_trailing_fragment() {
        assert_eq!(TicketId::new("0123456789abcdef").short(), "89abcdef");
        assert_eq!(TicketId::new("tiny").short(), "tiny");
    }

    #[test]
    fn short_id_counts_characters_not_bytes() {
        // Multi-byte characters near the cut must not split.
        assert_eq!(TicketId::new("a€bcdefgh").short(), "€bcdefgh");
        assert_eq!(TicketId::new("ticket-número-42").short(), "úmero-42");
        assert_eq!(TicketId::new("ñ").short(), "ñ");
        assert_eq!(TicketId::new("").short(), "");
    }

    #[test]
    fn sentiment_tone_accepts_both_vocabularies() {
        assert_eq!(
            SentimentTone::from_label(Some("Negativo")),
            SentimentTone::Negative
        );
        assert_eq!(
            SentimentTone::from_label(Some("positive")),
            SentimentTone::Positive
        );
        assert_eq!(
            SentimentTone::from_label(Some("NEUTRAL")),
            SentimentTone::Neutral
        );
        assert_eq!(
            SentimentTone::from_label(Some("enfadado")),
            SentimentTone::Unknown
        );
        assert_eq!(SentimentTone::from_label(None), SentimentTone::Unknown);
    }
}
