//! Connection status, exposed independently of ticket data flow.

use serde::Serialize;
use std::fmt;

/// Lifecycle of one subscription:
/// `Connecting → Subscribed → {Reconnecting → Subscribed}* → Closed`.
///
/// Every entry into `Subscribed` is preceded by a fresh snapshot, because
/// events missed during a gap are not retransmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Subscribed,
    Reconnecting,
    Closed,
}

impl ConnectionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Subscribed => "subscribed",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        }
    }

    /// Whether live events are currently flowing.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Subscribed)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionStatus;

    #[test]
    fn only_subscribed_is_live() {
        assert!(ConnectionStatus::Subscribed.is_live());
        assert!(!ConnectionStatus::Connecting.is_live());
        assert!(!ConnectionStatus::Reconnecting.is_live());
        assert!(!ConnectionStatus::Closed.is_live());
    }

    #[test]
    fn renders_lowercase() {
        assert_eq!(ConnectionStatus::Reconnecting.to_string(), "reconnecting");
        assert_eq!(
            serde_json::to_string(&ConnectionStatus::Closed).unwrap(),
            "\"closed\""
        );
    }
}
