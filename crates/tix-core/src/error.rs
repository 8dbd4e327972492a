use std::fmt;

/// Machine-readable error codes shared across the dashboard.
///
/// The sync layer maps its typed errors onto these for logs and JSON
/// output; codes are stable for scripting against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalid,
    ApiUnreachable,
    ApiRejected,
    SnapshotFailed,
    MalformedEvent,
    StreamDisconnected,
    DeleteInFlight,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigInvalid => "E1001",
            Self::ApiUnreachable => "E2001",
            Self::ApiRejected => "E2002",
            Self::SnapshotFailed => "E3001",
            Self::MalformedEvent => "E3002",
            Self::StreamDisconnected => "E3003",
            Self::DeleteInFlight => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigInvalid => "Invalid API configuration",
            Self::ApiUnreachable => "Backend unreachable",
            Self::ApiRejected => "Backend rejected the request",
            Self::SnapshotFailed => "Snapshot fetch failed",
            Self::MalformedEvent => "Malformed change event",
            Self::StreamDisconnected => "Change stream disconnected",
            Self::DeleteInFlight => "Delete already in flight",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid => Some("Check TIX_API_URL and retry."),
            Self::ApiUnreachable => Some("Verify the backend is running and reachable."),
            Self::ApiRejected => None,
            Self::SnapshotFailed => Some("The feed retries automatically; check backend logs."),
            Self::MalformedEvent => Some("The event was dropped; a resync restores consistency."),
            Self::StreamDisconnected => {
                Some("Reconnection is automatic; stale data stays browsable meanwhile.")
            }
            Self::DeleteInFlight => Some("Wait for the pending delete to finish."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigInvalid,
            ErrorCode::ApiUnreachable,
            ErrorCode::ApiRejected,
            ErrorCode::SnapshotFailed,
            ErrorCode::MalformedEvent,
            ErrorCode::StreamDisconnected,
            ErrorCode::DeleteInFlight,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::StreamDisconnected.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }
}
