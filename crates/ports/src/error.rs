//! Error types for port operations.
//!
//! Every port method returns `Result<_, PortsError>`. Drivers map their
//! transport errors into these variants so callers can classify a failure
//! without knowing the concrete backend.

use std::time::Duration;

use skiff_core::FaultKind;

/// Error type for all port operations.
///
/// Distinguishes missing records from transport and remote-side failures.
/// Nothing in Skiff retries; [`is_retryable`](Self::is_retryable) is advice
/// for the embedding application.
#[derive(Debug, thiserror::Error)]
pub enum PortsError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (e.g. "workflow", "execution").
        entity: String,
        /// Identifier that was looked up.
        id: String,
    },

    /// Backend connection failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Request exceeded its deadline.
    #[error("timeout: {operation} after {duration:?}")]
    Timeout {
        /// Name of the operation that timed out.
        operation: String,
        /// How long was waited before giving up.
        duration: Duration,
    },

    /// The remote service rejected the request.
    #[error("remote error {code}: {message}")]
    Remote {
        /// Status code reported by the service.
        code: String,
        /// Message reported by the service.
        message: String,
    },

    /// A response could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Catch-all internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PortsError {
    /// Convenience constructor for [`PortsError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`PortsError::Timeout`].
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Convenience constructor for [`PortsError::Remote`].
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for transient errors a caller may retry.
    ///
    /// Currently [`Connection`](Self::Connection) and [`Timeout`](Self::Timeout).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout { .. })
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::NotFound { .. } => FaultKind::NotFound,
            Self::Serialization(_) => FaultKind::System,
            Self::Connection(_) | Self::Timeout { .. } | Self::Remote { .. } | Self::Internal(_) => {
                FaultKind::Network
            }
        }
    }
}

impl From<serde_json::Error> for PortsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Construction ────────────────────────────────────────────────────

    #[test]
    fn not_found_convenience() {
        let err = PortsError::not_found("execution", "p/d/abc");
        match &err {
            PortsError::NotFound { entity, id } => {
                assert_eq!(entity, "execution");
                assert_eq!(id, "p/d/abc");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(err.kind(), FaultKind::NotFound);
    }

    #[test]
    fn timeout_convenience() {
        let dur = Duration::from_secs(5);
        let err = PortsError::timeout("get_execution", dur);
        match &err {
            PortsError::Timeout {
                operation,
                duration,
            } => {
                assert_eq!(operation, "get_execution");
                assert_eq!(*duration, dur);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    // ── Classification ──────────────────────────────────────────────────

    #[test]
    fn transport_failures_are_retryable_network_faults() {
        let conn = PortsError::Connection("refused".into());
        assert!(conn.is_retryable());
        assert_eq!(conn.kind(), FaultKind::Network);

        let timeout = PortsError::timeout("op", Duration::from_secs(1));
        assert!(timeout.is_retryable());
        assert_eq!(timeout.kind(), FaultKind::Network);
    }

    #[test]
    fn remote_rejection_is_not_retryable() {
        let err = PortsError::remote("INVALID_ARGUMENT", "bad project");
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), FaultKind::Network);
    }

    #[test]
    fn not_found_is_not_retryable() {
        assert!(!PortsError::not_found("x", "1").is_retryable());
    }

    #[test]
    fn decode_failure_is_system_fault() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: PortsError = serde_err.into();
        assert!(matches!(err, PortsError::Serialization(ref msg) if !msg.is_empty()));
        assert_eq!(err.kind(), FaultKind::System);
    }

    // ── Display ─────────────────────────────────────────────────────────

    #[test]
    fn display_messages() {
        assert_eq!(
            PortsError::not_found("workflow", "w-1").to_string(),
            "workflow not found: w-1"
        );
        assert_eq!(
            PortsError::remote("INTERNAL", "boom").to_string(),
            "remote error INTERNAL: boom"
        );
        assert_eq!(
            PortsError::Internal("something broke".into()).to_string(),
            "internal error: something broke"
        );
    }
}
