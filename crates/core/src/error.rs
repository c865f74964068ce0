//! Fault classification shared by every Skiff error type.

use std::fmt;

/// Which party a fault is attributed to.
///
/// Each crate's error enum maps its variants onto one of these via a
/// `kind()` method, so callers can branch on the class of failure without
/// matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Caller misuse, detectable without a remote call.
    User,
    /// Internal consistency violation in data received from the remote service.
    System,
    /// The remote service has no matching record.
    NotFound,
    /// Opaque failure surfaced by the remote collaborator.
    Network,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user fault"),
            Self::System => write!(f, "system fault"),
            Self::NotFound => write!(f, "not found"),
            Self::Network => write!(f, "network fault"),
        }
    }
}
