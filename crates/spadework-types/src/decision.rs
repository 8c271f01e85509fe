//! Connection Decision
//!
//! Tri-state answer to "should this connection be permitted". Handlers that
//! have no opinion return `Undecided`, which defers to the caller's default.

use serde::{Deserialize, Serialize};

/// Accumulating verdict for a connection attempt.
///
/// The wire values match the host's byte encoding: `Deny = 0`, `Allow = 1`,
/// `Undecided = 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ConnectionDecision {
    Deny = 0,
    Allow = 1,
    Undecided = 2,
}

impl Default for ConnectionDecision {
    fn default() -> Self {
        Self::Undecided
    }
}

impl ConnectionDecision {
    /// Collapse the tri-state into a boolean, mapping `Undecided` to the
    /// caller's default.
    pub fn resolve(self, default: bool) -> bool {
        match self {
            Self::Deny => false,
            Self::Allow => true,
            Self::Undecided => default,
        }
    }

    /// Lift a boolean verdict into a decision.
    pub fn from_allow(allow: bool) -> Self {
        if allow { Self::Allow } else { Self::Deny }
    }

    pub fn is_undecided(self) -> bool {
        matches!(self, Self::Undecided)
    }

    /// Fold another handler's opinion into this one. `Undecided` leaves the
    /// accumulator alone; anything else replaces it (last writer wins).
    pub fn fold(self, next: Self) -> Self {
        if next.is_undecided() { self } else { next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_undecided() {
        assert_eq!(ConnectionDecision::default(), ConnectionDecision::Undecided);
    }

    #[test]
    fn test_resolve() {
        assert!(!ConnectionDecision::Deny.resolve(true));
        assert!(ConnectionDecision::Allow.resolve(false));
        assert!(ConnectionDecision::Undecided.resolve(true));
        assert!(!ConnectionDecision::Undecided.resolve(false));
    }

    #[test]
    fn test_fold_keeps_last_opinion() {
        let d = ConnectionDecision::Undecided
            .fold(ConnectionDecision::Allow)
            .fold(ConnectionDecision::Undecided);
        assert_eq!(d, ConnectionDecision::Allow);

        let d = d.fold(ConnectionDecision::Deny);
        assert_eq!(d, ConnectionDecision::Deny);
    }

    #[test]
    fn test_from_allow() {
        assert_eq!(ConnectionDecision::from_allow(true), ConnectionDecision::Allow);
        assert_eq!(ConnectionDecision::from_allow(false), ConnectionDecision::Deny);
    }
}
