//! Capability Hook Traits
//!
//! A script's execution yields up to two capability objects: a protocol
//! handler and a connection handler. The host only sees them through these
//! traits, so the event registry stays statically typed no matter what
//! engine produced the handlers.

use std::net::IpAddr;
use std::sync::Arc;

use crate::ConnectionDecision;

/// Error raised by a handler invocation (engine fault, thrown exception).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Connection lifecycle hooks exposed by a script.
///
/// Both hooks are optional on the script side; an absent `preConnect` is
/// reported as `Undecided` and an absent `postConnect` is a no-op.
pub trait ConnectionHooks: Send + Sync {
    /// Ask the handler whether `address` may connect.
    fn pre_connect(&self, address: IpAddr) -> Result<ConnectionDecision, HookError>;

    /// Notify the handler that the connection was resolved. The handler may
    /// flip `allow` through the mutable reference; the caller observes the
    /// final value.
    fn post_connect(&self, allow: &mut bool, address: IpAddr, id: u8) -> Result<(), HookError>;
}

/// Protocol-level hooks exposed by a script. No hook is required; the host
/// registers the handler and can probe which hooks it carries.
pub trait ProtocolHooks: Send + Sync {
    fn has_hook(&self, name: &str) -> bool;
}

/// The capability pair extracted from a successful script execution. Either
/// member may be absent.
#[derive(Clone, Default)]
pub struct ExecutionOutcome {
    pub protocol: Option<Arc<dyn ProtocolHooks>>,
    pub connection: Option<Arc<dyn ConnectionHooks>>,
}

impl ExecutionOutcome {
    pub fn is_empty(&self) -> bool {
        self.protocol.is_none() && self.connection.is_none()
    }
}

impl std::fmt::Debug for ExecutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionOutcome")
            .field("protocol", &self.protocol.is_some())
            .field("connection", &self.connection.is_some())
            .finish()
    }
}
