//! Connection Event Multicast
//!
//! The host's pre/post connection event point. Handlers register per script
//! path; re-registration replaces in place so a reloaded script keeps its
//! position in the dispatch order.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use spadework_types::{ConnectionDecision, ConnectionHooks, ExecutionOutcome, ProtocolHooks};

struct Registration {
    script: PathBuf,
    protocol: Option<Arc<dyn ProtocolHooks>>,
    connection: Option<Arc<dyn ConnectionHooks>>,
}

/// Multicast registration point for script handlers.
#[derive(Default)]
pub struct EventRegistry {
    handlers: RwLock<Vec<Registration>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handlers extracted from `script`.
    pub fn register(&self, script: &Path, outcome: &ExecutionOutcome) {
        let mut handlers = self.handlers.write();
        let registration = Registration {
            script: script.to_path_buf(),
            protocol: outcome.protocol.clone(),
            connection: outcome.connection.clone(),
        };

        if let Some(existing) = handlers.iter_mut().find(|r| r.script == script) {
            *existing = registration;
        } else {
            handlers.push(registration);
        }
    }

    pub fn unregister(&self, script: &Path) {
        self.handlers.write().retain(|r| r.script != script);
    }

    /// Ask every registered connection handler, in registration order,
    /// whether `address` may connect. The decision starts `Undecided`; a
    /// handler with no opinion leaves the accumulator, any other answer
    /// replaces it. Every handler runs, no short-circuit; a faulting
    /// handler is logged and skipped.
    pub fn fire_pre_connect(&self, address: IpAddr) -> ConnectionDecision {
        let handlers = self.handlers.read();
        let mut decision = ConnectionDecision::default();

        for registration in handlers.iter() {
            let Some(connection) = &registration.connection else {
                continue;
            };
            match connection.pre_connect(address) {
                Ok(answer) => decision = decision.fold(answer),
                Err(e) => tracing::warn!(
                    "preConnect handler from {} faulted: {}",
                    registration.script.display(),
                    e
                ),
            }
        }

        decision
    }

    /// Tell every registered connection handler the connection was resolved.
    /// All handlers share the same mutable decision.
    pub fn fire_post_connect(&self, allow: &mut bool, address: IpAddr, id: u8) {
        let handlers = self.handlers.read();

        for registration in handlers.iter() {
            let Some(connection) = &registration.connection else {
                continue;
            };
            if let Err(e) = connection.post_connect(allow, address, id) {
                tracing::warn!(
                    "postConnect handler from {} faulted: {}",
                    registration.script.display(),
                    e
                );
            }
        }
    }

    /// The protocol handler registered by `script`, if any.
    pub fn protocol_for(&self, script: &Path) -> Option<Arc<dyn ProtocolHooks>> {
        self.handlers
            .read()
            .iter()
            .find(|r| r.script == script)
            .and_then(|r| r.protocol.clone())
    }

    /// Number of scripts with a registered connection handler.
    pub fn connection_count(&self) -> usize {
        self.handlers
            .read()
            .iter()
            .filter(|r| r.connection.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    use spadework_types::HookError;

    const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    /// Scripted fake: answers with a fixed decision and records the call.
    struct FakeConnection {
        name: &'static str,
        answer: ConnectionDecision,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ConnectionHooks for FakeConnection {
        fn pre_connect(&self, _address: IpAddr) -> Result<ConnectionDecision, HookError> {
            self.log.lock().unwrap().push(self.name);
            Ok(self.answer)
        }

        fn post_connect(
            &self,
            allow: &mut bool,
            _address: IpAddr,
            _id: u8,
        ) -> Result<(), HookError> {
            self.log.lock().unwrap().push(self.name);
            if self.answer == ConnectionDecision::Deny {
                *allow = false;
            }
            Ok(())
        }
    }

    fn outcome_with(
        name: &'static str,
        answer: ConnectionDecision,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> ExecutionOutcome {
        ExecutionOutcome {
            protocol: None,
            connection: Some(Arc::new(FakeConnection {
                name,
                answer,
                log: log.clone(),
            })),
        }
    }

    #[test]
    fn test_fold_runs_every_handler_in_order() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register(
            Path::new("a.js"),
            &outcome_with("a", ConnectionDecision::Allow, &log),
        );
        registry.register(
            Path::new("b.js"),
            &outcome_with("b", ConnectionDecision::Deny, &log),
        );
        registry.register(
            Path::new("c.js"),
            &outcome_with("c", ConnectionDecision::Undecided, &log),
        );

        // Deny wrote last with an opinion; the trailing Undecided keeps it.
        let decision = registry.fire_pre_connect(LOOPBACK);
        assert_eq!(decision, ConnectionDecision::Deny);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_handlers_is_undecided() {
        let registry = EventRegistry::new();
        assert_eq!(
            registry.fire_pre_connect(LOOPBACK),
            ConnectionDecision::Undecided
        );
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register(
            Path::new("a.js"),
            &outcome_with("a1", ConnectionDecision::Allow, &log),
        );
        registry.register(
            Path::new("b.js"),
            &outcome_with("b", ConnectionDecision::Undecided, &log),
        );
        // Reload of a.js replaces its handler but keeps its slot.
        registry.register(
            Path::new("a.js"),
            &outcome_with("a2", ConnectionDecision::Allow, &log),
        );

        registry.fire_pre_connect(LOOPBACK);
        assert_eq!(*log.lock().unwrap(), vec!["a2", "b"]);
        assert_eq!(registry.connection_count(), 2);
    }

    #[test]
    fn test_post_connect_shares_the_decision() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register(
            Path::new("a.js"),
            &outcome_with("a", ConnectionDecision::Undecided, &log),
        );
        registry.register(
            Path::new("b.js"),
            &outcome_with("b", ConnectionDecision::Deny, &log),
        );

        let mut allow = true;
        registry.fire_post_connect(&mut allow, LOOPBACK, 4);
        assert!(!allow);
    }

    #[test]
    fn test_unregister() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register(
            Path::new("a.js"),
            &outcome_with("a", ConnectionDecision::Deny, &log),
        );
        registry.unregister(Path::new("a.js"));

        assert_eq!(registry.connection_count(), 0);
        assert_eq!(
            registry.fire_pre_connect(LOOPBACK),
            ConnectionDecision::Undecided
        );
    }
}
