//! Event Bridge
//!
//! Wires the capability pair a script returned into the event registry and
//! fires a simulated connection sequence on every successful reload, so a
//! script author can exercise their hooks by saving the file, no real
//! client needed.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use spadework_types::{ConnectionDecision, ConnectionHooks, ExecutionOutcome};

use crate::bootstrap::NativeRegistry;
use crate::config::HostConfig;
use crate::events::EventRegistry;

/// Synthetic ids wrap inside this span.
const SIMULATED_ID_SPAN: u8 = 0x20;

const SIMULATED_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// What one simulated connection sequence produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationReport {
    /// The handler's pre-connect verdict.
    pub decision: ConnectionDecision,
    /// The final resolved decision after `postConnect` ran.
    pub allowed: bool,
    /// Synthetic player id used for the sequence.
    pub id: u8,
}

/// Bridges script handlers into the host's connection lifecycle.
pub struct EventBridge {
    events: Arc<EventRegistry>,
    natives: Option<Arc<NativeRegistry>>,
    kick_delay: Duration,
    next_id: AtomicU8,
    pending_kicks: Mutex<HashMap<u8, JoinHandle<()>>>,
}

impl EventBridge {
    pub fn new(
        events: Arc<EventRegistry>,
        natives: Option<Arc<NativeRegistry>>,
        config: &HostConfig,
    ) -> Self {
        Self {
            events,
            natives,
            kick_delay: Duration::from_millis(config.kick_delay_ms),
            next_id: AtomicU8::new(0),
            pending_kicks: Mutex::new(HashMap::new()),
        }
    }

    /// Register (or replace) the handlers extracted from `script`.
    pub fn install(&self, script: &Path, outcome: &ExecutionOutcome) {
        self.events.register(script, outcome);
        tracing::info!(
            "script {} registered handlers (protocol: {}, connection: {})",
            script.display(),
            outcome.protocol.is_some(),
            outcome.connection.is_some(),
        );
    }

    /// Run the full simulated connection lifecycle against one handler.
    ///
    /// Absent handler or absent hook means `Undecided`, which resolves
    /// fail-open. A denied connection schedules the deferred kick.
    pub fn simulate_connect(
        &self,
        connection: Option<&Arc<dyn ConnectionHooks>>,
    ) -> SimulationReport {
        let decision = match connection {
            Some(handler) => handler.pre_connect(SIMULATED_ADDRESS).unwrap_or_else(|e| {
                tracing::warn!("preConnect faulted during simulation: {}", e);
                ConnectionDecision::Undecided
            }),
            None => ConnectionDecision::Undecided,
        };

        let mut allow = decision.resolve(true);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) % SIMULATED_ID_SPAN;

        if let Some(handler) = connection {
            if let Err(e) = handler.post_connect(&mut allow, SIMULATED_ADDRESS, id) {
                tracing::warn!("postConnect faulted during simulation: {}", e);
            }
        }

        if !allow {
            self.schedule_kick(id);
        }

        let report = SimulationReport {
            decision,
            allowed: allow,
            id,
        };
        tracing::debug!("simulated connect: {:?}", report);
        report
    }

    /// Schedule the deferred kick for a denied connection. A newer schedule
    /// for the same id supersedes a pending one.
    fn schedule_kick(&self, id: u8) {
        let Some(natives) = self.natives.clone() else {
            return;
        };

        let delay = self.kick_delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            natives.kick(id);
        });

        let mut pending = self.pending_kicks.lock();
        if let Some(superseded) = pending.insert(id, task) {
            superseded.abort();
        }
    }

    /// Cancel every pending deferred kick. Used on unload.
    pub fn cancel_pending_kicks(&self) {
        for (_, task) in self.pending_kicks.lock().drain() {
            task.abort();
        }
    }
}
