//! Bootstrap & Native Registry
//!
//! The embedding process hands us a JSON payload mapping exported function
//! names to addresses. The registry resolves the required entries into
//! callable handles once, at load time, and is immutable afterwards; every
//! component that calls natives gets it by `Arc`, never through a global.

use std::collections::HashMap;
use std::ffi::{CStr, CString, c_char};
use std::sync::Arc;

use spadework_script::{NativeHooks, QuickJsEvaluator};

use crate::bridge::EventBridge;
use crate::config::HostConfig;
use crate::error::{HostError, Result};
use crate::events::EventRegistry;
use crate::reload::ReloadOrchestrator;

/// Link self-test exported by the host: takes a message, returns a code.
pub const GREETING_ENTRY: &str = "host_greeting";

/// Disconnects a player by slot id.
pub const KICK_ENTRY: &str = "kick_player_by_id";

type GreetFn = unsafe extern "C" fn(*const c_char) -> i32;
type KickFn = unsafe extern "C" fn(u8);

/// Resolved host-exported functions. Built once at load; any missing
/// required entry is fatal to the whole bootstrap.
pub struct NativeRegistry {
    greet: GreetFn,
    kick: KickFn,
    entries: usize,
}

impl NativeRegistry {
    /// Parse the textual registry and resolve the required entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let table: HashMap<String, u64> = serde_json::from_str(json)?;

        let greet = resolve(&table, GREETING_ENTRY)?;
        let kick = resolve(&table, KICK_ENTRY)?;

        // The addresses come from the host's own export table; trusting
        // them is the entire contract of this boundary.
        Ok(Self {
            greet: unsafe { std::mem::transmute::<usize, GreetFn>(greet) },
            kick: unsafe { std::mem::transmute::<usize, KickFn>(kick) },
            entries: table.len(),
        })
    }

    /// Build a registry straight from function pointers. Used by the
    /// standalone binary and tests, where no embedding process exists.
    pub fn from_fns(greet: GreetFn, kick: KickFn) -> Self {
        Self {
            greet,
            kick,
            entries: 2,
        }
    }

    /// Built-in natives that only log. Lets the host run for script
    /// development without an embedding process.
    pub fn loopback() -> Self {
        extern "C" fn loopback_greet(message: *const c_char) -> i32 {
            if message.is_null() {
                return -1;
            }
            let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
            tracing::info!(target: "spadework.native", "greet: {}", text);
            0
        }

        extern "C" fn loopback_kick(id: u8) {
            tracing::info!(target: "spadework.native", "kick player {}", id);
        }

        Self::from_fns(loopback_greet, loopback_kick)
    }

    /// Call the host's greeting entry. Messages with interior NULs cannot
    /// cross the boundary and report -1.
    pub fn greet(&self, message: &str) -> i32 {
        let Ok(message) = CString::new(message) else {
            return -1;
        };
        unsafe { (self.greet)(message.as_ptr()) }
    }

    /// Kick a player by slot id through the host.
    pub fn kick(&self, id: u8) {
        unsafe { (self.kick)(id) }
    }

    /// Number of entries the host exported (resolved or not).
    pub fn entries(&self) -> usize {
        self.entries
    }
}

fn resolve(table: &HashMap<String, u64>, name: &str) -> Result<usize> {
    let address = *table
        .get(name)
        .ok_or_else(|| HostError::MissingNative(name.to_string()))?;
    if address == 0 {
        return Err(HostError::InvalidNativeAddress(name.to_string()));
    }
    Ok(address as usize)
}

/// The assembled script host: registry, event point, bridge, orchestrator.
pub struct Host {
    registry: Arc<NativeRegistry>,
    events: Arc<EventRegistry>,
    bridge: Arc<EventBridge>,
    orchestrator: Arc<ReloadOrchestrator<QuickJsEvaluator>>,
}

impl Host {
    pub fn new(config: HostConfig, registry: Arc<NativeRegistry>) -> Self {
        let events = Arc::new(EventRegistry::new());

        let greet_registry = registry.clone();
        let kick_registry = registry.clone();
        let natives = NativeHooks {
            greet: Arc::new(move |message: &str| greet_registry.greet(message)),
            kick: Arc::new(move |id: u8| kick_registry.kick(id)),
        };

        let evaluator = Arc::new(QuickJsEvaluator::with_natives(natives));
        let bridge = Arc::new(EventBridge::new(
            events.clone(),
            Some(registry.clone()),
            &config,
        ));
        let orchestrator = Arc::new(ReloadOrchestrator::new(config, evaluator, bridge.clone()));

        Self {
            registry,
            events,
            bridge,
            orchestrator,
        }
    }

    pub fn registry(&self) -> &Arc<NativeRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &Arc<EventRegistry> {
        &self.events
    }

    pub fn orchestrator(&self) -> &Arc<ReloadOrchestrator<QuickJsEvaluator>> {
        &self.orchestrator
    }

    /// Reload every existing script once, then keep watching. Runs until
    /// the future is dropped.
    pub async fn run(&self) -> Result<()> {
        self.orchestrator.scan_existing().await;
        self.run_watch().await
    }

    /// The watch loop alone, without the startup scan.
    pub async fn run_watch(&self) -> Result<()> {
        self.orchestrator.clone().watch().await
    }

    /// Best-effort teardown: cancel pending deferred kicks.
    pub fn shutdown(&self) {
        self.bridge.cancel_pending_kicks();
    }
}

/// Host entry point: parse the native registry, run the link self-test,
/// assemble the host. A missing required entry is fatal.
pub fn on_load(registry_json: &str, config: HostConfig) -> Result<Host> {
    let registry = Arc::new(NativeRegistry::from_json(registry_json)?);

    let reply = registry.greet("Hello World");
    tracing::info!(
        "script host online: {} native entries, greeting replied {}",
        registry.entries(),
        reply
    );

    Ok(Host::new(config, registry))
}

/// Host exit point. Logs only; never fails.
pub fn on_unload(host: &Host) {
    host.shutdown();
    tracing::info!("script host unloading");
}
