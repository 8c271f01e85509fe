//! Capability Handles
//!
//! Persistent references to the handler objects a script returned. A handle
//! stays callable across later reloads of any file; it goes stale only when
//! its engine context is dropped.

use std::net::IpAddr;
use std::sync::Arc;

use rquickjs::function::This;
use rquickjs::{CatchResultExt, Function, Object, Persistent, Type, Value};

use spadework_types::{ConnectionDecision, ConnectionHooks, HookError, ProtocolHooks};

use crate::engine::{ScriptEngine, describe_caught};

/// Connection handler extracted from a script.
pub struct JsConnectionHandle {
    // `object` is declared before `engine` so the persistent handle is
    // unrooted before this handle's `Arc<ScriptEngine>` can drop the last
    // runtime reference — QuickJS aborts if a `Persistent` outlives its
    // runtime.
    object: Persistent<Object<'static>>,
    engine: Arc<ScriptEngine>,
}

impl JsConnectionHandle {
    pub(crate) fn new(engine: Arc<ScriptEngine>, object: Persistent<Object<'static>>) -> Self {
        Self { engine, object }
    }
}

// SAFETY: The `Persistent` handle is only ever restored and used inside
// `engine.context().with(...)`, which serializes access through the runtime
// lock the `parallel` feature installs. This is the same invariant rquickjs
// relies on to make `Context`/`Runtime` `Send + Sync`, so the handle is safe
// to move and share across threads.
unsafe impl Send for JsConnectionHandle {}
unsafe impl Sync for JsConnectionHandle {}

impl ConnectionHooks for JsConnectionHandle {
    fn pre_connect(&self, address: IpAddr) -> Result<ConnectionDecision, HookError> {
        self.engine.context().with(|ctx| {
            let object = self
                .object
                .clone()
                .restore(&ctx)
                .map_err(|e| HookError::new(e.to_string()))?;

            let Ok(hook) = object.get::<_, Function>("preConnect") else {
                return Ok(ConnectionDecision::Undecided);
            };

            let result = hook
                .call::<_, Value>((This(object), address.to_string()))
                .catch(&ctx)
                .map_err(|err| HookError::new(describe_caught(&err)))?;

            Ok(decision_from_value(&result))
        })
    }

    fn post_connect(&self, allow: &mut bool, address: IpAddr, id: u8) -> Result<(), HookError> {
        self.engine.context().with(|ctx| {
            let object = self
                .object
                .clone()
                .restore(&ctx)
                .map_err(|e| HookError::new(e.to_string()))?;

            let Ok(hook) = object.get::<_, Function>("postConnect") else {
                return Ok(());
            };

            // The decision travels as a mutable `{ allow }` box so the hook
            // can flip it and the caller observes the final value.
            let decision = Object::new(ctx.clone()).map_err(|e| HookError::new(e.to_string()))?;
            decision
                .set("allow", *allow)
                .map_err(|e| HookError::new(e.to_string()))?;

            hook.call::<_, Value>((
                This(object),
                decision.clone(),
                address.to_string(),
                id as i32,
            ))
            .catch(&ctx)
            .map_err(|err| HookError::new(describe_caught(&err)))?;

            if let Ok(flipped) = decision.get::<_, bool>("allow") {
                *allow = flipped;
            }

            Ok(())
        })
    }
}

/// Protocol handler extracted from a script. No hook is required; the host
/// can probe what the handler carries.
pub struct JsProtocolHandle {
    // Same drop-order requirement as `JsConnectionHandle`: unroot the
    // persistent handle before releasing the engine reference.
    object: Persistent<Object<'static>>,
    engine: Arc<ScriptEngine>,
}

impl JsProtocolHandle {
    pub(crate) fn new(engine: Arc<ScriptEngine>, object: Persistent<Object<'static>>) -> Self {
        Self { engine, object }
    }
}

// SAFETY: see the `JsConnectionHandle` impls above — the `Persistent` is only
// touched under `engine.context().with(...)`, which serializes access.
unsafe impl Send for JsProtocolHandle {}
unsafe impl Sync for JsProtocolHandle {}

impl ProtocolHooks for JsProtocolHandle {
    fn has_hook(&self, name: &str) -> bool {
        self.engine.context().with(|ctx| {
            self.object
                .clone()
                .restore(&ctx)
                .map(|object| object.get::<_, Function>(name).is_ok())
                .unwrap_or(false)
        })
    }
}

fn decision_from_value(value: &Value<'_>) -> ConnectionDecision {
    match value.type_of() {
        Type::Bool => ConnectionDecision::from_allow(value.as_bool().unwrap_or(false)),
        Type::Undefined | Type::Null => ConnectionDecision::Undecided,
        // Accept the wire encoding too: 0 = deny, 1 = allow, 2 = undecided.
        Type::Int => match value.as_int() {
            Some(0) => ConnectionDecision::Deny,
            Some(1) => ConnectionDecision::Allow,
            Some(2) => ConnectionDecision::Undecided,
            other => {
                tracing::warn!("preConnect returned unexpected integer {:?}", other);
                ConnectionDecision::Undecided
            }
        },
        other => {
            tracing::warn!("preConnect returned unexpected {:?}", other);
            ConnectionDecision::Undecided
        }
    }
}
