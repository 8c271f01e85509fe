//! Script Executor
//!
//! Runs a successfully compiled unit to completion in its own context and
//! extracts the capability pair from the script's completion value. All
//! runtime faults, including user-script exceptions, are captured; nothing
//! escapes to the caller as a panic.

use std::sync::Arc;

use rquickjs::{CatchResultExt, Ctx, Object, Persistent, Type, Value};

use spadework_types::{ConnectionHooks, ExecutionOutcome, ProtocolHooks};

use crate::compiler::CompiledScript;
use crate::engine::{ScriptEngine, ScriptError, describe_caught};
use crate::handles::{JsConnectionHandle, JsProtocolHandle};

/// Execution failure for one reload cycle. No retry.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("script fault: {0}")]
    Fault(String),

    #[error(transparent)]
    Engine(#[from] ScriptError),
}

/// Stateless executor; all persistent state lives in the unit's context.
pub struct ScriptExecutor;

impl ScriptExecutor {
    /// Evaluate the unit as global, non-strict code. The completion value is
    /// expected to be the capability pair, either `[protocol, connection]`
    /// or `{ protocol, connection }`; both members are optional.
    pub fn execute(unit: &CompiledScript) -> Result<ExecutionOutcome, ExecError> {
        unit.engine().context().with(|ctx| {
            let mut options = rquickjs::context::EvalOptions::default();
            options.global = true;
            options.strict = false;
            options.backtrace_barrier = true;

            let value = ctx
                .eval_with_options::<Value, _>(unit.source(), options)
                .catch(&ctx)
                .map_err(|err| ExecError::Fault(describe_caught(&err)))?;

            Ok(extract_outcome(&ctx, value, unit.engine()))
        })
    }
}

/// Pull the capability pair out of the script's completion value.
fn extract_outcome<'js>(
    ctx: &Ctx<'js>,
    value: Value<'js>,
    engine: &Arc<ScriptEngine>,
) -> ExecutionOutcome {
    match value.type_of() {
        Type::Undefined | Type::Null => ExecutionOutcome::default(),
        Type::Array => {
            let Ok(pair) = value.get::<rquickjs::Array>() else {
                return ExecutionOutcome::default();
            };
            ExecutionOutcome {
                protocol: pair
                    .get::<Value>(0)
                    .ok()
                    .and_then(|v| protocol_slot(ctx, v, engine)),
                connection: pair
                    .get::<Value>(1)
                    .ok()
                    .and_then(|v| connection_slot(ctx, v, engine)),
            }
        }
        Type::Object => {
            let Ok(pair) = value.get::<Object>() else {
                return ExecutionOutcome::default();
            };
            ExecutionOutcome {
                protocol: pair
                    .get::<_, Value>("protocol")
                    .ok()
                    .and_then(|v| protocol_slot(ctx, v, engine)),
                connection: pair
                    .get::<_, Value>("connection")
                    .ok()
                    .and_then(|v| connection_slot(ctx, v, engine)),
            }
        }
        other => {
            tracing::warn!(
                "script completion value is {:?}, expected the capability pair; ignoring",
                other
            );
            ExecutionOutcome::default()
        }
    }
}

fn handler_object<'js>(value: Value<'js>) -> Option<Object<'js>> {
    if value.type_of() == Type::Object {
        value.get().ok()
    } else {
        None
    }
}

fn protocol_slot<'js>(
    ctx: &Ctx<'js>,
    value: Value<'js>,
    engine: &Arc<ScriptEngine>,
) -> Option<Arc<dyn ProtocolHooks>> {
    let object = handler_object(value)?;
    let persistent: Persistent<Object<'static>> = Persistent::save(ctx, object);
    Some(Arc::new(JsProtocolHandle::new(engine.clone(), persistent)))
}

fn connection_slot<'js>(
    ctx: &Ctx<'js>,
    value: Value<'js>,
    engine: &Arc<ScriptEngine>,
) -> Option<Arc<dyn ConnectionHooks>> {
    let object = handler_object(value)?;
    let persistent: Persistent<Object<'static>> = Persistent::save(ctx, object);
    Some(Arc::new(JsConnectionHandle::new(engine.clone(), persistent)))
}
