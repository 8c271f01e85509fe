//! Engine Context
//!
//! Wraps one QuickJS runtime + context pair. A context is created per script
//! file on its first successful-or-attempted compile and is then reused by
//! every chained recompile of that file, so top-level bindings persist.

use rquickjs::{CaughtError, Context, Runtime};

use crate::globals::{self, NativeHooks};

/// Errors from the engine layer itself (not script diagnostics or faults).
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to create runtime: {0}")]
    RuntimeCreation(String),

    #[error("javascript error: {0}")]
    Js(String),

    #[error("runtime error: {0}")]
    Runtime(#[from] rquickjs::Error),
}

/// One QuickJS runtime/context pair.
///
/// The `parallel` feature makes both handles `Send + Sync`; access is
/// serialized by `Context::with`, so a context shared between a compiled
/// unit and the handler handles extracted from it stays coherent.
pub struct ScriptEngine {
    runtime: Runtime,
    context: Context,
}

impl ScriptEngine {
    /// Create a fresh engine context with the script-visible globals
    /// installed.
    pub fn new(natives: Option<&NativeHooks>) -> Result<Self, ScriptError> {
        let runtime =
            Runtime::new().map_err(|e| ScriptError::RuntimeCreation(e.to_string()))?;
        let context =
            Context::full(&runtime).map_err(|e| ScriptError::RuntimeCreation(e.to_string()))?;

        context
            .with(|ctx| globals::register_host_globals(&ctx, natives))
            .map_err(|e| ScriptError::Js(e.to_string()))?;

        Ok(Self { runtime, context })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Run garbage collection on the underlying runtime.
    pub fn gc(&self) {
        self.runtime.run_gc();
    }
}

/// Render a caught engine error for logs and fault messages: message plus
/// stack for real exceptions, best-effort text otherwise.
pub(crate) fn describe_caught(err: &CaughtError<'_>) -> String {
    match err {
        CaughtError::Exception(exc) => {
            let message = exc.message().unwrap_or_else(|| "unknown error".to_string());
            match exc.stack() {
                Some(stack) if !stack.is_empty() => format!("{message}\n{stack}"),
                _ => message,
            }
        }
        CaughtError::Value(value) => format!("exception value: {:?}", value.type_of()),
        CaughtError::Error(e) => e.to_string(),
    }
}
