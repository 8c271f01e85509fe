//! Spadework Script Engine
//!
//! QuickJS embedding for the script host. Each script file is compiled and
//! executed inside its own engine context; recompiling against a previous
//! unit reuses that unit's context, which is what lets top-level state
//! (`globalThis` bindings, `var` and function declarations) survive edits.
//!
//! # Architecture
//!
//! - [`ScriptCompiler`] validates source without running it and binds the
//!   new unit to the previous unit's context (incremental chaining).
//! - [`ScriptExecutor`] evaluates a compiled unit as global code; the
//!   script's completion value is the capability pair.
//! - Extracted handlers are persistent engine references implementing the
//!   hook traits from `spadework-types`, so they stay callable after later
//!   reloads until their context is dropped.
//! - The [`Evaluator`] trait is the seam the reload pipeline drives; the
//!   host never touches QuickJS directly.

mod compiler;
mod diagnostics;
mod engine;
mod evaluator;
mod executor;
mod globals;
mod handles;

pub use compiler::{CompileError, CompiledScript, ScriptCompiler};
pub use diagnostics::{Diagnostic, Severity, has_blocking, render_diagnostics};
pub use engine::{ScriptEngine, ScriptError};
pub use evaluator::{Evaluator, QuickJsEvaluator};
pub use executor::{ExecError, ScriptExecutor};
pub use globals::NativeHooks;
pub use handles::{JsConnectionHandle, JsProtocolHandle};
