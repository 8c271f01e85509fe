//! Evaluator Seam
//!
//! The reload pipeline drives scripts only through this trait, so the
//! engine stays pluggable and the pipeline stays testable without a real
//! interpreter.

use std::path::Path;

use spadework_types::ExecutionOutcome;

use crate::compiler::{CompileError, CompiledScript, ScriptCompiler};
use crate::executor::{ExecError, ScriptExecutor};
use crate::globals::NativeHooks;

/// A dynamic-evaluation facility: compile source against an optional
/// previous unit, then execute compiled units.
pub trait Evaluator: Send + Sync + 'static {
    /// The compiled representation this evaluator produces. Must be cheap
    /// to clone; the cache hands out clones.
    type Unit: Clone + Send + Sync + 'static;

    fn compile(
        &self,
        source: &str,
        previous: Option<&Self::Unit>,
        origin: &Path,
    ) -> Result<Self::Unit, CompileError>;

    fn execute(&self, unit: &Self::Unit) -> Result<ExecutionOutcome, ExecError>;
}

/// The QuickJS-backed evaluator used in production.
#[derive(Default)]
pub struct QuickJsEvaluator {
    compiler: ScriptCompiler,
}

impl QuickJsEvaluator {
    pub fn new() -> Self {
        Self {
            compiler: ScriptCompiler::new(),
        }
    }

    /// Install native hooks (`game.kick`, `game.greet`) into every fresh
    /// script context.
    pub fn with_natives(natives: NativeHooks) -> Self {
        Self {
            compiler: ScriptCompiler::with_natives(natives),
        }
    }
}

impl Evaluator for QuickJsEvaluator {
    type Unit = CompiledScript;

    fn compile(
        &self,
        source: &str,
        previous: Option<&Self::Unit>,
        origin: &Path,
    ) -> Result<Self::Unit, CompileError> {
        self.compiler.compile(source, previous, origin)
    }

    fn execute(&self, unit: &Self::Unit) -> Result<ExecutionOutcome, ExecError> {
        ScriptExecutor::execute(unit)
    }
}
