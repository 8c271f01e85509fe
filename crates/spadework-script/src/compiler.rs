//! Script Compiler
//!
//! Turns source text (+ optional previous compilation) into a new compiled
//! unit plus a diagnostic set. The compiler never touches the cache; the
//! caller decides when a unit becomes authoritative.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rquickjs::{CatchResultExt, Value};

use crate::diagnostics::Diagnostic;
use crate::engine::{ScriptEngine, ScriptError};
use crate::globals::NativeHooks;

/// Compile failure. Blocking diagnostics are reported, not thrown; the
/// previous good unit stays authoritative.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("source is empty, nothing to compile")]
    EmptySource,

    #[error("compilation blocked by {} diagnostic(s)", .0.len())]
    Blocked(Vec<Diagnostic>),

    #[error(transparent)]
    Engine(#[from] ScriptError),
}

/// A successfully compiled script unit.
///
/// The unit is bound to an engine context. Units chained from the same file
/// share one context, which is how top-level declarations from earlier
/// successful versions stay visible to later ones. Cloning is cheap; all
/// heavy state is behind `Arc`.
#[derive(Clone)]
pub struct CompiledScript {
    path: Arc<PathBuf>,
    source: Arc<str>,
    engine: Arc<ScriptEngine>,
    generation: u64,
    diagnostics: Arc<Vec<Diagnostic>>,
}

impl CompiledScript {
    /// Identity of the script this unit was compiled from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 0 for a fresh compile, previous + 1 for a chained one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking diagnostics from the compile that produced this unit.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn engine(&self) -> &Arc<ScriptEngine> {
        &self.engine
    }
}

impl fmt::Debug for CompiledScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledScript")
            .field("path", &self.path)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Stateless compiler. All persistent state lives in the caller's cache.
#[derive(Default)]
pub struct ScriptCompiler {
    natives: Option<NativeHooks>,
}

impl ScriptCompiler {
    pub fn new() -> Self {
        Self { natives: None }
    }

    /// Native hooks are installed into every fresh context this compiler
    /// creates; chained compiles inherit whatever their context already has.
    pub fn with_natives(natives: NativeHooks) -> Self {
        Self {
            natives: Some(natives),
        }
    }

    /// Compile `source` for the file at `origin`, chaining to `previous`
    /// when given.
    ///
    /// The source is parsed without running any of it: the engine compiles
    /// the text as the body of a throwaway function value that is
    /// immediately discarded. Parse errors come back as blocking
    /// diagnostics with lines mapped to the script's own coordinates.
    pub fn compile(
        &self,
        source: &str,
        previous: Option<&CompiledScript>,
        origin: &Path,
    ) -> Result<CompiledScript, CompileError> {
        if source.is_empty() {
            return Err(CompileError::EmptySource);
        }

        let engine = match previous {
            Some(prev) => prev.engine().clone(),
            None => Arc::new(ScriptEngine::new(self.natives.as_ref())?),
        };

        // One wrapper line above the source, hence line_offset = 1.
        let wrapped = format!("(function() {{\n{source}\n}})");
        let check: Result<(), Diagnostic> = engine.context().with(|ctx| {
            match ctx.eval::<Value, _>(wrapped.as_str()).catch(&ctx) {
                Ok(_) => Ok(()),
                Err(err) => Err(Diagnostic::from_caught(&err, origin, 1)),
            }
        });

        if let Err(diagnostic) = check {
            return Err(CompileError::Blocked(vec![diagnostic]));
        }

        let generation = previous.map(|p| p.generation() + 1).unwrap_or(0);

        Ok(CompiledScript {
            path: Arc::new(origin.to_path_buf()),
            source: Arc::from(source),
            engine,
            generation,
            diagnostics: Arc::new(Vec::new()),
        })
    }
}
