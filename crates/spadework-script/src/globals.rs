//! Script-Visible Globals
//!
//! Registers the `game` namespace and a `console` shim in every fresh
//! engine context. Script output routes to tracing, never to the host's
//! stdout directly.

use std::sync::Arc;

use rquickjs::function::Rest;
use rquickjs::{Ctx, Function, Object, Result as JsResult};

/// Host-native entry points exposed to scripts. Built by the bootstrap from
/// the resolved native registry; absent in contexts created without one
/// (`game.kick` / `game.greet` are then not installed).
#[derive(Clone)]
pub struct NativeHooks {
    /// Link self-test: send a message to the host, get its reply code.
    pub greet: Arc<dyn Fn(&str) -> i32 + Send + Sync>,
    /// Disconnect a player by slot id.
    pub kick: Arc<dyn Fn(u8) + Send + Sync>,
}

impl std::fmt::Debug for NativeHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NativeHooks")
    }
}

/// Register the `game` global object and the console shim.
pub fn register_host_globals(ctx: &Ctx<'_>, natives: Option<&NativeHooks>) -> JsResult<()> {
    let globals = ctx.globals();

    register_console(ctx)?;

    let game = Object::new(ctx.clone())?;

    game.set("log", Function::new(ctx.clone(), |msg: String| {
        tracing::info!(target: "spadework.js", "{}", msg);
    })?)?;

    game.set("debug", Function::new(ctx.clone(), |msg: String| {
        tracing::debug!(target: "spadework.js", "{}", msg);
    })?)?;

    game.set("warn", Function::new(ctx.clone(), |msg: String| {
        tracing::warn!(target: "spadework.js", "{}", msg);
    })?)?;

    game.set("error", Function::new(ctx.clone(), |msg: String| {
        tracing::error!(target: "spadework.js", "{}", msg);
    })?)?;

    if let Some(natives) = natives {
        let kick = natives.kick.clone();
        game.set("kick", Function::new(ctx.clone(), move |id: i32| {
            if (0..=255).contains(&id) {
                (kick.as_ref())(id as u8);
            } else {
                tracing::warn!(target: "spadework.js", "game.kick: id {} out of range", id);
            }
        })?)?;

        let greet = natives.greet.clone();
        game.set("greet", Function::new(ctx.clone(), move |msg: String| -> i32 {
            (greet.as_ref())(&msg)
        })?)?;
    }

    globals.set("game", game)?;

    Ok(())
}

/// Register the console object with log, warn, error methods
fn register_console(ctx: &Ctx<'_>) -> JsResult<()> {
    let globals = ctx.globals();

    // Check if console already exists
    if globals.get::<_, Object>("console").is_ok() {
        return Ok(());
    }

    let console = Object::new(ctx.clone())?;

    console.set("log", Function::new(ctx.clone(), |args: Rest<String>| {
        let msg = args.0.join(" ");
        tracing::info!(target: "spadework.js.console", "{}", msg);
    })?)?;

    console.set("info", Function::new(ctx.clone(), |args: Rest<String>| {
        let msg = args.0.join(" ");
        tracing::info!(target: "spadework.js.console", "{}", msg);
    })?)?;

    console.set("warn", Function::new(ctx.clone(), |args: Rest<String>| {
        let msg = args.0.join(" ");
        tracing::warn!(target: "spadework.js.console", "{}", msg);
    })?)?;

    console.set("error", Function::new(ctx.clone(), |args: Rest<String>| {
        let msg = args.0.join(" ");
        tracing::error!(target: "spadework.js.console", "{}", msg);
    })?)?;

    console.set("debug", Function::new(ctx.clone(), |args: Rest<String>| {
        let msg = args.0.join(" ");
        tracing::debug!(target: "spadework.js.console", "{}", msg);
    })?)?;

    globals.set("console", console)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use rquickjs::{Context, Runtime, Value};

    #[test]
    fn test_register_globals() {
        let runtime = Runtime::new().unwrap();
        let ctx = Context::full(&runtime).unwrap();

        ctx.with(|ctx| {
            register_host_globals(&ctx, None).unwrap();

            let globals = ctx.globals();
            let game: Object = globals.get("game").unwrap();
            let _log: Function = game.get("log").unwrap();

            // No natives installed, so no kick
            assert!(game.get::<_, Function>("kick").is_err());
        });
    }

    #[test]
    fn test_native_hooks_reachable_from_script() {
        let kicked = Arc::new(AtomicU32::new(u32::MAX));
        let kicked_clone = kicked.clone();

        let natives = NativeHooks {
            greet: Arc::new(|_msg| 123),
            kick: Arc::new(move |id| {
                kicked_clone.store(id as u32, Ordering::SeqCst);
            }),
        };

        let runtime = Runtime::new().unwrap();
        let ctx = Context::full(&runtime).unwrap();

        ctx.with(|ctx| {
            register_host_globals(&ctx, Some(&natives)).unwrap();

            let reply: i32 = ctx.eval("game.greet('Hello World')").unwrap();
            assert_eq!(reply, 123);

            let _: Value = ctx.eval("game.kick(9)").unwrap();
        });

        assert_eq!(kicked.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn test_console_log() {
        let runtime = Runtime::new().unwrap();
        let ctx = Context::full(&runtime).unwrap();

        ctx.with(|ctx| {
            register_host_globals(&ctx, None).unwrap();

            // This should not panic
            let _: Value = ctx.eval("console.log('hello', 'from', 'js')").unwrap();
        });
    }
}
