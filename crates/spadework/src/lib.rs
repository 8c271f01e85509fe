//! Spadework - Live Script Host
//!
//! Watches a directory of JavaScript files, compiles each one independently
//! on change, chains new compilations to the previous successful one so
//! top-level state survives edits, executes the result, and bridges the
//! capability pair each script returns into the host's connection events.
//!
//! The host process drives this crate through [`on_load`] / [`on_unload`];
//! the `spadework` binary runs the same pipeline standalone for script
//! development.

// Native registry and host lifecycle
pub mod bootstrap;

// Simulated connection sequence + deferred kick
pub mod bridge;

// Last-good compiled unit per script
pub mod cache;

// Host configuration
pub mod config;

// Error types
pub mod error;

// Connection event multicast
pub mod events;

// Directory watcher and per-file reload driver
pub mod reload;

// Script source acquisition
pub mod source;

pub use bootstrap::{Host, NativeRegistry, on_load, on_unload};
pub use config::{CommitPolicy, HostConfig};
pub use error::{HostError, Result};
