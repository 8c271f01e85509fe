//! Spadework Types - Core domain types for the script host
//!
//! This crate contains the pure data structures shared by the host and the
//! script engine: the tri-state connection decision, game enums, player and
//! weapon data, and the hook traits the event registry dispatches through.

mod decision;
mod enums;
mod hooks;
mod player;

pub use decision::*;
pub use enums::*;
pub use hooks::*;
pub use player::*;
