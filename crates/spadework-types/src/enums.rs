//! Game Enumerations
//!
//! Plain data consumed by scripts and the host; numeric values follow the
//! server's wire protocol where it assigns them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Team {
    Blue = 0,
    Green = 1,
    Spectator = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Weapon {
    Rifle,
    Smg,
    Shotgun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum BodyPart {
    Torso,
    Head,
    Arms,
    Legs,
    Melee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Tool {
    Spade,
    Block,
    Weapon,
    Grenade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum BlockAction {
    Build,
    Destroy,
    SpadeDestroy,
    GrenadeDestroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Entity {
    BlueFlag,
    GreenFlag,
    BlueBase,
    GreenBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ChatKind {
    All,
    Team,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum KillKind {
    Weapon,
    Headshot,
    Melee,
    Grenade,
    Fall,
    TeamChange,
    ClassChange,
}

/// Reason reported to a client on disconnect. Values are part of the wire
/// protocol and are not contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum DisconnectReason {
    Undefined = 0,
    Banned = 1,
    TooManyConnections = 2,
    WrongVersion = 3,
    Full = 4,
    Shutdown = 5,
    Kicked = 10,
    InvalidName = 20,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum GameMode {
    Ctf,
    Tc,
}
