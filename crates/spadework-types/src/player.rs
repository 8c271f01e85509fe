//! Player and Weapon Data

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::{BodyPart, Team, Weapon};

/// World-space vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A connected player as seen by scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub address: IpAddr,
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub health: i32,
    pub team: Team,
    pub id: u8,
}

/// Ranged damage per body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDamage {
    pub torso: i32,
    pub head: i32,
    pub arms: i32,
    pub legs: i32,
}

impl WeaponDamage {
    pub const fn new(torso: i32, head: i32, arms: i32, legs: i32) -> Self {
        Self { torso, head, arms, legs }
    }
}

/// Static tuning data for one weapon.
#[derive(Debug, Clone, Serialize)]
pub struct WeaponSpec {
    pub weapon: Weapon,
    pub name: &'static str,
    /// Seconds between shots.
    pub delay: f64,
    /// Magazine size.
    pub ammo: i32,
    /// Reserve ammunition.
    pub stock: i32,
    /// Seconds to reload.
    pub reload_time: f64,
    /// Shells reload one at a time.
    pub slow_reload: bool,
    pub damage: WeaponDamage,
}

impl WeaponSpec {
    pub const RIFLE: WeaponSpec = WeaponSpec {
        weapon: Weapon::Rifle,
        name: "Rifle",
        delay: 0.5,
        ammo: 10,
        stock: 50,
        reload_time: 2.5,
        slow_reload: false,
        damage: WeaponDamage::new(49, 100, 33, 33),
    };

    pub const SMG: WeaponSpec = WeaponSpec {
        weapon: Weapon::Smg,
        name: "SMG",
        delay: 0.11,
        ammo: 30,
        stock: 120,
        reload_time: 2.5,
        slow_reload: false,
        damage: WeaponDamage::new(29, 75, 18, 18),
    };

    pub const SHOTGUN: WeaponSpec = WeaponSpec {
        weapon: Weapon::Shotgun,
        name: "Shotgun",
        delay: 1.0,
        ammo: 6,
        stock: 48,
        reload_time: 0.5,
        slow_reload: true,
        damage: WeaponDamage::new(27, 37, 16, 16),
    };

    /// Look up the spec for a weapon.
    pub fn of(weapon: Weapon) -> &'static WeaponSpec {
        match weapon {
            Weapon::Rifle => &Self::RIFLE,
            Weapon::Smg => &Self::SMG,
            Weapon::Shotgun => &Self::SHOTGUN,
        }
    }

    /// Damage dealt to `part`. Melee hits carry no ranged damage here.
    pub fn damage_for(&self, part: BodyPart) -> i32 {
        match part {
            BodyPart::Torso => self.damage.torso,
            BodyPart::Head => self.damage.head,
            BodyPart::Arms => self.damage.arms,
            BodyPart::Legs => self.damage.legs,
            BodyPart::Melee => 0,
        }
    }
}
