//! Plain player state shared by the engines.
//!
//! Mirrors the mutable columns of the server's `player` table. The engines
//! compute a new `PlayerState` and hand it back for the caller to persist.

use serde::Serialize;

use crate::catalog::ShipSpec;
use crate::errors::ActionError;
use crate::pricing::Commodity;

/// Everything stored in the holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cargo {
    pub fuel: u32,
    pub organics: u32,
    pub equipment: u32,
    pub colonists: u32,
}

impl Cargo {
    pub fn total(&self) -> u64 {
        self.fuel as u64 + self.organics as u64 + self.equipment as u64 + self.colonists as u64
    }

    pub fn get(&self, commodity: Commodity) -> u32 {
        match commodity {
            Commodity::Fuel => self.fuel,
            Commodity::Organics => self.organics,
            Commodity::Equipment => self.equipment,
        }
    }

    pub fn slot_mut(&mut self, commodity: Commodity) -> &mut u32 {
        match commodity {
            Commodity::Fuel => &mut self.fuel,
            Commodity::Organics => &mut self.organics,
            Commodity::Equipment => &mut self.equipment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub current_sector: u32,
    pub credits: u64,
    pub turns_remaining: u32,
    pub ship_type: String,
    pub holds_max: u32,
    pub fighters: u32,
    pub fighters_max: u32,
    pub shields: u32,
    pub shields_max: u32,
    pub mines: u32,
    pub beacons: u32,
    pub genesis: u32,
    pub cargo: Cargo,
}

impl PlayerState {
    /// A fresh pilot in a stock ship with empty holds.
    pub fn new_pilot(ship: &ShipSpec, sector: u32, credits: u64, turns: u32) -> Self {
        Self {
            current_sector: sector,
            credits,
            turns_remaining: turns,
            ship_type: ship.name.to_string(),
            holds_max: ship.holds,
            fighters: ship.fighters_max.min(30),
            fighters_max: ship.fighters_max,
            shields: 0,
            shields_max: ship.shields_max,
            mines: 0,
            beacons: 0,
            genesis: 0,
            cargo: Cargo::default(),
        }
    }

    pub fn free_holds(&self) -> u32 {
        (self.holds_max as u64).saturating_sub(self.cargo.total()) as u32
    }

    /// Deduct `cost` turns or fail without touching anything.
    pub fn spend_turns(&mut self, cost: u32) -> Result<(), ActionError> {
        if self.turns_remaining < cost {
            return Err(ActionError::NotEnoughTurns);
        }
        self.turns_remaining -= cost;
        Ok(())
    }

    /// Require at least `cost` turns without spending them.
    pub fn require_turns(&self, cost: u32) -> Result<(), ActionError> {
        if self.turns_remaining < cost.max(1) {
            return Err(ActionError::NotEnoughTurns);
        }
        Ok(())
    }
}
