//! Static ship catalog.
//!
//! Read-only reference data. Refit valuation and capacity clamping look
//! ships up here by name; nothing in the game mutates it.

use serde::Serialize;

/// One ship archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShipSpec {
    pub name: &'static str,
    pub holds: u32,
    pub fighters_max: u32,
    pub shields_max: u32,
    pub mines_max: u32,
    pub beacons_max: u32,
    pub genesis_max: u32,
    pub cost: u64,
}

pub const SHIP_CATALOG: &[ShipSpec] = &[
    ShipSpec {
        name: "Escape Pod",
        holds: 5,
        fighters_max: 0,
        shields_max: 50,
        mines_max: 0,
        beacons_max: 0,
        genesis_max: 0,
        cost: 0,
    },
    ShipSpec {
        name: "Scout Marauder",
        holds: 25,
        fighters_max: 250,
        shields_max: 100,
        mines_max: 0,
        beacons_max: 5,
        genesis_max: 0,
        cost: 5_000,
    },
    ShipSpec {
        name: "Merchant Cruiser",
        holds: 75,
        fighters_max: 2_500,
        shields_max: 400,
        mines_max: 50,
        beacons_max: 50,
        genesis_max: 5,
        cost: 10_000,
    },
    ShipSpec {
        name: "Missile Frigate",
        holds: 40,
        fighters_max: 5_000,
        shields_max: 400,
        mines_max: 5,
        beacons_max: 5,
        genesis_max: 0,
        cost: 25_000,
    },
    ShipSpec {
        name: "Colonial Transport",
        holds: 250,
        fighters_max: 200,
        shields_max: 500,
        mines_max: 0,
        beacons_max: 10,
        genesis_max: 10,
        cost: 50_000,
    },
    ShipSpec {
        name: "Cargo Tran",
        holds: 125,
        fighters_max: 400,
        shields_max: 1_000,
        mines_max: 1,
        beacons_max: 20,
        genesis_max: 2,
        cost: 55_000,
    },
    ShipSpec {
        name: "Battleship",
        holds: 80,
        fighters_max: 10_000,
        shields_max: 750,
        mines_max: 25,
        beacons_max: 50,
        genesis_max: 1,
        cost: 120_000,
    },
    ShipSpec {
        name: "Corporate Flagship",
        holds: 85,
        fighters_max: 20_000,
        shields_max: 1_500,
        mines_max: 100,
        beacons_max: 100,
        genesis_max: 10,
        cost: 250_000,
    },
];

/// Look a ship up by name, ignoring ASCII case and surrounding whitespace.
pub fn find_ship(name: &str) -> Option<&'static ShipSpec> {
    let name = name.trim();
    SHIP_CATALOG
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
}
