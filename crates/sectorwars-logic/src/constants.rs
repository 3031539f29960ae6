//! Game constants: commodity prices, turn costs, port regeneration bounds.
//!
//! Plain values with no database dependency. Both the SpacetimeDB module and
//! the native simtest read these; tunable ones are copied into
//! [`GameRules`](crate::config::GameRules) defaults.

pub mod prices {
    /// Base price per unit, before port direction and demand are applied.
    pub const FUEL_BASE: u32 = 20;
    pub const ORGANICS_BASE: u32 = 35;
    pub const EQUIPMENT_BASE: u32 = 55;

    /// Multiplier when a port sells to the player.
    pub const PORT_SELLS_FACTOR: f64 = 0.5;
    /// Multiplier when a port buys from the player.
    pub const PORT_BUYS_FACTOR: f64 = 1.7;
    /// Applied in the player's favour at all-sell and all-buy ports.
    pub const RARE_PORT_BONUS: f64 = 1.3;

    pub const COLONIST_PRICE: u32 = 100;
    pub const COLONIST_MAX_PER_TRADE: u32 = 1000;
}

pub mod turns {
    pub const MOVE_COST: u32 = 1;
    pub const TRADE_COST: u32 = 1;
    pub const STARTING_TURNS: u32 = 250;
}

pub mod misfire {
    /// 0.25% of warp jumps land somewhere else.
    pub const PROBABILITY: f64 = 0.0025;
}

pub mod ports {
    pub const STARDOCK: &str = "STARDOCK";

    pub const REGEN_BASE: u32 = 250;
    pub const REGEN_MIN: u32 = 1_000;
    pub const REGEN_MAX: u32 = 15_000;
    pub const REGEN_INTERVAL_SECS: u64 = 3_600;

    /// Neutral demand: prices at their base multiplier.
    pub const NEUTRAL_DEMAND_PCT: u32 = 100;
}

pub mod refit {
    /// Trade-in credit, in percent of the current hull's catalog cost.
    /// Integer percent so that `floor(cost * 0.70)` is exact.
    pub const TRADE_IN_PERCENT: u64 = 70;
}

pub mod equipment_prices {
    pub const FIGHTER: u32 = 100;
    pub const SHIELD: u32 = 50;
    pub const MINE: u32 = 250;
    pub const BEACON: u32 = 40;
    pub const GENESIS: u32 = 5_000;
}

pub mod player {
    pub const STARTING_CREDITS: u64 = 20_000;
    pub const STARTING_SECTOR: u32 = 1;
    pub const STARTING_SHIP: &str = "Merchant Cruiser";
}
