//! SpacetimeDB table definitions for the SectorWars universe.
//!
//! Rows here are the persisted form of the plain structs in
//! sectorwars-logic; `crate::tx` converts between the two.

use spacetimedb::{table, Identity, ScheduleAt, Timestamp};

use crate::reducers::regenerate_ports;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Game rules singleton (id always 0). `admin` is the identity that
/// published the module.
#[table(name = game_config, public)]
#[derive(Clone)]
pub struct GameConfig {
    #[primary_key]
    pub id: u32,
    pub admin: Identity,
    pub misfire_probability: f64,
    pub move_turn_cost: u32,
    pub trade_turn_cost: u32,
    pub port_regen_base: u32,
    pub port_regen_min: u32,
    pub port_regen_max: u32,
    pub regen_interval_secs: u64,
    pub starting_credits: u64,
    pub starting_turns: u32,
    pub starting_ship: String,
}

/// Port regeneration timer. One row drives `regenerate_ports`.
#[table(name = regen_schedule, scheduled(regenerate_ports))]
pub struct RegenSchedule {
    #[primary_key]
    #[auto_inc]
    pub scheduled_id: u64,
    pub scheduled_at: ScheduleAt,
}

// ============================================================================
// UNIVERSE
// ============================================================================

#[table(name = universe, public)]
#[derive(Clone)]
pub struct Universe {
    #[primary_key]
    pub id: u32,
    pub sector_count: u32,
    pub seed: u64,
    pub created_at: Timestamp,
}

/// A sector. `sector_number` is sequential per universe starting at 1.
/// Port columns are meaningful only when `port_type` is set.
#[table(name = sector, public)]
#[derive(Clone)]
pub struct Sector {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub universe_id: u32,
    pub sector_number: u32,
    pub port_type: Option<String>, // "SBB", ..., or "STARDOCK"
    pub port_name: Option<String>,
    pub port_class: u8,
    pub fuel_stock: u32,
    pub organics_stock: u32,
    pub equipment_stock: u32,
    pub fuel_demand: u32, // percent, 100 = neutral
    pub organics_demand: u32,
    pub equipment_demand: u32,
}

/// Directed warp from a sector row to a sector number in the same universe.
#[table(name = warp, public)]
#[derive(Clone)]
pub struct Warp {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub universe_id: u32,
    pub source_sector_id: u64,
    pub destination_sector_number: u32,
    pub is_two_way: bool,
}

// ============================================================================
// PLAYERS
// ============================================================================

/// A pilot in one universe. An identity may hold one pilot per universe.
#[table(name = player, public)]
#[derive(Clone)]
pub struct Player {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub owner: Identity,
    pub universe_id: u32,
    pub name: String,
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
    pub cargo_fuel: u32,
    pub cargo_organics: u32,
    pub cargo_equipment: u32,
    pub colonists: u32,
    pub is_alive: bool,
    pub last_action: Timestamp,
}

/// Connected client and the pilot it is currently flying.
#[table(name = connected_pilot, public)]
#[derive(Clone)]
pub struct ConnectedPilot {
    #[primary_key]
    pub identity: Identity,
    pub player_id: Option<u64>,
    pub connected_at: Timestamp,
}

/// Latest response body for a player, as JSON. Clients subscribe to
/// their own row to read what the last reducer call returned.
#[table(name = action_result, public)]
#[derive(Clone)]
pub struct ActionResult {
    #[primary_key]
    pub player_id: u64,
    pub owner: Identity,
    pub action: String,
    pub body: String,
    pub at: Timestamp,
}

// ============================================================================
// RECORDS (append-only)
// ============================================================================

#[table(name = movement_event, public)]
pub struct MovementEvent {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub player_id: u64,
    pub universe_id: u32,
    pub from_sector: u32,
    pub to_sector: u32,
    pub intended_sector: u32,
    pub misfired: bool,
    pub turn_cost: u32,
    pub at: Timestamp,
}

#[table(name = trade_event, public)]
pub struct TradeEvent {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub player_id: u64,
    pub universe_id: u32,
    pub sector_number: u32,
    pub commodity: String,
    pub action: String,
    pub quantity: u32,
    pub unit_price: u32,
    pub total: u64,
    pub port_type: String,
    pub at: Timestamp,
}

#[table(name = refit_event, public)]
pub struct RefitEvent {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub player_id: u64,
    pub universe_id: u32,
    pub old_ship: String,
    pub new_ship: String,
    pub trade_in: u64,
    pub net_cost: u64,
    pub cargo_lost: u64,
    pub at: Timestamp,
}

// ============================================================================
// COLLABORATOR ROWS
// ============================================================================

/// One row per ordered pair, so each pilot sees their own encounters.
#[table(name = encounter, public)]
#[derive(Clone)]
pub struct Encounter {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub universe_id: u32,
    pub player_id: u64,
    pub other_player_id: u64,
    pub count: u32,
    pub first_met: Timestamp,
    pub last_met: Timestamp,
}

/// Auto-discovery log: the sectors a pilot has seen.
#[table(name = sector_log, public)]
#[derive(Clone)]
pub struct SectorLog {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub player_id: u64,
    pub universe_id: u32,
    pub sector_number: u32,
    pub summary: String,
    pub visits: u32,
    pub discovered_at: Timestamp,
    pub last_visit: Timestamp,
}

/// Notification for observers of a sector.
#[table(name = sector_notice, public)]
pub struct SectorNotice {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub universe_id: u32,
    pub sector_number: u32,
    pub kind: String, // "arrival", "departure", "purchase"
    pub actor_player_id: u64,
    pub text: String,
    pub payload: String, // the event as JSON
    pub posted_at: Timestamp,
}
