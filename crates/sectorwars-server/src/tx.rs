//! Scoped action transactions.
//!
//! A reducer already runs inside one serializable SpacetimeDB transaction,
//! and returning `Err` rolls back every write it made. `ActionTx` adds the
//! lock order on top: the caller's player row is taken first, and a sector
//! can only be taken through a live `ActionTx`. `commit` re-checks the
//! player ledger before the row is written.

use rand::rngs::StdRng;
use rand::SeedableRng;
use sectorwars_logic::config::GameRules;
use sectorwars_logic::errors::ActionError;
use sectorwars_logic::ledger;
use sectorwars_logic::navigation::WarpEdge;
use sectorwars_logic::player::{Cargo, PlayerState};
use sectorwars_logic::pricing::PortType;
use sectorwars_logic::trade::PortStock;
use spacetimedb::{Identity, ReducerContext, Table};

use crate::tables::*;

// ============================================================================
// ROW CONVERSIONS
// ============================================================================

pub fn player_state(row: &Player) -> PlayerState {
    PlayerState {
        current_sector: row.current_sector,
        credits: row.credits,
        turns_remaining: row.turns_remaining,
        ship_type: row.ship_type.clone(),
        holds_max: row.holds_max,
        fighters: row.fighters,
        fighters_max: row.fighters_max,
        shields: row.shields,
        shields_max: row.shields_max,
        mines: row.mines,
        beacons: row.beacons,
        genesis: row.genesis,
        cargo: Cargo {
            fuel: row.cargo_fuel,
            organics: row.cargo_organics,
            equipment: row.cargo_equipment,
            colonists: row.colonists,
        },
    }
}

pub fn apply_state(row: &mut Player, state: &PlayerState) {
    row.current_sector = state.current_sector;
    row.credits = state.credits;
    row.turns_remaining = state.turns_remaining;
    row.ship_type = state.ship_type.clone();
    row.holds_max = state.holds_max;
    row.fighters = state.fighters;
    row.fighters_max = state.fighters_max;
    row.shields = state.shields;
    row.shields_max = state.shields_max;
    row.mines = state.mines;
    row.beacons = state.beacons;
    row.genesis = state.genesis;
    row.cargo_fuel = state.cargo.fuel;
    row.cargo_organics = state.cargo.organics;
    row.cargo_equipment = state.cargo.equipment;
    row.colonists = state.cargo.colonists;
}

/// Port substate of a sector row, if it has a recognisable port.
pub fn port_stock(row: &Sector) -> Option<PortStock> {
    let port_type = PortType::parse(row.port_type.as_deref()?)?;
    Some(PortStock {
        port_type,
        stock: [row.fuel_stock, row.organics_stock, row.equipment_stock],
        demand_pct: [row.fuel_demand, row.organics_demand, row.equipment_demand],
    })
}

pub fn apply_stock(row: &mut Sector, stock: [u32; 3]) {
    row.fuel_stock = stock[0];
    row.organics_stock = stock[1];
    row.equipment_stock = stock[2];
}

pub fn rules_from_config(cfg: &GameConfig) -> GameRules {
    GameRules {
        misfire_probability: cfg.misfire_probability,
        move_turn_cost: cfg.move_turn_cost,
        trade_turn_cost: cfg.trade_turn_cost,
        port_regen_base: cfg.port_regen_base,
        port_regen_min: cfg.port_regen_min,
        port_regen_max: cfg.port_regen_max,
        regen_interval_secs: cfg.regen_interval_secs,
        starting_credits: cfg.starting_credits,
        starting_turns: cfg.starting_turns,
        starting_ship: cfg.starting_ship.clone(),
    }
}

/// Singleton config row holding `rules`, administered by `admin`.
pub fn config_row(admin: Identity, rules: &GameRules) -> GameConfig {
    GameConfig {
        id: 0,
        admin,
        misfire_probability: rules.misfire_probability,
        move_turn_cost: rules.move_turn_cost,
        trade_turn_cost: rules.trade_turn_cost,
        port_regen_base: rules.port_regen_base,
        port_regen_min: rules.port_regen_min,
        port_regen_max: rules.port_regen_max,
        regen_interval_secs: rules.regen_interval_secs,
        starting_credits: rules.starting_credits,
        starting_turns: rules.starting_turns,
        starting_ship: rules.starting_ship.clone(),
    }
}

pub fn load_config(ctx: &ReducerContext) -> Result<GameConfig, ActionError> {
    ctx.db
        .game_config()
        .id()
        .find(0)
        .ok_or_else(|| ActionError::Storage("game_config row missing".into()))
}

pub fn find_sector(ctx: &ReducerContext, universe_id: u32, number: u32) -> Option<Sector> {
    ctx.db
        .sector()
        .iter()
        .find(|s| s.universe_id == universe_id && s.sector_number == number)
}

pub fn sector_count(ctx: &ReducerContext, universe_id: u32) -> u32 {
    ctx.db
        .sector()
        .iter()
        .filter(|s| s.universe_id == universe_id)
        .count() as u32
}

/// Warps between two sectors, in both directions, as sector-number edges.
pub fn edges_between(ctx: &ReducerContext, a: &Sector, b: &Sector) -> Vec<WarpEdge> {
    ctx.db
        .warp()
        .iter()
        .filter_map(|w| {
            if w.source_sector_id == a.id && w.destination_sector_number == b.sector_number {
                Some(WarpEdge {
                    from: a.sector_number,
                    to: b.sector_number,
                    is_two_way: w.is_two_way,
                })
            } else if w.source_sector_id == b.id && w.destination_sector_number == a.sector_number
            {
                Some(WarpEdge {
                    from: b.sector_number,
                    to: a.sector_number,
                    is_two_way: w.is_two_way,
                })
            } else {
                None
            }
        })
        .collect()
}

// ============================================================================
// ACTION TRANSACTION
// ============================================================================

pub struct ActionTx<'a> {
    ctx: &'a ReducerContext,
    row: Player,
    before: PlayerState,
    rules: GameRules,
}

/// A sector row held by an action. Only obtainable from [`ActionTx::lock_sector`].
pub struct LockedSector {
    row: Sector,
}

impl LockedSector {
    pub fn row(&self) -> &Sector {
        &self.row
    }

    pub fn port(&self) -> Option<PortStock> {
        port_stock(&self.row)
    }

    pub fn port_type(&self) -> Option<PortType> {
        self.row.port_type.as_deref().and_then(PortType::parse)
    }
}

impl<'a> ActionTx<'a> {
    /// Take the caller's active, living pilot. Fails with `Unauthorized`
    /// before anything else is read.
    pub fn begin(ctx: &'a ReducerContext) -> Result<Self, ActionError> {
        let player_id = ctx
            .db
            .connected_pilot()
            .identity()
            .find(ctx.sender)
            .and_then(|c| c.player_id)
            .ok_or(ActionError::Unauthorized)?;
        let row = ctx
            .db
            .player()
            .id()
            .find(player_id)
            .filter(|p| p.owner == ctx.sender && p.is_alive)
            .ok_or(ActionError::Unauthorized)?;
        let config = load_config(ctx)?;
        Ok(Self {
            ctx,
            before: player_state(&row),
            rules: rules_from_config(&config),
            row,
        })
    }

    pub fn player(&self) -> &PlayerState {
        &self.before
    }

    pub fn player_id(&self) -> u64 {
        self.row.id
    }

    pub fn player_name(&self) -> &str {
        &self.row.name
    }

    pub fn universe_id(&self) -> u32 {
        self.row.universe_id
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// The pilot's current sector, always taken after the player.
    pub fn lock_sector(&self) -> Result<LockedSector, ActionError> {
        find_sector(self.ctx, self.row.universe_id, self.row.current_sector)
            .map(|row| LockedSector { row })
            .ok_or_else(|| {
                ActionError::Invariant(format!(
                    "player {} is in missing sector {}",
                    self.row.id, self.row.current_sector
                ))
            })
    }

    /// Per-action RNG. Seeded from the transaction timestamp and the
    /// player so replays of the same call reproduce the same roll.
    pub fn rng(&self) -> StdRng {
        let micros = self.ctx.timestamp.to_micros_since_unix_epoch() as u64;
        StdRng::seed_from_u64(micros ^ self.row.id.rotate_left(32))
    }

    /// Write a changed port back. Stock only changes through a locked sector.
    pub fn write_stock(&self, sector: &mut LockedSector, stock: [u32; 3]) {
        apply_stock(&mut sector.row, stock);
        self.ctx.db.sector().id().update(sector.row.clone());
    }

    /// Verify and persist the new player state. Returns the written row.
    pub fn commit(mut self, next: &PlayerState, turn_cost: u32) -> Result<Player, ActionError> {
        ledger::verify(next)?;
        ledger::verify_turns(&self.before, next, turn_cost)?;
        apply_state(&mut self.row, next);
        self.row.last_action = self.ctx.timestamp;
        Ok(self.ctx.db.player().id().update(self.row))
    }
}
