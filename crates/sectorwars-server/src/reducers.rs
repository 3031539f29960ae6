//! Client-facing reducers: joining, movement, trading, refits, and the
//! scheduled port regeneration.
//!
//! Each reducer runs one action inside its own transaction. Returning
//! `Err` rolls back every write, so a rejected action leaves no trace
//! except the log line.

use std::time::Duration;

use sectorwars_logic::api::{
    ColonistRequest, EquipmentRequest, MoveRequest, MoveResponse, PlayerView, PortReportResponse,
    PurchaseResponse, PurchaseShipRequest, TradeRequest, TradeResponse,
};
use sectorwars_logic::catalog::find_ship;
use sectorwars_logic::config::GameRules;
use sectorwars_logic::errors::{ActionError, ErrorKind};
use sectorwars_logic::events::{movement_events, OutboundEvent};
use sectorwars_logic::galaxy::{self, STARDOCK_SECTOR};
use sectorwars_logic::navigation::{is_connected, plan_move, DestinationInfo};
use sectorwars_logic::player::PlayerState;
use sectorwars_logic::pricing::port_report;
use sectorwars_logic::refit::{plan_equipment_purchase, plan_refit};
use sectorwars_logic::trade::{plan_colonist_purchase, plan_trade, regenerate, TradeOutcome};
use serde::Serialize;
use spacetimedb::{reducer, ReducerContext, ScheduleAt, Table};

use crate::collaborators::{auto_log_sector, meet_sector_occupants, sector_summary};
use crate::publisher::NoticeBoard;
use crate::tables::*;
use crate::tx::{self, ActionTx};

// ============================================================================
// HELPERS
// ============================================================================

/// Log a finished action and turn its error into the reducer error string.
fn finish(action: &str, result: Result<(), ActionError>) -> Result<(), String> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::Internal => {
            log::error!("{} failed: {}", action, e);
            Err(e.body().error)
        }
        Err(e) => {
            log::warn!("{} rejected ({}): {}", action, e.status_code(), e);
            Err(e.body().error)
        }
    }
}

/// Store the response body where the caller's subscription will see it.
fn store_result<T: Serialize>(
    ctx: &ReducerContext,
    player_id: u64,
    action: &str,
    body: &T,
) -> Result<(), ActionError> {
    let body = serde_json::to_string(body).map_err(|e| ActionError::Storage(e.to_string()))?;
    let row = ActionResult {
        player_id,
        owner: ctx.sender,
        action: action.to_string(),
        body,
        at: ctx.timestamp,
    };
    if ctx.db.action_result().player_id().find(player_id).is_some() {
        ctx.db.action_result().player_id().update(row);
    } else {
        ctx.db.action_result().insert(row);
    }
    Ok(())
}

fn view(player_id: u64, state: &PlayerState) -> PlayerView {
    PlayerView {
        id: player_id,
        state: state.clone(),
    }
}

fn require_admin(ctx: &ReducerContext) -> Result<GameConfig, ActionError> {
    let cfg = tx::load_config(ctx)?;
    if cfg.admin != ctx.sender {
        return Err(ActionError::Unauthorized);
    }
    Ok(cfg)
}

fn record_trade(ctx: &ReducerContext, player_id: u64, universe_id: u32, sector: u32, outcome: &TradeOutcome) {
    let r = &outcome.receipt;
    ctx.db.trade_event().insert(TradeEvent {
        id: 0,
        player_id,
        universe_id,
        sector_number: sector,
        commodity: r.item.clone(),
        action: r.action.to_string(),
        quantity: r.quantity,
        unit_price: r.unit_price,
        total: r.total,
        port_type: r.port_type.clone(),
        at: ctx.timestamp,
    });
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[reducer(init)]
pub fn init(ctx: &ReducerContext) {
    let rules = GameRules::default();
    log::info!("Initializing SectorWars module with rules {}", rules.to_json());
    ctx.db.game_config().insert(tx::config_row(ctx.sender, &rules));
    schedule_regen(ctx, rules.regen_interval_secs);
}

fn schedule_regen(ctx: &ReducerContext, interval_secs: u64) {
    ctx.db.regen_schedule().insert(RegenSchedule {
        scheduled_id: 0,
        scheduled_at: ScheduleAt::Interval(Duration::from_secs(interval_secs).into()),
    });
}

#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);
    if ctx.db.connected_pilot().identity().find(ctx.sender).is_some() {
        return;
    }
    ctx.db.connected_pilot().insert(ConnectedPilot {
        identity: ctx.sender,
        player_id: None,
        connected_at: ctx.timestamp,
    });
}

#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
    ctx.db.connected_pilot().identity().delete(ctx.sender);
}

// ============================================================================
// UNIVERSE SETUP
// ============================================================================

/// Build a universe from a seed: sectors, ports, warps. Admin only.
#[reducer]
pub fn seed_universe(
    ctx: &ReducerContext,
    universe_id: u32,
    sector_count: u32,
    seed: u64,
) -> Result<(), String> {
    finish("seed_universe", create_universe(ctx, universe_id, sector_count, seed))
}

fn create_universe(
    ctx: &ReducerContext,
    universe_id: u32,
    sector_count: u32,
    seed: u64,
) -> Result<(), ActionError> {
    let cfg = require_admin(ctx)?;
    if sector_count == 0 {
        return Err(ActionError::InvalidConfig("a universe needs at least one sector".into()));
    }
    if ctx.db.universe().id().find(universe_id).is_some() {
        return Err(ActionError::UniverseExists(universe_id));
    }
    let plan = galaxy::generate(sector_count, seed, &tx::rules_from_config(&cfg));

    ctx.db.universe().insert(Universe {
        id: universe_id,
        sector_count,
        seed,
        created_at: ctx.timestamp,
    });
    let mut ids = vec![0u64; sector_count as usize + 1];
    for s in &plan.sectors {
        let (port_type, stock, demand) = match &s.port {
            Some(p) => (Some(p.port_type.code()), p.stock, p.demand_pct),
            None => (None, [0; 3], [100; 3]),
        };
        let row = ctx.db.sector().insert(Sector {
            id: 0,
            universe_id,
            sector_number: s.sector_number,
            port_type,
            port_name: s.port_name.clone(),
            port_class: s.port_class,
            fuel_stock: stock[0],
            organics_stock: stock[1],
            equipment_stock: stock[2],
            fuel_demand: demand[0],
            organics_demand: demand[1],
            equipment_demand: demand[2],
        });
        ids[s.sector_number as usize] = row.id;
    }
    for w in &plan.warps {
        ctx.db.warp().insert(Warp {
            id: 0,
            universe_id,
            source_sector_id: ids[w.from as usize],
            destination_sector_number: w.to,
            is_two_way: w.is_two_way,
        });
    }
    log::info!(
        "Universe {} seeded: {} sectors, {} warps, {} ports (seed {})",
        universe_id,
        sector_count,
        plan.warps.len(),
        plan.sectors.iter().filter(|s| s.port.is_some()).count(),
        seed
    );
    Ok(())
}

/// Create the caller's pilot in a universe at the Stardock and make it
/// the active pilot for this connection. Rejoining an existing universe
/// just switches to that pilot.
#[reducer]
pub fn join_universe(ctx: &ReducerContext, universe_id: u32, name: String) -> Result<(), String> {
    finish("join_universe", enter_universe(ctx, universe_id, name))
}

fn enter_universe(ctx: &ReducerContext, universe_id: u32, name: String) -> Result<(), ActionError> {
    let Some(mut pilot) = ctx.db.connected_pilot().identity().find(ctx.sender) else {
        return Err(ActionError::Unauthorized);
    };
    if ctx.db.universe().id().find(universe_id).is_none() {
        return Err(ActionError::UnknownUniverse(universe_id));
    }
    let existing = ctx
        .db
        .player()
        .iter()
        .find(|p| p.owner == ctx.sender && p.universe_id == universe_id && p.is_alive);
    if let Some(p) = existing {
        if pilot.player_id == Some(p.id) {
            return Err(ActionError::AlreadyJoined(universe_id));
        }
        log::info!("Identity {:?} resumes pilot {} in universe {}", ctx.sender, p.id, universe_id);
        pilot.player_id = Some(p.id);
        ctx.db.connected_pilot().identity().update(pilot);
        return Ok(());
    }

    let rules = tx::rules_from_config(&tx::load_config(ctx)?);
    let ship = find_ship(&rules.starting_ship)
        .ok_or_else(|| ActionError::InvalidConfig(format!("starting ship {:?}", rules.starting_ship)))?;
    let state = PlayerState::new_pilot(ship, STARDOCK_SECTOR, rules.starting_credits, rules.starting_turns);
    sectorwars_logic::ledger::verify(&state)?;

    let name = match name.trim() {
        "" => format!("Pilot {}", ctx.db.player().count() + 1),
        n => n.to_string(),
    };
    let mut row = Player {
        id: 0,
        owner: ctx.sender,
        universe_id,
        name,
        current_sector: 0,
        credits: 0,
        turns_remaining: 0,
        ship_type: String::new(),
        holds_max: 0,
        fighters: 0,
        fighters_max: 0,
        shields: 0,
        shields_max: 0,
        mines: 0,
        beacons: 0,
        genesis: 0,
        cargo_fuel: 0,
        cargo_organics: 0,
        cargo_equipment: 0,
        colonists: 0,
        is_alive: true,
        last_action: ctx.timestamp,
    };
    tx::apply_state(&mut row, &state);
    let row = ctx.db.player().insert(row);

    pilot.player_id = Some(row.id);
    ctx.db.connected_pilot().identity().update(pilot);
    store_result(ctx, row.id, "join_universe", &view(row.id, &state))?;
    if let Some(dock) = tx::find_sector(ctx, universe_id, STARDOCK_SECTOR) {
        auto_log_sector(ctx, row.id, universe_id, STARDOCK_SECTOR, sector_summary(&dock));
    }
    log::info!("Player {} ({}) joined universe {}", row.id, row.name, universe_id);
    Ok(())
}

// ============================================================================
// MOVEMENT
// ============================================================================

#[reducer]
pub fn move_to_sector(ctx: &ReducerContext, destination_sector: u32) -> Result<(), String> {
    finish("move_to_sector", resolve_move(ctx, destination_sector))
}

fn resolve_move(ctx: &ReducerContext, destination_sector: u32) -> Result<(), ActionError> {
    let destination = MoveRequest {
        destination_sector: destination_sector as i64,
    }
    .validate()?;
    let tx = ActionTx::begin(ctx)?;
    let origin = tx.lock_sector()?;
    let universe_id = tx.universe_id();
    let player_id = tx.player_id();
    let name = tx.player_name().to_string();

    let target = tx::find_sector(ctx, universe_id, destination);
    let from = origin.row().sector_number;
    let connected = target.as_ref().is_some_and(|t| {
        is_connected(&tx::edges_between(ctx, origin.row(), t), from, destination)
    });
    let info = DestinationInfo {
        exists: target.is_some(),
        connected,
    };
    let mut rng = tx.rng();
    let plan = plan_move(
        tx.player(),
        destination,
        info,
        tx::sector_count(ctx, universe_id),
        tx.rules(),
        &mut rng,
    )?;
    let landed = tx::find_sector(ctx, universe_id, plan.actual).ok_or_else(|| {
        ActionError::Invariant(format!("misfire landed in missing sector {}", plan.actual))
    })?;
    tx.commit(&plan.player, plan.turn_cost)?;

    ctx.db.movement_event().insert(MovementEvent {
        id: 0,
        player_id,
        universe_id,
        from_sector: plan.from,
        to_sector: plan.actual,
        intended_sector: plan.intended,
        misfired: plan.misfired,
        turn_cost: plan.turn_cost,
        at: ctx.timestamp,
    });
    store_result(ctx, player_id, "move_to_sector", &MoveResponse::from_plan(player_id, &plan))?;

    NoticeBoard::new(ctx, &name).post(&movement_events(&plan, universe_id, player_id));
    let met = meet_sector_occupants(ctx, player_id, universe_id, plan.actual);
    auto_log_sector(ctx, player_id, universe_id, plan.actual, sector_summary(&landed));

    if plan.misfired {
        log::info!(
            "Player {} misfired: {} -> {} (meant {})",
            player_id,
            plan.from,
            plan.actual,
            plan.intended
        );
    } else {
        log::info!(
            "Player {} moved {} -> {} ({} turns left, met {})",
            player_id,
            plan.from,
            plan.actual,
            plan.player.turns_remaining,
            met
        );
    }
    Ok(())
}

// ============================================================================
// TRADING
// ============================================================================

#[reducer]
pub fn trade(
    ctx: &ReducerContext,
    commodity: String,
    action: String,
    quantity: i64,
) -> Result<(), String> {
    finish("trade", execute_trade(ctx, commodity, action, quantity))
}

fn execute_trade(
    ctx: &ReducerContext,
    commodity: String,
    action: String,
    quantity: i64,
) -> Result<(), ActionError> {
    let req = TradeRequest {
        commodity,
        action,
        quantity,
    }
    .validate()?;
    let tx = ActionTx::begin(ctx)?;
    let mut sector = tx.lock_sector()?;
    let port = sector.port();
    let outcome = plan_trade(
        tx.player(),
        port.as_ref(),
        req.commodity,
        req.action,
        req.quantity,
        tx.rules(),
    )?;

    let (player_id, universe_id) = (tx.player_id(), tx.universe_id());
    let sector_number = sector.row().sector_number;
    tx.write_stock(&mut sector, outcome.stock);
    tx.commit(&outcome.player, outcome.turn_cost)?;

    record_trade(ctx, player_id, universe_id, sector_number, &outcome);
    store_result(ctx, player_id, "trade", &TradeResponse::from_outcome(player_id, &outcome))?;
    log::info!(
        "Player {} {} {} {} at {} each in sector {} (port {} left)",
        player_id,
        outcome.receipt.action,
        outcome.receipt.quantity,
        outcome.receipt.item,
        outcome.receipt.unit_price,
        sector_number,
        outcome.receipt.port_remaining
    );
    Ok(())
}

#[reducer]
pub fn buy_colonists(ctx: &ReducerContext, quantity: i64) -> Result<(), String> {
    finish("buy_colonists", execute_colonist_purchase(ctx, quantity))
}

fn execute_colonist_purchase(ctx: &ReducerContext, quantity: i64) -> Result<(), ActionError> {
    let requested = ColonistRequest { quantity }.validate()?;
    let tx = ActionTx::begin(ctx)?;
    let sector = tx.lock_sector()?;
    let port = sector.port();
    let outcome = plan_colonist_purchase(tx.player(), port.as_ref(), requested, tx.rules())?;

    let (player_id, universe_id) = (tx.player_id(), tx.universe_id());
    let sector_number = sector.row().sector_number;
    tx.commit(&outcome.player, outcome.turn_cost)?;

    record_trade(ctx, player_id, universe_id, sector_number, &outcome);
    store_result(ctx, player_id, "buy_colonists", &TradeResponse::from_outcome(player_id, &outcome))?;
    log::info!(
        "Player {} took on {} colonists in sector {}",
        player_id,
        outcome.receipt.quantity,
        sector_number
    );
    Ok(())
}

/// Read-only price board for the current port. Costs no turns.
#[reducer]
pub fn view_port(ctx: &ReducerContext) -> Result<(), String> {
    finish("view_port", report_port(ctx))
}

fn report_port(ctx: &ReducerContext) -> Result<(), ActionError> {
    let tx = ActionTx::begin(ctx)?;
    let sector = tx.lock_sector()?;
    let port = sector.port().ok_or(ActionError::NoPort)?;
    let report = PortReportResponse {
        success: true,
        sector_number: sector.row().sector_number,
        port_type: port.port_type.code(),
        quotes: port_report(&port.port_type, port.stock, port.demand_pct),
    };
    store_result(ctx, tx.player_id(), "view_port", &report)
}

// ============================================================================
// REFIT
// ============================================================================

#[reducer]
pub fn buy_ship(ctx: &ReducerContext, ship_name: String) -> Result<(), String> {
    finish("buy_ship", execute_refit(ctx, ship_name))
}

fn execute_refit(ctx: &ReducerContext, ship_name: String) -> Result<(), ActionError> {
    let req = PurchaseShipRequest { ship_name };
    let name = req.validate()?;
    let tx = ActionTx::begin(ctx)?;
    let sector = tx.lock_sector()?;
    let outcome = plan_refit(tx.player(), sector.port_type().as_ref(), name)?;

    let (player_id, universe_id) = (tx.player_id(), tx.universe_id());
    let pilot_name = tx.player_name().to_string();
    let sector_number = sector.row().sector_number;
    tx.commit(&outcome.player, 0)?;

    ctx.db.refit_event().insert(RefitEvent {
        id: 0,
        player_id,
        universe_id,
        old_ship: outcome.old_ship.clone(),
        new_ship: outcome.new_ship.clone(),
        trade_in: outcome.trade_in,
        net_cost: outcome.net_cost,
        cargo_lost: outcome.losses.cargo,
        at: ctx.timestamp,
    });
    store_result(ctx, player_id, "buy_ship", &PurchaseResponse::from_refit(player_id, &outcome))?;
    NoticeBoard::new(ctx, &pilot_name).post(&[OutboundEvent::Purchase {
        universe_id,
        sector: sector_number,
        player_id,
        summary: format!("traded a {} for a {}", outcome.old_ship, outcome.new_ship),
    }]);
    log::info!(
        "Player {} refit {} -> {} for {} (trade-in {})",
        player_id,
        outcome.old_ship,
        outcome.new_ship,
        outcome.net_cost,
        outcome.trade_in
    );
    Ok(())
}

#[reducer]
pub fn buy_equipment(ctx: &ReducerContext, item: String, quantity: i64) -> Result<(), String> {
    finish("buy_equipment", execute_equipment_purchase(ctx, item, quantity))
}

fn execute_equipment_purchase(
    ctx: &ReducerContext,
    item: String,
    quantity: i64,
) -> Result<(), ActionError> {
    let (item, requested) = EquipmentRequest { item, quantity }.validate()?;
    let tx = ActionTx::begin(ctx)?;
    let sector = tx.lock_sector()?;
    let outcome = plan_equipment_purchase(tx.player(), sector.port_type().as_ref(), item, requested)?;

    let player_id = tx.player_id();
    tx.commit(&outcome.player, 0)?;
    store_result(
        ctx,
        player_id,
        "buy_equipment",
        &PurchaseResponse::from_equipment(player_id, &outcome),
    )?;
    log::info!(
        "Player {} bought {} {} for {}",
        player_id,
        outcome.quantity,
        outcome.item,
        outcome.total
    );
    Ok(())
}

// ============================================================================
// ADMIN & SCHEDULED
// ============================================================================

/// Change the warp misfire odds. Admin only; 0 disables misfires.
#[reducer]
pub fn set_misfire_probability(ctx: &ReducerContext, probability: f64) -> Result<(), String> {
    finish("set_misfire_probability", update_misfire(ctx, probability))
}

fn update_misfire(ctx: &ReducerContext, probability: f64) -> Result<(), ActionError> {
    let mut cfg = require_admin(ctx)?;
    let rules = GameRules {
        misfire_probability: probability,
        ..tx::rules_from_config(&cfg)
    };
    rules.validate()?;
    log::info!(
        "Misfire probability {} -> {}",
        cfg.misfire_probability,
        probability
    );
    cfg.misfire_probability = probability;
    ctx.db.game_config().id().update(cfg);
    Ok(())
}

/// Replace every tunable rule at once from a JSON object. Keys left out
/// keep their defaults. Admin only.
#[reducer]
pub fn set_game_rules(ctx: &ReducerContext, rules_json: String) -> Result<(), String> {
    finish("set_game_rules", replace_rules(ctx, &rules_json))
}

fn replace_rules(ctx: &ReducerContext, rules_json: &str) -> Result<(), ActionError> {
    let cfg = require_admin(ctx)?;
    let rules = GameRules::from_json(rules_json)?;
    let interval_changed = rules.regen_interval_secs != cfg.regen_interval_secs;
    log::info!("Game rules replaced: {}", rules.to_json());
    ctx.db
        .game_config()
        .id()
        .update(tx::config_row(cfg.admin, &rules));
    if interval_changed {
        let ids: Vec<u64> = ctx
            .db
            .regen_schedule()
            .iter()
            .map(|r| r.scheduled_id)
            .collect();
        for id in ids {
            ctx.db.regen_schedule().scheduled_id().delete(id);
        }
        schedule_regen(ctx, rules.regen_interval_secs);
    }
    Ok(())
}

/// Scheduled port regeneration. Only the scheduler may call it.
#[reducer]
pub fn regenerate_ports(ctx: &ReducerContext, _job: RegenSchedule) -> Result<(), String> {
    if ctx.sender != ctx.identity() {
        return finish("regenerate_ports", Err(ActionError::Unauthorized));
    }
    finish("regenerate_ports", regenerate_all(ctx))
}

/// Run port regeneration right away. Admin only.
#[reducer]
pub fn regenerate_ports_now(ctx: &ReducerContext) -> Result<(), String> {
    finish(
        "regenerate_ports_now",
        require_admin(ctx).and_then(|_| regenerate_all(ctx)),
    )
}

fn regenerate_all(ctx: &ReducerContext) -> Result<(), ActionError> {
    let rules = tx::rules_from_config(&tx::load_config(ctx)?);
    let mut touched = 0usize;
    let sectors: Vec<Sector> = ctx.db.sector().iter().filter(|s| s.port_type.is_some()).collect();
    for mut sector in sectors {
        let Some(port) = tx::port_stock(&sector) else {
            log::warn!("Sector {} has unreadable port {:?}", sector.id, sector.port_type);
            continue;
        };
        let stock = regenerate(&port, &rules);
        if stock == port.stock {
            continue;
        }
        tx::apply_stock(&mut sector, stock);
        ctx.db.sector().id().update(sector);
        touched += 1;
    }
    log::info!("Port regeneration: {} ports restocked", touched);
    Ok(())
}
