//! Encounter tracking and sector auto-discovery.
//!
//! Both run after an action has been planned and committed, in the same
//! transaction. They are best effort: problems are logged, never returned.

use sectorwars_logic::encounters::{meeting_directions, tally_meeting, EncounterTally};
use spacetimedb::{ReducerContext, Table};

use crate::tables::*;

/// Upsert one direction of an encounter. Returns the meeting count.
fn upsert_encounter(ctx: &ReducerContext, universe_id: u32, player_id: u64, other_id: u64) -> u32 {
    let now = ctx.timestamp.to_micros_since_unix_epoch();
    let existing = ctx.db.encounter().iter().find(|e| {
        e.universe_id == universe_id && e.player_id == player_id && e.other_player_id == other_id
    });
    let prev = existing.as_ref().map(|e| EncounterTally {
        count: e.count,
        first_met: e.first_met.to_micros_since_unix_epoch(),
        last_met: e.last_met.to_micros_since_unix_epoch(),
    });
    let Some(tally) = tally_meeting(prev, now) else {
        return prev.map_or(0, |t| t.count);
    };
    match existing {
        Some(mut e) => {
            e.count = tally.count;
            e.last_met = ctx.timestamp;
            ctx.db.encounter().id().update(e);
        }
        None => {
            let row = Encounter {
                id: 0,
                universe_id,
                player_id,
                other_player_id: other_id,
                count: tally.count,
                first_met: ctx.timestamp,
                last_met: ctx.timestamp,
            };
            if ctx.db.encounter().try_insert(row).is_err() {
                log::warn!(
                    "Encounter {} -> {} not recorded in universe {}",
                    player_id,
                    other_id,
                    universe_id
                );
                return 0;
            }
        }
    }
    tally.count
}

/// Record that `a` and `b` met, in both directions. Idempotent within
/// one transaction.
pub fn record_encounter(ctx: &ReducerContext, a: u64, b: u64, universe_id: u32) {
    for (player_id, other_id) in meeting_directions(a, b) {
        upsert_encounter(ctx, universe_id, player_id, other_id);
    }
}

/// Meet every other living pilot already in `sector_number`. Returns how
/// many were met.
pub fn meet_sector_occupants(
    ctx: &ReducerContext,
    player_id: u64,
    universe_id: u32,
    sector_number: u32,
) -> usize {
    let others: Vec<u64> = ctx
        .db
        .player()
        .iter()
        .filter(|p| {
            p.universe_id == universe_id
                && p.current_sector == sector_number
                && p.is_alive
                && p.id != player_id
        })
        .map(|p| p.id)
        .collect();
    for &other in &others {
        record_encounter(ctx, player_id, other, universe_id);
    }
    others.len()
}

/// One-line description of a sector for the discovery log.
pub fn sector_summary(sector: &Sector) -> String {
    match (&sector.port_type, &sector.port_name) {
        (Some(code), Some(name)) => format!("Sector {}: {} ({})", sector.sector_number, name, code),
        (Some(code), None) => format!("Sector {}: port {}", sector.sector_number, code),
        _ => format!("Sector {}: empty space", sector.sector_number),
    }
}

/// Note that a pilot has seen a sector. First sighting inserts, later
/// visits bump the counter and refresh the summary.
pub fn auto_log_sector(
    ctx: &ReducerContext,
    player_id: u64,
    universe_id: u32,
    sector_number: u32,
    summary: String,
) {
    let existing = ctx.db.sector_log().iter().find(|l| {
        l.player_id == player_id && l.universe_id == universe_id && l.sector_number == sector_number
    });
    if let Some(mut entry) = existing {
        entry.visits = entry.visits.saturating_add(1);
        entry.summary = summary;
        entry.last_visit = ctx.timestamp;
        ctx.db.sector_log().id().update(entry);
        return;
    }
    let inserted = ctx.db.sector_log().try_insert(SectorLog {
        id: 0,
        player_id,
        universe_id,
        sector_number,
        summary,
        visits: 1,
        discovered_at: ctx.timestamp,
        last_visit: ctx.timestamp,
    });
    if inserted.is_err() {
        log::warn!(
            "Discovery of sector {} by player {} not logged",
            sector_number,
            player_id
        );
    }
}
