//! Commit-time invariant checks.
//!
//! Every engine re-checks the player it is about to persist. A failure here
//! means a planner bug, not a player mistake, so it surfaces as
//! [`ActionError::Invariant`] and the whole action rolls back.

use crate::catalog::find_ship;
use crate::errors::ActionError;
use crate::player::PlayerState;

/// Check a player state before it is written.
pub fn verify(player: &PlayerState) -> Result<(), ActionError> {
    let cargo = player.cargo.total();
    if cargo > player.holds_max as u64 {
        return Err(ActionError::Invariant(format!(
            "cargo {} exceeds holds {}",
            cargo, player.holds_max
        )));
    }
    let ship = find_ship(&player.ship_type).ok_or_else(|| {
        ActionError::Invariant(format!("unknown ship type {:?}", player.ship_type))
    })?;
    if player.holds_max != ship.holds {
        return Err(ActionError::Invariant(format!(
            "holds {} do not match {} ({})",
            player.holds_max, ship.name, ship.holds
        )));
    }
    let checks = [
        ("fighters", player.fighters, player.fighters_max.min(ship.fighters_max)),
        ("shields", player.shields, player.shields_max.min(ship.shields_max)),
        ("mines", player.mines, ship.mines_max),
        ("beacons", player.beacons, ship.beacons_max),
        ("genesis", player.genesis, ship.genesis_max),
    ];
    for (what, have, max) in checks {
        if have > max {
            return Err(ActionError::Invariant(format!(
                "{} {} exceeds {} max {}",
                what, have, ship.name, max
            )));
        }
    }
    Ok(())
}

/// Check that an action moved the turn counter by exactly `turn_cost`.
pub fn verify_turns(before: &PlayerState, after: &PlayerState, turn_cost: u32) -> Result<(), ActionError> {
    if before.turns_remaining.checked_sub(turn_cost) != Some(after.turns_remaining) {
        return Err(ActionError::Invariant(format!(
            "turns {} -> {} with cost {}",
            before.turns_remaining, after.turns_remaining, turn_cost
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_ship;

    fn pilot() -> PlayerState {
        PlayerState::new_pilot(find_ship("Scout Marauder").unwrap(), 1, 0, 5)
    }

    #[test]
    fn test_fresh_pilot_passes() {
        assert!(verify(&pilot()).is_ok());
    }

    #[test]
    fn test_overfull_holds_rejected() {
        let mut p = pilot();
        p.cargo.fuel = 26;
        assert!(matches!(verify(&p), Err(ActionError::Invariant(_))));
    }

    #[test]
    fn test_equipment_over_hull_max_rejected() {
        let mut p = pilot();
        p.genesis = 1;
        assert!(verify(&p).is_err());
        let mut p = pilot();
        p.shields = 101;
        assert!(verify(&p).is_err());
    }

    #[test]
    fn test_turn_accounting() {
        let before = pilot();
        let mut after = before.clone();
        after.turns_remaining -= 1;
        assert!(verify_turns(&before, &after, 1).is_ok());
        assert!(verify_turns(&before, &after, 0).is_err());
        assert!(verify_turns(&before, &before, 0).is_ok());
    }
}
