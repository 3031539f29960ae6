//! Warp navigation: connectivity, turn cost and the misfire fault.
//!
//! Two sectors are connected when a warp leads from the current sector to the
//! destination, or a two-way warp leads from the destination back to the
//! current sector. Each jump costs `move_turn_cost` turns and, with
//! probability `misfire_probability`, lands in a uniformly random sector that
//! is neither the intended destination nor the origin.

use rand::Rng;
use serde::Serialize;

use crate::config::GameRules;
use crate::errors::ActionError;
use crate::player::PlayerState;

/// A warp between two sector numbers of one universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarpEdge {
    pub from: u32,
    pub to: u32,
    pub is_two_way: bool,
}

impl WarpEdge {
    pub fn one_way(from: u32, to: u32) -> Self {
        Self {
            from,
            to,
            is_two_way: false,
        }
    }

    pub fn two_way(from: u32, to: u32) -> Self {
        Self {
            from,
            to,
            is_two_way: true,
        }
    }

    /// Does this edge let a ship jump `from -> to`?
    pub fn allows(&self, from: u32, to: u32) -> bool {
        (self.from == from && self.to == to)
            || (self.is_two_way && self.from == to && self.to == from)
    }
}

pub fn is_connected(edges: &[WarpEdge], from: u32, to: u32) -> bool {
    edges.iter().any(|e| e.allows(from, to))
}

/// Every sector reachable in one jump from `from`, sorted, no duplicates.
pub fn neighbors(edges: &[WarpEdge], from: u32) -> Vec<u32> {
    let mut out: Vec<u32> = edges
        .iter()
        .filter_map(|e| {
            if e.from == from {
                Some(e.to)
            } else if e.is_two_way && e.to == from {
                Some(e.from)
            } else {
                None
            }
        })
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Roll the misfire fault for one jump.
///
/// Sectors are numbered `1..=sector_count`. Returns the sector the ship
/// actually lands in when the fault fires, or `None` for a clean jump. If the
/// universe has no third sector to land in, the jump is always clean.
pub fn roll_misfire<R: Rng>(
    rng: &mut R,
    probability: f64,
    current: u32,
    intended: u32,
    sector_count: u32,
) -> Option<u32> {
    if probability <= 0.0 || rng.gen::<f64>() >= probability {
        return None;
    }
    let excluded: Vec<u32> = {
        let mut v = vec![current, intended];
        v.retain(|&s| (1..=sector_count).contains(&s));
        v.sort_unstable();
        v.dedup();
        v
    };
    let candidates = sector_count.checked_sub(excluded.len() as u32)?;
    if candidates == 0 {
        return None;
    }
    // k-th sector number in 1..=sector_count skipping the excluded ones
    let mut pick = rng.gen_range(1..=candidates);
    for &skip in &excluded {
        if pick >= skip {
            pick += 1;
        }
    }
    Some(pick)
}

/// What the destination sector looks like to the resolver.
#[derive(Debug, Clone, Copy)]
pub struct DestinationInfo {
    pub exists: bool,
    pub connected: bool,
}

/// A resolved jump, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePlan {
    #[serde(skip)]
    pub player: PlayerState,
    pub from: u32,
    pub intended: u32,
    pub actual: u32,
    pub misfired: bool,
    pub turn_cost: u32,
    pub misfire_message: Option<String>,
}

/// Resolve a jump for a locked player.
pub fn plan_move<R: Rng>(
    player: &PlayerState,
    destination: u32,
    info: DestinationInfo,
    sector_count: u32,
    rules: &GameRules,
    rng: &mut R,
) -> Result<MovePlan, ActionError> {
    let from = player.current_sector;
    if destination == 0 || destination == from {
        return Err(ActionError::InvalidDestination);
    }
    if !info.exists {
        return Err(ActionError::DestinationNotFound);
    }
    if !info.connected {
        return Err(ActionError::NoWarpConnection);
    }

    let turn_cost = rules.move_turn_cost;
    let mut next = player.clone();
    next.spend_turns(turn_cost)?;

    let landed = roll_misfire(rng, rules.misfire_probability, from, destination, sector_count);
    let actual = landed.unwrap_or(destination);
    next.current_sector = actual;

    Ok(MovePlan {
        player: next,
        from,
        intended: destination,
        actual,
        misfired: landed.is_some(),
        turn_cost,
        misfire_message: landed.map(|s| misfire_notice(destination, s)),
    })
}

pub fn misfire_notice(intended: u32, actual: u32) -> String {
    format!(
        "Warp drive misfire! You were headed for sector {} but emerged in sector {}.",
        intended, actual
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_ship;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pilot_at(sector: u32, turns: u32) -> PlayerState {
        PlayerState::new_pilot(find_ship("Merchant Cruiser").unwrap(), sector, 0, turns)
    }

    const OK: DestinationInfo = DestinationInfo {
        exists: true,
        connected: true,
    };

    #[test]
    fn test_connectivity_rules() {
        let edges = [WarpEdge::one_way(1, 2), WarpEdge::two_way(3, 1)];
        assert!(is_connected(&edges, 1, 2));
        assert!(!is_connected(&edges, 2, 1));
        assert!(is_connected(&edges, 3, 1));
        assert!(is_connected(&edges, 1, 3));
        assert!(!is_connected(&edges, 2, 3));
        assert_eq!(neighbors(&edges, 1), vec![2, 3]);
        assert_eq!(neighbors(&edges, 2), Vec::<u32>::new());
    }

    #[test]
    fn test_clean_move_scenario() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_move(
            &pilot_at(1, 50),
            2,
            OK,
            10,
            &GameRules::without_misfire(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(plan.player.current_sector, 2);
        assert_eq!(plan.player.turns_remaining, 49);
        assert!(!plan.misfired);
        assert!(plan.misfire_message.is_none());
    }

    #[test]
    fn test_move_rejections() {
        let mut rng = StdRng::seed_from_u64(7);
        let rules = GameRules::without_misfire();
        let p = pilot_at(1, 50);
        assert_eq!(
            plan_move(&p, 1, OK, 10, &rules, &mut rng),
            Err(ActionError::InvalidDestination)
        );
        assert_eq!(
            plan_move(
                &p,
                99,
                DestinationInfo {
                    exists: false,
                    connected: false
                },
                10,
                &rules,
                &mut rng
            ),
            Err(ActionError::DestinationNotFound)
        );
        assert_eq!(
            plan_move(
                &p,
                5,
                DestinationInfo {
                    exists: true,
                    connected: false
                },
                10,
                &rules,
                &mut rng
            ),
            Err(ActionError::NoWarpConnection)
        );
        assert_eq!(
            plan_move(&pilot_at(1, 0), 2, OK, 10, &rules, &mut rng),
            Err(ActionError::NotEnoughTurns)
        );
    }

    #[test]
    fn test_certain_misfire_avoids_origin_and_target() {
        let mut rng = StdRng::seed_from_u64(99);
        let rules = GameRules {
            misfire_probability: 1.0,
            ..GameRules::default()
        };
        for _ in 0..500 {
            let plan = plan_move(&pilot_at(4, 5), 5, OK, 6, &rules, &mut rng).unwrap();
            assert!(plan.misfired);
            assert_ne!(plan.actual, 5);
            assert_ne!(plan.actual, 4);
            assert!((1..=6).contains(&plan.actual));
            assert_eq!(plan.player.turns_remaining, 4);
            assert!(plan.misfire_message.as_ref().unwrap().contains("sector 5"));
        }
    }

    #[test]
    fn test_misfire_covers_every_candidate() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 8];
        for _ in 0..2_000 {
            let s = roll_misfire(&mut rng, 1.0, 2, 7, 8).unwrap();
            seen[(s - 1) as usize] = true;
        }
        assert_eq!(seen, [true, false, true, true, true, true, false, true]);
    }

    #[test]
    fn test_two_sector_universe_never_misfires() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(roll_misfire(&mut rng, 1.0, 1, 2, 2), None);
        }
    }

    #[test]
    fn test_zero_probability_never_draws() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert_eq!(roll_misfire(&mut rng, 0.0, 1, 2, 100), None);
        }
    }
}
