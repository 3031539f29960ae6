//! Stardock refits: ship trade-in, resource migration and equipment sales.
//!
//! Trade-in is `floor(old cost * 70%)`, net cost `max(0, new cost - trade-in)`.
//! Cargo that no longer fits is scaled down proportionally across fuel,
//! organics, equipment and colonists (each floored). Fighters, shields,
//! mines, beacons and genesis devices are each clamped to the new hull's
//! maximum. Whatever does not fit is lost, not refunded.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::catalog::{find_ship, ShipSpec};
use crate::constants::{equipment_prices, refit};
use crate::errors::ActionError;
use crate::player::{Cargo, PlayerState};
use crate::pricing::PortType;
use crate::trade::clamp_to_credits;

pub fn trade_in_value(old_cost: u64) -> u64 {
    old_cost * refit::TRADE_IN_PERCENT / 100
}

pub fn net_cost(new_cost: u64, trade_in: u64) -> u64 {
    new_cost.saturating_sub(trade_in)
}

/// Scale cargo down to fit `holds`. Returns the new cargo and units lost.
pub fn scale_cargo(cargo: Cargo, holds: u32) -> (Cargo, u64) {
    let total = cargo.total();
    if total <= holds as u64 {
        return (cargo, 0);
    }
    let scale = |x: u32| (x as u64 * holds as u64 / total) as u32;
    let scaled = Cargo {
        fuel: scale(cargo.fuel),
        organics: scale(cargo.organics),
        equipment: scale(cargo.equipment),
        colonists: scale(cargo.colonists),
    };
    (scaled, total - scaled.total())
}

/// Units lost to the smaller hull, per resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefitLosses {
    pub cargo: u64,
    pub fighters: u32,
    pub shields: u32,
    pub mines: u32,
    pub beacons: u32,
    pub genesis: u32,
}

impl RefitLosses {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefitOutcome {
    pub player: PlayerState,
    pub old_ship: String,
    pub new_ship: String,
    pub trade_in: u64,
    pub net_cost: u64,
    pub losses: RefitLosses,
    pub message: String,
}

/// Move every resource onto `ship`, clamping to its capacities.
pub fn migrate(player: &PlayerState, ship: &ShipSpec) -> (PlayerState, RefitLosses) {
    let (cargo, cargo_lost) = scale_cargo(player.cargo, ship.holds);
    let clamp = |have: u32, max: u32| (have.min(max), have.saturating_sub(max));
    let (fighters, fighters_lost) = clamp(player.fighters, ship.fighters_max);
    let (shields, shields_lost) = clamp(player.shields, ship.shields_max);
    let (mines, mines_lost) = clamp(player.mines, ship.mines_max);
    let (beacons, beacons_lost) = clamp(player.beacons, ship.beacons_max);
    let (genesis, genesis_lost) = clamp(player.genesis, ship.genesis_max);

    let next = PlayerState {
        ship_type: ship.name.to_string(),
        holds_max: ship.holds,
        fighters,
        fighters_max: ship.fighters_max,
        shields,
        shields_max: ship.shields_max,
        mines,
        beacons,
        genesis,
        cargo,
        ..player.clone()
    };
    let losses = RefitLosses {
        cargo: cargo_lost,
        fighters: fighters_lost,
        shields: shields_lost,
        mines: mines_lost,
        beacons: beacons_lost,
        genesis: genesis_lost,
    };
    (next, losses)
}

/// Plan a ship purchase at the player's current port.
pub fn plan_refit(
    player: &PlayerState,
    port: Option<&PortType>,
    ship_name: &str,
) -> Result<RefitOutcome, ActionError> {
    if !port.is_some_and(PortType::is_stardock) {
        return Err(ActionError::NotAtStardock);
    }
    let new_ship =
        find_ship(ship_name).ok_or_else(|| ActionError::UnknownShip(ship_name.to_string()))?;
    if new_ship.name.eq_ignore_ascii_case(&player.ship_type) {
        return Err(ActionError::ShipAlreadyOwned(new_ship.name.to_string()));
    }
    let old_ship = find_ship(&player.ship_type).ok_or_else(|| {
        ActionError::Invariant(format!("player flies unknown ship {:?}", player.ship_type))
    })?;

    let trade_in = trade_in_value(old_ship.cost);
    let net = net_cost(new_ship.cost, trade_in);
    if player.credits < net {
        return Err(ActionError::InsufficientCredits);
    }

    let (mut next, losses) = migrate(player, new_ship);
    next.credits -= net;

    Ok(RefitOutcome {
        message: purchase_message(new_ship.name, net, trade_in, &losses),
        player: next,
        old_ship: old_ship.name.to_string(),
        new_ship: new_ship.name.to_string(),
        trade_in,
        net_cost: net,
        losses,
    })
}

fn purchase_message(ship: &str, net: u64, trade_in: u64, losses: &RefitLosses) -> String {
    let mut msg = format!(
        "Purchased a {} for {} credits ({} trade-in applied).",
        ship, net, trade_in
    );
    if losses.is_empty() {
        return msg;
    }
    let parts: Vec<String> = [
        (losses.cargo, "cargo units"),
        (losses.fighters as u64, "fighters"),
        (losses.shields as u64, "shields"),
        (losses.mines as u64, "mines"),
        (losses.beacons as u64, "beacons"),
        (losses.genesis as u64, "genesis devices"),
    ]
    .iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, what)| format!("{} {}", n, what))
    .collect();
    msg.push_str(&format!(" Lost to the smaller hull: {}.", parts.join(", ")));
    msg
}

/// Items sold by the unit at a Stardock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Equipment {
    Fighters,
    Shields,
    Mines,
    Beacons,
    Genesis,
}

impl Equipment {
    pub fn unit_price(self) -> u32 {
        match self {
            Equipment::Fighters => equipment_prices::FIGHTER,
            Equipment::Shields => equipment_prices::SHIELD,
            Equipment::Mines => equipment_prices::MINE,
            Equipment::Beacons => equipment_prices::BEACON,
            Equipment::Genesis => equipment_prices::GENESIS,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Equipment::Fighters => "fighters",
            Equipment::Shields => "shields",
            Equipment::Mines => "mines",
            Equipment::Beacons => "beacons",
            Equipment::Genesis => "genesis devices",
        }
    }

    /// (carried, maximum) for this item on the player's current hull.
    fn capacity(self, player: &PlayerState, ship: &ShipSpec) -> (u32, u32) {
        match self {
            Equipment::Fighters => (player.fighters, player.fighters_max),
            Equipment::Shields => (player.shields, player.shields_max),
            Equipment::Mines => (player.mines, ship.mines_max),
            Equipment::Beacons => (player.beacons, ship.beacons_max),
            Equipment::Genesis => (player.genesis, ship.genesis_max),
        }
    }

    fn slot_mut(self, player: &mut PlayerState) -> &mut u32 {
        match self {
            Equipment::Fighters => &mut player.fighters,
            Equipment::Shields => &mut player.shields,
            Equipment::Mines => &mut player.mines,
            Equipment::Beacons => &mut player.beacons,
            Equipment::Genesis => &mut player.genesis,
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Equipment {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fighters" | "fighter" => Ok(Equipment::Fighters),
            "shields" | "shield" => Ok(Equipment::Shields),
            "mines" | "mine" => Ok(Equipment::Mines),
            "beacons" | "beacon" => Ok(Equipment::Beacons),
            "genesis" | "genesis_torpedo" | "genesis_torpedoes" => Ok(Equipment::Genesis),
            _ => Err(ActionError::UnknownEquipment(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentOutcome {
    pub player: PlayerState,
    pub item: Equipment,
    pub quantity: u32,
    pub unit_price: u32,
    pub total: u64,
    pub message: String,
}

/// Plan a unit purchase, clamped to free capacity on the hull, then to credits.
pub fn plan_equipment_purchase(
    player: &PlayerState,
    port: Option<&PortType>,
    item: Equipment,
    requested: u32,
) -> Result<EquipmentOutcome, ActionError> {
    if requested == 0 {
        return Err(ActionError::InvalidQuantity);
    }
    if !port.is_some_and(PortType::is_stardock) {
        return Err(ActionError::NotAtStardock);
    }
    let ship = find_ship(&player.ship_type).ok_or_else(|| {
        ActionError::Invariant(format!("player flies unknown ship {:?}", player.ship_type))
    })?;
    let (have, max) = item.capacity(player, ship);
    let room = max.saturating_sub(have);
    if room == 0 {
        return Err(ActionError::AtCapacity(item.to_string()));
    }
    let price = item.unit_price();
    let qty = clamp_to_credits(requested.min(room), price, player.credits);
    if qty == 0 {
        return Err(ActionError::InsufficientCredits);
    }

    let total = qty as u64 * price as u64;
    let mut next = player.clone();
    next.credits -= total;
    *item.slot_mut(&mut next) += qty;

    Ok(EquipmentOutcome {
        player: next,
        item,
        quantity: qty,
        unit_price: price,
        total,
        message: format!("Purchased {} {} for {} credits.", qty, item, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stardock() -> PortType {
        PortType::Stardock
    }

    fn pilot(ship: &str, credits: u64) -> PlayerState {
        PlayerState::new_pilot(find_ship(ship).unwrap(), 1, credits, 10)
    }

    #[test]
    fn test_trade_in_scenario() {
        assert_eq!(trade_in_value(5_000), 3_500);
        assert_eq!(net_cost(10_000, trade_in_value(5_000)), 6_500);
        assert_eq!(trade_in_value(999), 699);
        assert_eq!(net_cost(1_000, 5_000), 0);
    }

    #[test]
    fn test_refit_scout_to_cruiser() {
        let p = pilot("Scout Marauder", 7_000);
        let out = plan_refit(&p, Some(&stardock()), "Merchant Cruiser").unwrap();
        assert_eq!(out.trade_in, 3_500);
        assert_eq!(out.net_cost, 6_500);
        assert_eq!(out.player.credits, 500);
        assert_eq!(out.player.ship_type, "Merchant Cruiser");
        assert_eq!(out.player.holds_max, 75);
        assert!(out.losses.is_empty());
        assert!(out.message.contains("6500 credits"));
    }

    #[test]
    fn test_refit_rejections() {
        let p = pilot("Scout Marauder", 6_499);
        assert_eq!(
            plan_refit(&p, Some(&stardock()), "Merchant Cruiser"),
            Err(ActionError::InsufficientCredits)
        );
        assert_eq!(
            plan_refit(&p, Some(&stardock()), "scout marauder"),
            Err(ActionError::ShipAlreadyOwned("Scout Marauder".into()))
        );
        assert_eq!(
            plan_refit(&p, Some(&stardock()), "Star Destroyer"),
            Err(ActionError::UnknownShip("Star Destroyer".into()))
        );
        let sbs = PortType::parse("SBS").unwrap();
        assert_eq!(
            plan_refit(&p, Some(&sbs), "Escape Pod"),
            Err(ActionError::NotAtStardock)
        );
        assert_eq!(plan_refit(&p, None, "Escape Pod"), Err(ActionError::NotAtStardock));
    }

    #[test]
    fn test_downsize_scales_cargo_and_clamps_equipment() {
        let mut p = pilot("Colonial Transport", 100_000);
        p.cargo = Cargo {
            fuel: 100,
            organics: 50,
            equipment: 30,
            colonists: 20,
        };
        p.fighters = 200;
        p.shields = 500;
        p.beacons = 10;
        p.genesis = 7;

        let out = plan_refit(&p, Some(&stardock()), "Scout Marauder").unwrap();
        let c = out.player.cargo;
        // 25 holds / 200 carried
        assert_eq!((c.fuel, c.organics, c.equipment, c.colonists), (12, 6, 3, 2));
        assert!(c.total() <= 25);
        assert_eq!(out.losses.cargo, 200 - 23);
        assert_eq!(out.player.fighters, 200);
        assert_eq!(out.player.shields, 100);
        assert_eq!(out.losses.shields, 400);
        assert_eq!(out.player.beacons, 5);
        assert_eq!(out.player.genesis, 0);
        assert_eq!(out.losses.genesis, 7);
        assert!(out.message.contains("Lost to the smaller hull"));
        assert!(out.message.contains("400 shields"));
    }

    #[test]
    fn test_scale_cargo_noop_when_it_fits() {
        let cargo = Cargo {
            fuel: 3,
            ..Cargo::default()
        };
        assert_eq!(scale_cargo(cargo, 3), (cargo, 0));
    }

    #[test]
    fn test_equipment_clamped_to_capacity_then_credits() {
        let mut p = pilot("Scout Marauder", 1_000_000);
        p.fighters = 240;
        let out = plan_equipment_purchase(&p, Some(&stardock()), Equipment::Fighters, 100).unwrap();
        assert_eq!(out.quantity, 10);
        assert_eq!(out.player.fighters, 250);
        assert_eq!(out.total, 1_000);

        let poor = pilot("Scout Marauder", 120);
        let out = plan_equipment_purchase(&poor, Some(&stardock()), Equipment::Shields, 50).unwrap();
        assert_eq!(out.quantity, 2);
        assert_eq!(out.player.credits, 20);
    }

    #[test]
    fn test_equipment_rejections() {
        let p = pilot("Scout Marauder", 1_000);
        assert_eq!(
            plan_equipment_purchase(&p, Some(&stardock()), Equipment::Mines, 1),
            Err(ActionError::AtCapacity("mines".into()))
        );
        assert_eq!(
            plan_equipment_purchase(&p, Some(&stardock()), Equipment::Genesis, 0),
            Err(ActionError::InvalidQuantity)
        );
        assert_eq!(
            plan_equipment_purchase(&pilot("Merchant Cruiser", 100), Some(&stardock()), Equipment::Genesis, 1),
            Err(ActionError::InsufficientCredits)
        );
        assert!("lasers".parse::<Equipment>().is_err());
        assert_eq!("Fighter".parse::<Equipment>().unwrap(), Equipment::Fighters);
    }
}
