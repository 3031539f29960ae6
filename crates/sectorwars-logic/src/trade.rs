//! Trade execution planning and port stock regeneration.
//!
//! Planning is pure: given the locked player and port, compute the clamped
//! quantity, the new player state and the new port stock. Nothing is written
//! unless the whole plan succeeds.
//!
//! Buy path (port sells, stock depletes):
//! `qty = min(requested, free holds, port stock)`, then
//! `qty = min(qty, credits / unit price)`.
//!
//! Sell path (port buys, stock grows):
//! `qty = min(requested, cargo of that commodity)`.

use serde::Serialize;

use crate::config::GameRules;
use crate::constants::prices;
use crate::errors::ActionError;
use crate::player::PlayerState;
use crate::pricing::{unit_price, Commodity, PortDirection, PortType, TradeAction};

/// Port substate of a sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStock {
    pub port_type: PortType,
    /// Fuel, organics, equipment.
    pub stock: [u32; 3],
    pub demand_pct: [u32; 3],
}

impl PortStock {
    pub fn stock_of(&self, commodity: Commodity) -> u32 {
        self.stock[commodity.index()]
    }

    pub fn price_of(&self, commodity: Commodity, direction: PortDirection) -> u32 {
        unit_price(
            commodity,
            direction,
            self.demand_pct[commodity.index()],
            self.port_type.is_rare(),
        )
    }
}

/// Immutable record of one completed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReceipt {
    /// `fuel`, `organics`, `equipment` or `colonists`.
    pub item: String,
    pub action: TradeAction,
    pub quantity: u32,
    pub unit_price: u32,
    pub total: u64,
    pub port_type: String,
    /// Port stock of the traded commodity after the trade. Colonist
    /// purchases leave port stock alone and report 0.
    pub port_remaining: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeOutcome {
    pub player: PlayerState,
    pub stock: [u32; 3],
    pub receipt: TradeReceipt,
    pub turn_cost: u32,
}

/// Plan a commodity trade at the player's current port.
pub fn plan_trade(
    player: &PlayerState,
    port: Option<&PortStock>,
    commodity: Commodity,
    action: TradeAction,
    requested: u32,
    rules: &GameRules,
) -> Result<TradeOutcome, ActionError> {
    if requested == 0 {
        return Err(ActionError::InvalidQuantity);
    }
    player.require_turns(rules.trade_turn_cost)?;
    let port = port.ok_or(ActionError::NoPort)?;
    let direction = port.port_type.check_action(commodity, action)?;
    let price = port.price_of(commodity, direction);

    let mut next = player.clone();
    let mut stock = port.stock;
    let idx = commodity.index();

    let quantity = match direction {
        PortDirection::Sells => {
            let free = player.free_holds();
            if free == 0 {
                return Err(ActionError::NoCargoSpace);
            }
            let available = port.stock_of(commodity);
            if available == 0 {
                return Err(ActionError::PortOutOfStock(commodity.to_string()));
            }
            let qty = clamp_to_credits(requested.min(free).min(available), price, player.credits);
            if qty == 0 {
                return Err(ActionError::InsufficientCredits);
            }
            next.credits -= qty as u64 * price as u64;
            *next.cargo.slot_mut(commodity) += qty;
            stock[idx] -= qty;
            qty
        }
        PortDirection::Buys => {
            let qty = requested.min(player.cargo.get(commodity));
            if qty == 0 {
                return Err(ActionError::NothingToSell(commodity.to_string()));
            }
            stock[idx] = stock[idx].checked_add(qty).ok_or_else(|| {
                ActionError::Invariant(format!(
                    "{} stock {} cannot take {} more",
                    commodity, stock[idx], qty
                ))
            })?;
            next.credits = next.credits.saturating_add(qty as u64 * price as u64);
            *next.cargo.slot_mut(commodity) -= qty;
            qty
        }
    };
    next.spend_turns(rules.trade_turn_cost)?;

    Ok(TradeOutcome {
        player: next,
        stock,
        receipt: TradeReceipt {
            item: commodity.to_string(),
            action,
            quantity,
            unit_price: price,
            total: quantity as u64 * price as u64,
            port_type: port.port_type.code(),
            port_remaining: stock[idx],
        },
        turn_cost: rules.trade_turn_cost,
    })
}

/// Plan a colonist purchase. Fixed price, capped per transaction, takes
/// cargo space like any commodity, not offered at a Stardock.
pub fn plan_colonist_purchase(
    player: &PlayerState,
    port: Option<&PortStock>,
    requested: u32,
    rules: &GameRules,
) -> Result<TradeOutcome, ActionError> {
    if requested == 0 {
        return Err(ActionError::InvalidQuantity);
    }
    player.require_turns(rules.trade_turn_cost)?;
    let port = port.ok_or(ActionError::NoPort)?;
    if port.port_type.is_stardock() {
        return Err(ActionError::ColonistsUnavailable);
    }
    let free = player.free_holds();
    if free == 0 {
        return Err(ActionError::NoCargoSpace);
    }
    let price = prices::COLONIST_PRICE;
    let qty = clamp_to_credits(
        requested.min(prices::COLONIST_MAX_PER_TRADE).min(free),
        price,
        player.credits,
    );
    if qty == 0 {
        return Err(ActionError::InsufficientCredits);
    }

    let mut next = player.clone();
    next.credits -= qty as u64 * price as u64;
    next.cargo.colonists += qty;
    next.spend_turns(rules.trade_turn_cost)?;

    Ok(TradeOutcome {
        player: next,
        stock: port.stock,
        receipt: TradeReceipt {
            item: "colonists".to_string(),
            action: TradeAction::Buy,
            quantity: qty,
            unit_price: price,
            total: qty as u64 * price as u64,
            port_type: port.port_type.code(),
            port_remaining: 0,
        },
        turn_cost: rules.trade_turn_cost,
    })
}

/// Largest quantity not above `qty` that `credits` can pay for.
pub fn clamp_to_credits(qty: u32, unit_price: u32, credits: u64) -> u32 {
    if unit_price == 0 {
        return qty;
    }
    if qty as u64 * unit_price as u64 > credits {
        (credits / unit_price as u64).min(qty as u64) as u32
    } else {
        qty
    }
}

/// One regeneration cycle for one port. Stardocks do not regenerate.
pub fn regenerate(port: &PortStock, rules: &GameRules) -> [u32; 3] {
    if port.port_type.is_stardock() {
        return port.stock;
    }
    port.stock.map(|q| {
        q.saturating_add(rules.port_regen_base)
            .clamp(rules.port_regen_min, rules.port_regen_max)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_ship;

    fn pilot(credits: u64) -> PlayerState {
        PlayerState::new_pilot(find_ship("Merchant Cruiser").unwrap(), 1, credits, 50)
    }

    fn port(code: &str, stock: u32) -> PortStock {
        PortStock {
            port_type: PortType::parse(code).unwrap(),
            stock: [stock; 3],
            demand_pct: [100; 3],
        }
    }

    #[test]
    fn test_buy_clamps_to_cargo_space() {
        let p = pilot(1_000_000);
        let out = plan_trade(
            &p,
            Some(&port("BBS", 5_000)),
            Commodity::Equipment,
            TradeAction::Buy,
            500,
            &GameRules::default(),
        )
        .unwrap();
        assert_eq!(out.receipt.quantity, 75);
        assert_eq!(out.player.cargo.equipment, 75);
        assert_eq!(out.stock[2], 5_000 - 75);
        assert_eq!(out.receipt.unit_price, 28);
        assert_eq!(out.player.credits, 1_000_000 - 75 * 28);
        assert_eq!(out.player.turns_remaining, 49);
        assert_eq!(out.receipt.port_remaining, 4_925);
    }

    #[test]
    fn test_buy_clamps_to_port_stock() {
        let out = plan_trade(
            &pilot(1_000_000),
            Some(&port("BBS", 10)),
            Commodity::Equipment,
            TradeAction::Buy,
            50,
            &GameRules::default(),
        )
        .unwrap();
        assert_eq!(out.receipt.quantity, 10);
        assert_eq!(out.stock[2], 0);
    }

    #[test]
    fn test_buy_clamps_to_credits() {
        let out = plan_trade(
            &pilot(100),
            Some(&port("BBS", 1_000)),
            Commodity::Equipment,
            TradeAction::Buy,
            50,
            &GameRules::default(),
        )
        .unwrap();
        assert_eq!(out.receipt.quantity, 3);
        assert_eq!(out.player.credits, 100 - 84);
    }

    #[test]
    fn test_buy_rejects_when_broke() {
        let err = plan_trade(
            &pilot(10),
            Some(&port("BBS", 1_000)),
            Commodity::Equipment,
            TradeAction::Buy,
            5,
            &GameRules::default(),
        )
        .unwrap_err();
        assert_eq!(err, ActionError::InsufficientCredits);
    }

    #[test]
    fn test_buy_rejects_empty_port_and_full_holds() {
        let rules = GameRules::default();
        let err = plan_trade(
            &pilot(1_000),
            Some(&port("BBS", 0)),
            Commodity::Equipment,
            TradeAction::Buy,
            5,
            &rules,
        )
        .unwrap_err();
        assert!(matches!(err, ActionError::PortOutOfStock(_)));

        let mut full = pilot(1_000);
        full.cargo.fuel = 75;
        let err = plan_trade(
            &full,
            Some(&port("BBS", 100)),
            Commodity::Equipment,
            TradeAction::Buy,
            5,
            &rules,
        )
        .unwrap_err();
        assert_eq!(err, ActionError::NoCargoSpace);
    }

    #[test]
    fn test_sell_clamps_to_cargo_and_grows_stock() {
        let mut p = pilot(0);
        p.cargo.fuel = 30;
        let out = plan_trade(
            &p,
            Some(&port("BBS", 14_990)),
            Commodity::Fuel,
            TradeAction::Sell,
            100,
            &GameRules::default(),
        )
        .unwrap();
        assert_eq!(out.receipt.quantity, 30);
        assert_eq!(out.player.cargo.fuel, 0);
        assert_eq!(out.player.credits, 30 * 34);
        // trades never clamp to the regen ceiling
        assert_eq!(out.stock[0], 15_020);
    }

    #[test]
    fn test_sell_into_full_stock_is_refused() {
        let mut p = pilot(0);
        p.cargo.fuel = 30;
        let full = port("BBS", u32::MAX - 5);
        let err = plan_trade(
            &p,
            Some(&full),
            Commodity::Fuel,
            TradeAction::Sell,
            30,
            &GameRules::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ActionError::Invariant(_)));
    }

    #[test]
    fn test_sell_nothing() {
        let err = plan_trade(
            &pilot(0),
            Some(&port("BBS", 100)),
            Commodity::Organics,
            TradeAction::Sell,
            1,
            &GameRules::default(),
        )
        .unwrap_err();
        assert_eq!(err, ActionError::NothingToSell("organics".into()));
    }

    #[test]
    fn test_wrong_direction_rejected() {
        let err = plan_trade(
            &pilot(1_000),
            Some(&port("BBS", 100)),
            Commodity::Fuel,
            TradeAction::Buy,
            1,
            &GameRules::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ActionError::DirectionMismatch { .. }));
    }

    #[test]
    fn test_trade_needs_turn_and_port() {
        let mut p = pilot(1_000);
        p.turns_remaining = 0;
        let rules = GameRules::default();
        assert_eq!(
            plan_trade(&p, Some(&port("BBS", 1)), Commodity::Fuel, TradeAction::Sell, 1, &rules),
            Err(ActionError::NotEnoughTurns)
        );
        assert_eq!(
            plan_trade(&pilot(1), None, Commodity::Fuel, TradeAction::Sell, 1, &rules),
            Err(ActionError::NoPort)
        );
        assert_eq!(
            plan_trade(
                &pilot(1),
                Some(&port("STARDOCK", 0)),
                Commodity::Fuel,
                TradeAction::Sell,
                1,
                &rules
            ),
            Err(ActionError::NoPort)
        );
    }

    #[test]
    fn test_colonists_capped_and_priced() {
        let mut p = PlayerState::new_pilot(find_ship("Colonial Transport").unwrap(), 1, 1_000_000, 5);
        p.holds_max = 5_000;
        let out = plan_colonist_purchase(&p, Some(&port("SSB", 10)), 4_000, &GameRules::default())
            .unwrap();
        assert_eq!(out.receipt.quantity, 1_000);
        assert_eq!(out.receipt.unit_price, 100);
        assert_eq!(out.player.cargo.colonists, 1_000);
        assert_eq!(out.player.credits, 1_000_000 - 100_000);
        assert_eq!(out.stock, [10; 3]);
    }

    #[test]
    fn test_colonists_share_holds_and_credit_clamp() {
        let mut p = pilot(550);
        p.cargo.organics = 70;
        let out = plan_colonist_purchase(&p, Some(&port("SSB", 10)), 100, &GameRules::default())
            .unwrap();
        assert_eq!(out.receipt.quantity, 5);
        assert_eq!(out.player.free_holds(), 0);
    }

    #[test]
    fn test_colonists_not_at_stardock() {
        let err = plan_colonist_purchase(
            &pilot(10_000),
            Some(&port("STARDOCK", 0)),
            10,
            &GameRules::default(),
        )
        .unwrap_err();
        assert_eq!(err, ActionError::ColonistsUnavailable);
    }

    #[test]
    fn test_regenerate_clamps_into_bounds() {
        let rules = GameRules::default();
        let p = PortStock {
            port_type: PortType::parse("SBS").unwrap(),
            stock: [0, 14_900, 40_000],
            demand_pct: [100; 3],
        };
        assert_eq!(regenerate(&p, &rules), [1_000, 15_000, 15_000]);
    }

    #[test]
    fn test_regenerate_skips_stardock() {
        let p = port("STARDOCK", 0);
        assert_eq!(regenerate(&p, &GameRules::default()), [0; 3]);
    }

    #[test]
    fn test_clamp_to_credits() {
        assert_eq!(clamp_to_credits(10, 7, 100), 10);
        assert_eq!(clamp_to_credits(10, 70, 100), 1);
        assert_eq!(clamp_to_credits(10, 170, 100), 0);
    }
}
