//! Port commodity pricing.
//!
//! A port type is three letters, one per commodity (fuel, organics,
//! equipment). `S` means the port sells that commodity to players, `B` means
//! it buys it from them. `SSS` and `BBB` are rare and pay a bonus in the
//! player's favour in both directions. `STARDOCK` trades no commodities.
//!
//! Price formula, with `r = demand_pct / 100`:
//! - port sells (player buys): `round(base * 0.5 * r / bonus)`
//! - port buys (player sells): `round(base * 1.7 * r * bonus)`
//!
//! Quotes and trade execution both go through [`unit_price`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ports, prices};
use crate::errors::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commodity {
    Fuel,
    Organics,
    Equipment,
}

impl Commodity {
    pub const ALL: [Commodity; 3] = [Commodity::Fuel, Commodity::Organics, Commodity::Equipment];

    pub fn base_price(self) -> u32 {
        match self {
            Commodity::Fuel => prices::FUEL_BASE,
            Commodity::Organics => prices::ORGANICS_BASE,
            Commodity::Equipment => prices::EQUIPMENT_BASE,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Commodity::Fuel => 0,
            Commodity::Organics => 1,
            Commodity::Equipment => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Commodity::Fuel => "fuel",
            Commodity::Organics => "organics",
            Commodity::Equipment => "equipment",
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commodity {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fuel" | "fuel_ore" => Ok(Commodity::Fuel),
            "organics" => Ok(Commodity::Organics),
            "equipment" => Ok(Commodity::Equipment),
            _ => Err(ActionError::UnknownCommodity(s.to_string())),
        }
    }
}

/// What the player asks to do with a commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeAction::Buy),
            "sell" => Ok(TradeAction::Sell),
            _ => Err(ActionError::UnknownTradeAction(s.to_string())),
        }
    }
}

/// Which way a port trades one commodity, from the port's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortDirection {
    /// `S`: the port sells, so the player buys.
    Sells,
    /// `B`: the port buys, so the player sells.
    Buys,
}

impl PortDirection {
    pub fn player_action(self) -> TradeAction {
        match self {
            PortDirection::Sells => TradeAction::Buy,
            PortDirection::Buys => TradeAction::Sell,
        }
    }

    fn letter(self) -> char {
        match self {
            PortDirection::Sells => 'S',
            PortDirection::Buys => 'B',
        }
    }

    fn verb(self) -> &'static str {
        match self {
            PortDirection::Sells => "sells",
            PortDirection::Buys => "buys",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    /// Directions for fuel, organics, equipment in that order.
    Trading([PortDirection; 3]),
    Stardock,
}

impl PortType {
    /// Parse a stored port code. Returns `None` for anything that is not one
    /// of the eight trading codes or `STARDOCK`.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case(ports::STARDOCK) {
            return Some(PortType::Stardock);
        }
        let letters: Vec<char> = code.chars().collect();
        if letters.len() != 3 {
            return None;
        }
        let mut dirs = [PortDirection::Sells; 3];
        for (slot, c) in dirs.iter_mut().zip(letters) {
            *slot = match c.to_ascii_uppercase() {
                'S' => PortDirection::Sells,
                'B' => PortDirection::Buys,
                _ => return None,
            };
        }
        Some(PortType::Trading(dirs))
    }

    pub fn code(&self) -> String {
        match self {
            PortType::Trading(dirs) => dirs.iter().map(|d| d.letter()).collect(),
            PortType::Stardock => ports::STARDOCK.to_string(),
        }
    }

    pub fn is_stardock(&self) -> bool {
        matches!(self, PortType::Stardock)
    }

    /// All-sell or all-buy across every commodity.
    pub fn is_rare(&self) -> bool {
        match self {
            PortType::Trading(dirs) => dirs.iter().all(|d| *d == dirs[0]),
            PortType::Stardock => false,
        }
    }

    pub fn direction(&self, commodity: Commodity) -> Option<PortDirection> {
        match self {
            PortType::Trading(dirs) => Some(dirs[commodity.index()]),
            PortType::Stardock => None,
        }
    }

    /// Check that `action` is what this port allows for `commodity`.
    pub fn check_action(
        &self,
        commodity: Commodity,
        action: TradeAction,
    ) -> Result<PortDirection, ActionError> {
        let Some(direction) = self.direction(commodity) else {
            return Err(ActionError::NoPort);
        };
        if direction.player_action() != action {
            return Err(ActionError::DirectionMismatch {
                commodity: commodity.to_string(),
                action: action.to_string(),
                port_verb: direction.verb(),
            });
        }
        Ok(direction)
    }

    /// Every trading code, in a stable order.
    pub fn all_trading() -> Vec<PortType> {
        ["SSS", "SSB", "SBS", "SBB", "BSS", "BSB", "BBS", "BBB"]
            .iter()
            .filter_map(|c| PortType::parse(c))
            .collect()
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Unit price for one commodity at one port.
///
/// `round(base * factor * demand / 100)`, with the rare-port bonus applied
/// in the player's favour. Unlike the bare formula, a result that rounds to
/// 0 is raised to 1, so credit clamps can always divide by it.
pub fn unit_price(
    commodity: Commodity,
    direction: PortDirection,
    demand_pct: u32,
    rare: bool,
) -> u32 {
    let base = commodity.base_price() as f64;
    let ratio = demand_pct as f64 / 100.0;
    let bonus = if rare { prices::RARE_PORT_BONUS } else { 1.0 };
    let raw = match direction {
        PortDirection::Sells => base * prices::PORT_SELLS_FACTOR * ratio / bonus,
        PortDirection::Buys => base * prices::PORT_BUYS_FACTOR * ratio * bonus,
    };
    (raw.round() as u32).max(1)
}

/// A read-only price quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub commodity: Commodity,
    /// What the player may do here: `buy` or `sell`.
    pub action: TradeAction,
    pub unit_price: u32,
    pub stock: u32,
    pub demand_pct: u32,
}

/// Quote one commodity. `None` at a Stardock.
pub fn quote(port: &PortType, commodity: Commodity, stock: u32, demand_pct: u32) -> Option<Quote> {
    let direction = port.direction(commodity)?;
    Some(Quote {
        commodity,
        action: direction.player_action(),
        unit_price: unit_price(commodity, direction, demand_pct, port.is_rare()),
        stock,
        demand_pct,
    })
}

/// Quotes for all three commodities at a trading port.
pub fn port_report(port: &PortType, stock: [u32; 3], demand_pct: [u32; 3]) -> Vec<Quote> {
    Commodity::ALL
        .iter()
        .filter_map(|&c| quote(port, c, stock[c.index()], demand_pct[c.index()]))
        .collect()
}
