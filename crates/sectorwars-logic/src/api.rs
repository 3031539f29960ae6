//! Request validation and response bodies for the player actions.
//!
//! Requests are checked here, before any row is locked. Commodity, trade
//! action and equipment arrive as strings on the wire and leave as closed
//! enums; quantities and sector numbers leave as unsigned values.

use serde::{Deserialize, Serialize};

use crate::errors::ActionError;
use crate::navigation::MovePlan;
use crate::player::PlayerState;
use crate::pricing::{Commodity, Quote, TradeAction};
use crate::refit::{Equipment, EquipmentOutcome, RefitLosses, RefitOutcome};
use crate::trade::TradeOutcome;

fn positive_quantity(raw: i64) -> Result<u32, ActionError> {
    if raw <= 0 {
        return Err(ActionError::InvalidQuantity);
    }
    Ok(u32::try_from(raw).unwrap_or(u32::MAX))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub destination_sector: i64,
}

impl MoveRequest {
    pub fn validate(&self) -> Result<u32, ActionError> {
        match u32::try_from(self.destination_sector) {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ActionError::InvalidDestination),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeRequest {
    pub commodity: String,
    pub action: String,
    pub quantity: i64,
}

/// A trade request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidTrade {
    pub commodity: Commodity,
    pub action: TradeAction,
    pub quantity: u32,
}

impl TradeRequest {
    pub fn validate(&self) -> Result<ValidTrade, ActionError> {
        Ok(ValidTrade {
            commodity: self.commodity.parse()?,
            action: self.action.parse()?,
            quantity: positive_quantity(self.quantity)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColonistRequest {
    pub quantity: i64,
}

impl ColonistRequest {
    pub fn validate(&self) -> Result<u32, ActionError> {
        positive_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseShipRequest {
    pub ship_name: String,
}

impl PurchaseShipRequest {
    pub fn validate(&self) -> Result<&str, ActionError> {
        let name = self.ship_name.trim();
        if name.is_empty() {
            return Err(ActionError::UnknownShip(String::new()));
        }
        Ok(name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquipmentRequest {
    pub item: String,
    pub quantity: i64,
}

impl EquipmentRequest {
    pub fn validate(&self) -> Result<(Equipment, u32), ActionError> {
        Ok((self.item.parse()?, positive_quantity(self.quantity)?))
    }
}

/// The `player` block of every response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: u64,
    #[serde(flatten)]
    pub state: PlayerState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub success: bool,
    pub player: PlayerView,
    pub turn_cost: u32,
    pub misfired: bool,
    pub misfire_message: Option<String>,
}

impl MoveResponse {
    pub fn from_plan(player_id: u64, plan: &MovePlan) -> Self {
        Self {
            success: true,
            player: PlayerView {
                id: player_id,
                state: plan.player.clone(),
            },
            turn_cost: plan.turn_cost,
            misfired: plan.misfired,
            misfire_message: plan.misfire_message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub success: bool,
    pub commodity: String,
    pub action: TradeAction,
    pub quantity: u32,
    pub unit_price: u32,
    pub total_cost: u64,
    pub player: PlayerView,
    pub port_quantity_remaining: u32,
}

impl TradeResponse {
    pub fn from_outcome(player_id: u64, outcome: &TradeOutcome) -> Self {
        let r = &outcome.receipt;
        Self {
            success: true,
            commodity: r.item.clone(),
            action: r.action,
            quantity: r.quantity,
            unit_price: r.unit_price,
            total_cost: r.total,
            player: PlayerView {
                id: player_id,
                state: outcome.player.clone(),
            },
            port_quantity_remaining: r.port_remaining,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub success: bool,
    pub message: String,
    pub player: PlayerView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub losses: Option<RefitLosses>,
}

impl PurchaseResponse {
    pub fn from_refit(player_id: u64, outcome: &RefitOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message.clone(),
            player: PlayerView {
                id: player_id,
                state: outcome.player.clone(),
            },
            losses: Some(outcome.losses),
        }
    }

    pub fn from_equipment(player_id: u64, outcome: &EquipmentOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message.clone(),
            player: PlayerView {
                id: player_id,
                state: outcome.player.clone(),
            },
            losses: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortReportResponse {
    pub success: bool,
    pub sector_number: u32,
    pub port_type: String,
    pub quotes: Vec<Quote>,
}
