//! Tunable game rules.
//!
//! `GameRules` is the one place where turn costs, misfire odds and port
//! regeneration bounds are decided. The server keeps a copy in its
//! `game_config` singleton; the simtest builds its own.

use serde::{Deserialize, Serialize};

use crate::constants::{misfire, player, ports, turns};
use crate::errors::ActionError;

/// Rules shared by every engine in a running universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Chance that a warp jump lands in a random sector. `0.0` disables it.
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

impl Default for GameRules {
    fn default() -> Self {
        Self {
            misfire_probability: misfire::PROBABILITY,
            move_turn_cost: turns::MOVE_COST,
            trade_turn_cost: turns::TRADE_COST,
            port_regen_base: ports::REGEN_BASE,
            port_regen_min: ports::REGEN_MIN,
            port_regen_max: ports::REGEN_MAX,
            regen_interval_secs: ports::REGEN_INTERVAL_SECS,
            starting_credits: player::STARTING_CREDITS,
            starting_turns: turns::STARTING_TURNS,
            starting_ship: player::STARTING_SHIP.to_string(),
        }
    }
}

impl GameRules {
    /// Same rules with the misfire fault switched off.
    pub fn without_misfire() -> Self {
        Self {
            misfire_probability: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        if !(0.0..=1.0).contains(&self.misfire_probability) {
            return Err(ActionError::InvalidConfig(format!(
                "misfire probability {} outside [0, 1]",
                self.misfire_probability
            )));
        }
        if self.port_regen_min > self.port_regen_max {
            return Err(ActionError::InvalidConfig(format!(
                "port regen min {} above max {}",
                self.port_regen_min, self.port_regen_max
            )));
        }
        if self.regen_interval_secs == 0 {
            return Err(ActionError::InvalidConfig(
                "regen interval must be positive".into(),
            ));
        }
        if crate::catalog::find_ship(&self.starting_ship).is_none() {
            return Err(ActionError::InvalidConfig(format!(
                "starting ship {:?} is not in the catalog",
                self.starting_ship
            )));
        }
        Ok(())
    }

    /// Parse rules stored as JSON, falling back to defaults for missing keys.
    pub fn from_json(raw: &str) -> Result<Self, ActionError> {
        let rules: Self = serde_json::from_str(raw)
            .map_err(|e| ActionError::InvalidConfig(format!("rules JSON: {}", e)))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameRules::default().validate().is_ok());
        assert_eq!(GameRules::default().misfire_probability, 0.0025);
        assert_eq!(GameRules::default().move_turn_cost, 1);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let rules = GameRules {
            misfire_probability: 1.5,
            ..GameRules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_regen_bounds() {
        let rules = GameRules {
            port_regen_min: 10,
            port_regen_max: 5,
            ..GameRules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_json_fills_missing_fields() {
        let rules = GameRules::from_json(r#"{"misfire_probability": 0.0}"#).unwrap();
        assert_eq!(rules.misfire_probability, 0.0);
        assert_eq!(rules.port_regen_max, ports::REGEN_MAX);
    }

    #[test]
    fn test_json_rejects_invalid_rules() {
        let err = GameRules::from_json(r#"{"port_regen_min": 50, "port_regen_max": 10}"#);
        assert!(matches!(err, Err(ActionError::InvalidConfig(_))));
        assert!(GameRules::from_json("not json").is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_rules() {
        let rules = GameRules::without_misfire();
        assert_eq!(GameRules::from_json(&rules.to_json()).unwrap(), rules);
    }
}
