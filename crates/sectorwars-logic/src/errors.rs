//! Action error taxonomy.
//!
//! Every rejected action resolves to one `ActionError`. The variant decides
//! the HTTP-style status and the short message a player sees; internal
//! failures keep their detail for the server log only.

use serde::Serialize;
use thiserror::Error;

/// Broad class of a failure, in the order the engines detect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No authenticated player. Rejected before any lock.
    Unauthorized,
    /// Malformed request. Rejected before any lock.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// A business rule failed under lock; the transaction rolls back.
    Precondition,
    /// Storage or invariant breakage. Logged in full, shown generically.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid destination sector")]
    InvalidDestination,
    #[error("Destination sector not found")]
    DestinationNotFound,
    #[error("Not enough turns remaining")]
    NotEnoughTurns,
    #[error("No warp connection to that sector")]
    NoWarpConnection,

    #[error("Unknown commodity: {0}")]
    UnknownCommodity(String),
    #[error("Unknown trade action: {0}")]
    UnknownTradeAction(String),
    #[error("Quantity must be greater than zero")]
    InvalidQuantity,
    #[error("There is no port in this sector")]
    NoPort,
    #[error("This port {port_verb} {commodity}, you cannot {action} it here")]
    DirectionMismatch {
        commodity: String,
        action: String,
        port_verb: &'static str,
    },
    #[error("No cargo space available")]
    NoCargoSpace,
    #[error("The port has no {0} left to sell")]
    PortOutOfStock(String),
    #[error("Not enough credits")]
    InsufficientCredits,
    #[error("You have no {0} to sell")]
    NothingToSell(String),
    #[error("Colonists are not available at this port")]
    ColonistsUnavailable,

    #[error("Ships and equipment are only sold at a Stardock")]
    NotAtStardock,
    #[error("Unknown ship: {0}")]
    UnknownShip(String),
    #[error("You already own a {0}")]
    ShipAlreadyOwned(String),
    #[error("Unknown equipment: {0}")]
    UnknownEquipment(String),
    #[error("Your ship cannot carry any more {0}")]
    AtCapacity(String),

    #[error("Universe {0} does not exist")]
    UnknownUniverse(u32),
    #[error("Universe {0} already exists")]
    UniverseExists(u32),
    #[error("You have already joined universe {0}")]
    AlreadyJoined(u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invariant violated: {0}")]
    Invariant(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        use ActionError::*;
        match self {
            Unauthorized => ErrorKind::Unauthorized,
            InvalidDestination
            | UnknownCommodity(_)
            | UnknownTradeAction(_)
            | InvalidQuantity
            | UnknownEquipment(_)
            | InvalidConfig(_) => ErrorKind::Validation,
            DestinationNotFound | UnknownShip(_) | UnknownUniverse(_) => ErrorKind::NotFound,
            NotEnoughTurns
            | NoWarpConnection
            | NoPort
            | DirectionMismatch { .. }
            | NoCargoSpace
            | PortOutOfStock(_)
            | InsufficientCredits
            | NothingToSell(_)
            | ColonistsUnavailable
            | NotAtStardock
            | ShipAlreadyOwned(_)
            | AtCapacity(_)
            | UniverseExists(_)
            | AlreadyJoined(_) => ErrorKind::Precondition,
            Invariant(_) | Storage(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Unauthorized => 401,
            ErrorKind::Validation | ErrorKind::Precondition => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }

    /// Text safe to show a player. Internal detail never leaks.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.user_message(),
        }
    }
}

/// Error response body: `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_kind() {
        assert_eq!(ActionError::Unauthorized.status_code(), 401);
        assert_eq!(ActionError::InvalidQuantity.status_code(), 400);
        assert_eq!(ActionError::NoWarpConnection.status_code(), 400);
        assert_eq!(ActionError::DestinationNotFound.status_code(), 404);
        assert_eq!(ActionError::Storage("disk".into()).status_code(), 500);
    }

    #[test]
    fn test_user_messages_are_short_and_specific() {
        assert_eq!(
            ActionError::NotEnoughTurns.user_message(),
            "Not enough turns remaining"
        );
        assert_eq!(
            ActionError::NoWarpConnection.user_message(),
            "No warp connection to that sector"
        );
    }

    #[test]
    fn test_internal_detail_hidden() {
        let err = ActionError::Invariant("cargo 120 > holds 100".into());
        assert_eq!(err.user_message(), "Internal server error");
        assert!(err.to_string().contains("cargo 120"));
    }

    #[test]
    fn test_body_serializes_error_field() {
        let json = serde_json::to_string(&ActionError::NoPort.body()).unwrap();
        assert_eq!(json, r#"{"error":"There is no port in this sector"}"#);
    }
}
