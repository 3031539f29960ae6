//! SectorWars Server - SpacetimeDB Module
//!
//! Turn economy and navigation for a multiplayer space-trading universe.
//! Game rules live in sectorwars-logic; this module persists them and
//! exposes one reducer per player action.

mod collaborators;
mod publisher;
mod reducers;
mod tables;
mod tx;

pub use reducers::*;
pub use tables::*;
