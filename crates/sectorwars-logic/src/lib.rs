//! Pure turn-economy and navigation logic for SectorWars.
//!
//! This crate contains all game rules that are independent of any database,
//! engine, or runtime. Functions take plain data and return plans or errors,
//! making them unit-testable and shared between the SpacetimeDB module and
//! the native simtest.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`api`] | Request validation and response bodies |
//! | [`catalog`] | Static ship catalog |
//! | [`config`] | `GameRules`: misfire odds, turn costs, regen bounds |
//! | [`encounters`] | Per-pair meeting tallies |
//! | [`constants`] | Base prices, turn costs, regen limits, equipment prices |
//! | [`errors`] | `ActionError` taxonomy and status mapping |
//! | [`events`] | Outbound arrival/departure/purchase events and the publish port |
//! | [`galaxy`] | Deterministic sector, port and warp seeding |
//! | [`ledger`] | Invariant checks run before a player row is written |
//! | [`navigation`] | Warp connectivity, turn cost, misfire fault |
//! | [`player`] | Player and cargo state |
//! | [`pricing`] | Port types, trade direction, unit price formula |
//! | [`refit`] | Ship trade-in, resource migration, equipment sales |
//! | [`trade`] | Commodity and colonist trades, port regeneration |

pub mod api;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod encounters;
pub mod errors;
pub mod events;
pub mod galaxy;
pub mod ledger;
pub mod navigation;
pub mod player;
pub mod pricing;
pub mod refit;
pub mod trade;
