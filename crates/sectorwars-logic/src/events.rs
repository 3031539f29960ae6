//! Outbound events and the publish port.
//!
//! Engines describe what observers should hear about (arrivals, departures,
//! purchases) as `OutboundEvent`s and hand them to a [`Publish`]
//! implementation. Delivery is best effort: a failed publish is reported to
//! the caller for logging and never undoes the action that produced it.

use serde::Serialize;
use thiserror::Error;

use crate::navigation::MovePlan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Heard by everyone in `sector`.
    Arrival {
        universe_id: u32,
        sector: u32,
        player_id: u64,
        from_sector: u32,
        misfired: bool,
    },
    Departure {
        universe_id: u32,
        sector: u32,
        player_id: u64,
        to_sector: u32,
    },
    Purchase {
        universe_id: u32,
        sector: u32,
        player_id: u64,
        summary: String,
    },
}

impl OutboundEvent {
    pub fn universe_id(&self) -> u32 {
        match self {
            OutboundEvent::Arrival { universe_id, .. }
            | OutboundEvent::Departure { universe_id, .. }
            | OutboundEvent::Purchase { universe_id, .. } => *universe_id,
        }
    }

    pub fn sector(&self) -> u32 {
        match self {
            OutboundEvent::Arrival { sector, .. }
            | OutboundEvent::Departure { sector, .. }
            | OutboundEvent::Purchase { sector, .. } => *sector,
        }
    }

    pub fn player_id(&self) -> u64 {
        match self {
            OutboundEvent::Arrival { player_id, .. }
            | OutboundEvent::Departure { player_id, .. }
            | OutboundEvent::Purchase { player_id, .. } => *player_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutboundEvent::Arrival { .. } => "arrival",
            OutboundEvent::Departure { .. } => "departure",
            OutboundEvent::Purchase { .. } => "purchase",
        }
    }

    /// One-line text for a sector feed.
    pub fn describe(&self, player_name: &str) -> String {
        match self {
            OutboundEvent::Arrival {
                from_sector,
                misfired: true,
                ..
            } => format!(
                "{} tumbles out of a misfired warp from sector {}",
                player_name, from_sector
            ),
            OutboundEvent::Arrival { from_sector, .. } => {
                format!("{} warps in from sector {}", player_name, from_sector)
            }
            OutboundEvent::Departure { to_sector, .. } => {
                format!("{} warps out toward sector {}", player_name, to_sector)
            }
            OutboundEvent::Purchase { summary, .. } => format!("{}: {}", player_name, summary),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not publish {kind} event for sector {sector}: {reason}")]
pub struct PublishError {
    pub kind: &'static str,
    pub sector: u32,
    pub reason: String,
}

/// Abstract outbound channel for sector and player notifications.
pub trait Publish {
    fn publish(&mut self, event: &OutboundEvent) -> Result<(), PublishError>;
}

/// Publish every event, continuing past failures. Returns the failures.
pub fn publish_all<P: Publish + ?Sized>(
    publisher: &mut P,
    events: &[OutboundEvent],
) -> Vec<PublishError> {
    events
        .iter()
        .filter_map(|e| publisher.publish(e).err())
        .collect()
}

/// Departure from the origin, arrival at wherever the ship landed.
pub fn movement_events(plan: &MovePlan, universe_id: u32, player_id: u64) -> Vec<OutboundEvent> {
    vec![
        OutboundEvent::Departure {
            universe_id,
            sector: plan.from,
            player_id,
            to_sector: plan.intended,
        },
        OutboundEvent::Arrival {
            universe_id,
            sector: plan.actual,
            player_id,
            from_sector: plan.from,
            misfired: plan.misfired,
        },
    ]
}

/// In-memory publisher. Used by the simtest and by tests.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<OutboundEvent>,
}

impl Publish for EventLog {
    fn publish(&mut self, event: &OutboundEvent) -> Result<(), PublishError> {
        self.events.push(event.clone());
        Ok(())
    }
}
