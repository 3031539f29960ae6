//! Table-backed outbound channel.
//!
//! Notices land in `sector_notice` inside the action's transaction, so
//! subscribers see them only if the action commits. A notice that cannot
//! be written is logged and dropped; it never fails the action.

use sectorwars_logic::events::{publish_all, OutboundEvent, Publish, PublishError};
use spacetimedb::{ReducerContext, Table};

use crate::tables::*;

pub struct NoticeBoard<'a> {
    ctx: &'a ReducerContext,
    actor_name: String,
}

impl<'a> NoticeBoard<'a> {
    pub fn new(ctx: &'a ReducerContext, actor_name: &str) -> Self {
        Self {
            ctx,
            actor_name: actor_name.to_string(),
        }
    }

    /// Post every event, logging failures.
    pub fn post(&mut self, events: &[OutboundEvent]) {
        for failure in publish_all(self, events) {
            log::warn!("Notice dropped: {}", failure);
        }
    }
}

impl Publish for NoticeBoard<'_> {
    fn publish(&mut self, event: &OutboundEvent) -> Result<(), PublishError> {
        let fail = |reason: String| PublishError {
            kind: event.kind(),
            sector: event.sector(),
            reason,
        };
        let payload = serde_json::to_string(event).map_err(|e| fail(e.to_string()))?;
        self.ctx
            .db
            .sector_notice()
            .try_insert(SectorNotice {
                id: 0,
                universe_id: event.universe_id(),
                sector_number: event.sector(),
                kind: event.kind().to_string(),
                actor_player_id: event.player_id(),
                text: event.describe(&self.actor_name),
                payload,
                posted_at: self.ctx.timestamp,
            })
            .map(|_| ())
            .map_err(|_| fail("sector_notice insert rejected".into()))
    }
}
