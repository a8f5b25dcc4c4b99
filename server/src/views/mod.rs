mod local_agent_view;

// Bring view-table extension traits into scope so `ctx.db.agent()` / `ctx.db.player()` compile.
use crate::schema::{agent__view, player__view, Agent};
use spacetimedb::ViewContext;

pub(super) fn agent_from_ctx(ctx: &ViewContext) -> Option<Agent> {
    let player = ctx.db.player().identity().find(ctx.sender)?;
    let agent_id = player.agent_id?;
    ctx.db.agent().id().find(agent_id)
}
