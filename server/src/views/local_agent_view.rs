use crate::{schema::Agent, views::agent_from_ctx};

/// The caller's own agent, for the predicting client's reconciliation subscription.
#[spacetimedb::view(name = local_agent, public)]
fn local_agent(ctx: &spacetimedb::ViewContext) -> Vec<Agent> {
    agent_from_ctx(ctx).into_iter().collect()
}
