use crate::types::*;
use spacetimedb::*;

/// Live agent driven by uploaded moves.
///
/// `state` is authoritative: clients replicate it, reconcile their own agent against it, and
/// smooth other agents toward it.
#[table(name = agent, public)]
pub struct Agent {
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    #[unique]
    pub identity: Identity,

    pub state: AgentState,
}
