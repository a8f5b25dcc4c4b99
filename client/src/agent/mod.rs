mod interpolate;
mod replication;

use bevy::{prelude::*, transform::TransformSystems};
use shared::{AgentId, AgentStatus, DebugEvent, Reconciler, RemoteProxy};
use std::collections::BTreeMap;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<AgentStatuses>();
    app.init_resource::<SimDebugEvents>();
    app.add_systems(PostStartup, replication::spawn_local_agent);
    app.add_systems(
        PostUpdate,
        (
            replication::replicate_remote_agents,
            interpolate::render_local_agent,
            interpolate::render_remote_agents,
        )
            .chain()
            .in_set(AgentRenderSet)
            .before(TransformSystems::Propagate),
    );
    app.add_systems(Last, clear_debug_events);
}

/// Writes agent transforms from simulation state each frame.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AgentRenderSet;

/// The local agent's prediction state. Inserted on entering the world.
#[derive(Resource)]
pub struct Prediction(pub Reconciler);

/// Remote statuses delivered since the last frame, newest per agent.
#[derive(Resource, Default)]
pub struct AgentStatuses(pub BTreeMap<AgentId, AgentStatus>);

/// Debug events recorded by local prediction this frame.
#[derive(Resource, Default)]
pub struct SimDebugEvents(pub Vec<DebugEvent>);

#[derive(Component)]
pub struct LocalAgent;

#[derive(Component)]
pub struct RemoteAgent {
    pub id: AgentId,
    pub proxy: RemoteProxy,
}

fn clear_debug_events(mut events: ResMut<SimDebugEvents>) {
    events.0.clear();
}
