use super::{LocalAgent, Prediction, RemoteAgent};
use crate::{
    convert::{quat_to_bevy, vec_to_bevy},
    tuning::Netcode,
};
use bevy::prelude::*;

/// Draw the local agent at its prediction plus the decaying correction offset.
///
/// The reconciler snaps the simulation on correction but never the visual, so this is the only
/// place the local pose reaches the scene.
pub(super) fn render_local_agent(
    time: Res<Time>,
    mut prediction: ResMut<Prediction>,
    mut transform: Single<&mut Transform, With<LocalAgent>>,
) {
    let (position, rotation) = prediction.0.render(time.delta_secs());
    transform.translation = vec_to_bevy(position);
    transform.rotation = quat_to_bevy(rotation);
}

/// Smooth remote agents toward their last status, extrapolating for a bounded time.
pub(super) fn render_remote_agents(
    time: Res<Time>,
    netcode: Res<Netcode>,
    mut remotes: Query<(&mut Transform, &mut RemoteAgent)>,
) {
    let dt = time.delta_secs();
    for (mut transform, mut remote) in &mut remotes {
        let (position, rotation) = remote.proxy.advance(dt, &netcode.0);
        transform.translation = vec_to_bevy(position);
        transform.rotation = quat_to_bevy(rotation);
    }
}
