use bevy::prelude::*;
use shared::{LinkSettings, MovementSettings, NetcodeSettings};

/// Simulation tuning. Must match the authority's `movement_settings` row.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct Movement(pub MovementSettings);

#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct Netcode(pub NetcodeSettings);

/// Latency and loss of the simulated link to the in-process authority.
#[derive(Resource, Clone, Copy, Debug)]
pub struct Link(pub LinkSettings);

impl Default for Link {
    fn default() -> Self {
        Self(LinkSettings {
            latency_ticks: 6,
            drop_every_nth: 20,
        })
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Movement>();
    app.init_resource::<Netcode>();
    app.init_resource::<Link>();
    app.add_systems(Startup, validate_tuning);
}

fn validate_tuning(movement: Res<Movement>) {
    if let Err(err) = movement.0.validate() {
        error!("Movement settings are invalid: {err}");
    }
}
