//! Surface contact state machine.
//!
//! Every contact transition goes through [`set_contact`]. Landing, bouncing and leaving a
//! field are the only events that move an agent between states outside of abilities.

use crate::{
    constants::BOUNCE_SPIN_FACTOR,
    handle::SourceKind,
    query::HitResult,
    settings::MovementSettings,
    status::{AgentStatus, ContactState, GravityTracking},
    timers::TimerKind,
    utils::{
        Vec3, basis_from_up_forward, basis_from_up_right, forward_of, project_on_plane, reflect,
        right_of, up_of,
    },
};

/// What a blocking hit did to the agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Landed(ContactState),
    /// Grazing hit while magnetized: reflected and un-magnetized.
    Bounced,
    /// Hit while un-magnetized: the normal component of motion was removed.
    Slid,
    /// Already in contact; motion into the surface was removed.
    Ignored,
}

/// Contact state a source kind produces when landed on.
pub fn contact_for(kind: SourceKind) -> ContactState {
    match kind {
        SourceKind::FlatFloor => ContactState::FlatFloorContact,
        SourceKind::SphereFloor => ContactState::ConvexSphereContact,
        SourceKind::LevelSphere => ContactState::ConcaveSphereContact,
    }
}

/// The single contact setter. Returns the previous state.
///
/// - Entering `NoContact` resets gravity tracking to its sentinel and switches to air damping.
/// - Entering a contact state clears spin, look deltas and every velocity accumulator, and
///   switches to floor damping.
pub fn set_contact(
    status: &mut AgentStatus,
    state: ContactState,
    settings: &MovementSettings,
) -> ContactState {
    let previous = status.contact;
    status.contact = state;

    match state {
        ContactState::NoContact => {
            status.gravity = GravityTracking::SENTINEL;
            status.linear_damping = settings.air_damping;
        }
        _ => {
            status.angular_velocity = Vec3::zeros();
            status.last_look_pitch = 0.0;
            status.last_look_yaw = 0.0;
            status.velocity = Vec3::zeros();
            status.sphere_velocity = Vec3::zeros();
            status.jump_force = Vec3::zeros();
            status.linear_damping = settings.floor_damping;
        }
    }

    if previous != state {
        log::debug!("Contact {previous:?} -> {state:?} at tick {}", status.tick);
    }
    previous
}

/// Restore a persisted contact state without any transition side effects.
pub fn restore_contact(status: &mut AgentStatus, state: ContactState) {
    status.contact = state;
}

/// React to a blocking hit found while integrating motion.
pub fn on_surface_hit(
    status: &mut AgentStatus,
    hit: &HitResult,
    settings: &MovementSettings,
) -> HitOutcome {
    if status.contact.is_grounded() {
        remove_normal_motion(status, hit.normal);
        return HitOutcome::Ignored;
    }

    if !status.magnetized {
        remove_normal_motion(status, hit.normal);
        return HitOutcome::Slid;
    }

    let up = up_of(&status.rotation);
    if hit.normal.dot(&up) >= settings.landing_alignment {
        let state = contact_for(hit.source.kind());
        if let Some(aligned) = basis_from_up_forward(hit.normal, forward_of(&status.rotation))
            .or_else(|| basis_from_up_right(hit.normal, right_of(&status.rotation)))
        {
            status.rotation = aligned;
        }
        set_contact(status, state, settings);
        status.gravity = GravityTracking {
            vector: -hit.normal * status.gravity.vector.norm(),
            source: Some(hit.source),
            distance: 0.0,
            impact: Some(hit.impact_point),
        };
        log::debug!("Landed on source {} as {state:?}", hit.source.id());
        return HitOutcome::Landed(state);
    }

    let incoming = status.velocity + status.jump_force;
    let tangent = project_on_plane(incoming, hit.normal);
    status.velocity = reflect(incoming, hit.normal) * settings.bounce_restitution;
    status.jump_force = Vec3::zeros();
    status.angular_velocity += hit.normal.cross(&tangent) * BOUNCE_SPIN_FACTOR;
    status.magnetized = false;
    set_contact(status, ContactState::NoContact, settings);
    status.timers.cancel(TimerKind::Remagnetize);
    status
        .timers
        .schedule(TimerKind::Remagnetize, status.tick, settings.remagnetize_delay_ticks());
    log::debug!("Bounced off source {}", hit.source.id());
    HitOutcome::Bounced
}

fn remove_normal_motion(status: &mut AgentStatus, normal: Vec3) {
    let into = status.velocity.dot(&normal);
    if into < 0.0 {
        status.velocity -= normal * into;
    }
    let into = status.jump_force.dot(&normal);
    if into < 0.0 {
        status.jump_force -= normal * into;
    }
}

/// Leave contact and drop magnetize once the agent has left every gravity field.
///
/// Returns true when that happened on this call.
pub fn on_fields_changed(
    status: &mut AgentStatus,
    had_fields: bool,
    settings: &MovementSettings,
) -> bool {
    if !had_fields || !status.fields.is_empty() {
        return false;
    }
    set_contact(status, ContactState::NoContact, settings);
    status.magnetized = false;
    true
}
