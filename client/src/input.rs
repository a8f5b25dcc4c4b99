use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use shared::{MoveButton, PendingMove};

/// Radians of look per pixel of mouse motion.
const LOOK_SENSITIVITY: f32 = 0.003;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    #[actionlike(DualAxis)]
    Move,
    #[actionlike(DualAxis)]
    Look,
    /// Up/down thrust, honoured only while airborne.
    #[actionlike(Axis)]
    AirMove,
    Jump,
    Magnetize,
    Boost,
}

/// Input gathered between fixed ticks; drained into one `Move` per tick by the net plugin.
#[derive(Resource, Default)]
pub struct PendingInput(pub PendingMove);

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let input_map = InputMap::<InputAction>::default()
        .with_dual_axis(InputAction::Move, VirtualDPad::wasd())
        .with_dual_axis(InputAction::Look, MouseMove::default())
        .with_axis(
            InputAction::AirMove,
            VirtualAxis::new(KeyCode::KeyQ, KeyCode::KeyE),
        )
        .with(InputAction::Jump, KeyCode::Space)
        .with(InputAction::Magnetize, KeyCode::KeyF)
        .with(InputAction::Boost, KeyCode::ShiftLeft);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
    app.init_resource::<PendingInput>();

    app.add_systems(PreUpdate, gather_input.after(InputManagerSystem::Update));
}

fn gather_input(actions: Res<ActionState<InputAction>>, mut pending: ResMut<PendingInput>) {
    let movement = actions.axis_pair(&InputAction::Move);
    // WASD reports +y forward and +x right.
    pending.0.set_movement(movement.y, movement.x);
    pending.0.set_air_movement(actions.value(&InputAction::AirMove));

    let look = actions.axis_pair(&InputAction::Look);
    if look != Vec2::ZERO {
        pending
            .0
            .add_look(-look.y * LOOK_SENSITIVITY, look.x * LOOK_SENSITIVITY);
    }

    if actions.just_pressed(&InputAction::Jump) {
        pending.0.press(MoveButton::Jump);
    }
    if actions.just_pressed(&InputAction::Magnetize) {
        pending.0.press(MoveButton::Magnetize);
    }
    if actions.just_pressed(&InputAction::Boost) {
        // A zero direction boosts straight ahead.
        pending.0.set_boost_direction(shared::Vec3::new(
            movement.y,
            movement.x,
            actions.value(&InputAction::AirMove),
        ));
        pending.0.press(MoveButton::Boost);
    }
}
