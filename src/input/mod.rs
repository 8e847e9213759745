use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, read_input);
    }
}

/// Reads the keyboard into the `PlayerInput` resource. Directional keys are
/// level-triggered (held), interact is edge-triggered.
fn read_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    *input = PlayerInput::default();

    input.up = keys.pressed(KeyCode::ArrowUp) || keys.pressed(KeyCode::KeyW);
    input.down = keys.pressed(KeyCode::ArrowDown) || keys.pressed(KeyCode::KeyS);
    input.left = keys.pressed(KeyCode::ArrowLeft) || keys.pressed(KeyCode::KeyA);
    input.right = keys.pressed(KeyCode::ArrowRight) || keys.pressed(KeyCode::KeyD);
    input.interact = keys.just_pressed(KeyCode::Space);
}
