mod dialogue_box;
pub mod fade;

pub use fade::{ScreenFade, ScreenFadeOverlay};

use bevy::prelude::*;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // ─── FADE OVERLAY — always present ───
        app.add_systems(Startup, fade::spawn_fade_overlay);
        app.add_systems(
            Update,
            (fade::handle_fade_requests, fade::update_fade).chain(),
        );

        // ─── DIALOGUE BOXES ───
        app.add_systems(
            Startup,
            (
                dialogue_box::spawn_companion_box,
                dialogue_box::spawn_big_sign_panel,
            ),
        );
        app.add_systems(
            Update,
            (
                dialogue_box::update_companion_box,
                dialogue_box::update_big_sign_panel,
                dialogue_box::update_sign_labels,
                dialogue_box::update_npc_bubbles,
            )
                .after(FrameStep::NpcUpdate)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
