mod shared;
mod input;
mod player;
mod companion;
mod npcs;
mod world;
mod ui;
mod save;
mod data;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Emberway".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<PlayerInput>()
        .init_resource::<PlayerRecord>()
        .init_resource::<SignVisibility>()
        .init_resource::<PatrolRng>()
        .init_resource::<ZoneRegistry>()
        // Events
        .add_event::<FadeRequestEvent>()
        .add_event::<FadeOutCompleteEvent>()
        .add_event::<ZoneChangeEvent>()
        .add_event::<CompanionDialogueEvent>()
        .add_event::<SaveRequestEvent>()
        // Per-frame compose order: trigger checks, then the player's motion
        // step (companion nested inside), then NPC sight and patrol.
        .configure_sets(
            Update,
            (
                FrameStep::Triggers,
                FrameStep::PlayerMotion,
                FrameStep::NpcUpdate,
            )
                .chain(),
        )
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(companion::CompanionPlugin)
        .add_plugins(npcs::NpcPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(ui::UiPlugin)
        .add_plugins(save::SavePlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
