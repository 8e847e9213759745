use bevy::prelude::*;
use crate::shared::*;

/// Marker for the screen fade overlay
#[derive(Component)]
pub struct ScreenFadeOverlay;

/// Resource that drives fade legs requested by the transition coordinator.
#[derive(Resource, Debug, Clone)]
pub struct ScreenFade {
    /// Current opacity 0.0 (transparent) to 1.0 (opaque black)
    pub alpha: f32,
    /// The leg currently animating, if any.
    pub running: Option<FadeDirection>,
}

impl Default for ScreenFade {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            running: None,
        }
    }
}

/// Spawn the fade overlay (always present but invisible)
pub fn spawn_fade_overlay(mut commands: Commands) {
    commands.insert_resource(ScreenFade::default());

    commands.spawn((
        ScreenFadeOverlay,
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        GlobalZIndex(100), // on top of everything
    ));
}

/// Start fade legs on request. A new request replaces whatever leg was
/// running.
pub fn handle_fade_requests(
    mut events: EventReader<FadeRequestEvent>,
    mut fade: ResMut<ScreenFade>,
) {
    for event in events.read() {
        fade.running = Some(event.0);
    }
}

/// Animate the fade overlay at a fixed duration per leg. Reaching full
/// opacity on a fade-out emits `FadeOutCompleteEvent` — the notification
/// the transition coordinator suspends on. Fade-in completion is silent.
pub fn update_fade(
    time: Res<Time>,
    mut fade: ResMut<ScreenFade>,
    mut done: EventWriter<FadeOutCompleteEvent>,
    mut query: Query<&mut BackgroundColor, With<ScreenFadeOverlay>>,
) {
    let Some(direction) = fade.running else {
        return;
    };

    let step = time.delta_secs() / FADE_DURATION;
    match direction {
        FadeDirection::Out => {
            fade.alpha = (fade.alpha + step).min(1.0);
            if fade.alpha >= 1.0 {
                fade.running = None;
                done.send(FadeOutCompleteEvent);
            }
        }
        FadeDirection::In => {
            fade.alpha = (fade.alpha - step).max(0.0);
            if fade.alpha <= 0.0 {
                fade.running = None;
            }
        }
    }

    for mut bg in &mut query {
        *bg = BackgroundColor(Color::srgba(0.0, 0.0, 0.0, fade.alpha));
    }
}
