//! Proximity triggers: zone-shaped detectors that show or hide a dialogue
//! box while the player's bounds overlap them. Small signs and full-screen
//! big signs share this logic and differ only in presentation.

use bevy::prelude::*;

use crate::shared::*;

/// One sign trigger. `visible` is recomputed every frame from the overlap
/// test, never accumulated.
#[derive(Component, Debug, Clone)]
pub struct TriggerZone {
    pub kind: PlacementKind,
    pub rect: WorldRect,
    pub text: String,
    pub visible: bool,
}

impl TriggerZone {
    pub fn new(kind: PlacementKind, rect: WorldRect, text: impl Into<String>) -> Self {
        Self {
            kind,
            rect,
            text: text.into(),
            visible: false,
        }
    }
}

/// System: overlap-test every sign trigger against the player and rebuild
/// the scene-level visibility flags from scratch.
pub fn check_sign_triggers(
    player_q: Query<&WorldPosition, With<Player>>,
    mut triggers: Query<&mut TriggerZone>,
    mut visibility: ResMut<SignVisibility>,
) {
    *visibility = SignVisibility::default();

    let Ok(player_pos) = player_q.get_single() else {
        return;
    };
    let bounds = player_bounds(player_pos.0);

    for mut trigger in triggers.iter_mut() {
        trigger.visible = trigger.rect.overlaps(&bounds);
        if trigger.visible {
            match trigger.kind {
                PlacementKind::BigSign => visibility.big_sign = true,
                _ => visibility.sign = true,
            }
        }
    }
}
