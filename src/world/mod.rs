//! World domain plugin for Emberway.
//!
//! Responsible for:
//! - Populating zones from their declarative definitions (one zone
//!   controller parameterized by data, not a type per zone)
//! - Sign / big-sign proximity triggers
//! - Exit triggers and the debounced fade-synchronized zone transition
//! - Syncing logical positions to render transforms

use bevy::prelude::*;

use crate::shared::*;

pub mod transition;
pub mod triggers;
pub mod zones;

use transition::{begin_transition, check_exit_overlap, complete_transition, ZoneTransition};
use triggers::check_sign_triggers;
use zones::{handle_zone_change, spawn_initial_zone};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ZoneTransition>()
            .add_systems(OnEnter(GameState::Playing), spawn_initial_zone)
            .add_systems(
                Update,
                (check_sign_triggers, check_exit_overlap)
                    .chain()
                    .in_set(FrameStep::Triggers)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (begin_transition, complete_transition, handle_zone_change)
                    .chain()
                    .after(FrameStep::NpcUpdate)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(PostUpdate, sync_transforms);
    }
}

/// System: mirror logical y-down world positions into render transforms
/// (Bevy's y axis points up).
pub fn sync_transforms(mut query: Query<(&WorldPosition, &mut Transform)>) {
    for (pos, mut transform) in query.iter_mut() {
        transform.translation.x = pos.0.x;
        transform.translation.y = -pos.0.y;
    }
}
