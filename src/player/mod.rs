mod movement;

pub use movement::{player_motion, resolve_step, step_length};

use bevy::prelude::*;
use crate::shared::*;

/// Animation-key prefix for the player's sprite.
pub const PLAYER_KIND: &str = "player";

/// One walk cycle: 4 frames at 10 fps. While a cycle is mid-flight the
/// controller refuses new directional input, committing the player to the
/// current tile step.
pub const WALK_CYCLE_SECS: f32 = 0.4;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            player_motion
                .in_set(FrameStep::PlayerMotion)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Tracks the player's current walk animation cycle.
#[derive(Component, Debug, Clone)]
pub struct WalkCycle {
    pub timer: Timer,
    pub active: bool,
}

impl Default for WalkCycle {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(WALK_CYCLE_SECS, TimerMode::Once),
            active: false,
        }
    }
}

impl WalkCycle {
    pub fn start(&mut self) {
        self.timer = Timer::from_seconds(WALK_CYCLE_SECS, TimerMode::Once);
        self.active = true;
    }
}
