//! NPC domain: autonomous patrol within a bounding rectangle, line-of-sight
//! detection of the player, and the overhead dialogue bubble shown while the
//! player is sighted.
//!
//! Two independent state axes per NPC: movement {idle, moving} driven by a
//! randomized patrol timer, and interaction {unaware, player-sighted} driven
//! by a per-frame sight-cone test. Sighting fully overrides locomotion.

mod patrol;
mod sight;

pub use patrol::{npc_patrol, pick_patrol_step, roll_patrol_delay};
pub use sight::{in_sight_cone, npc_line_of_sight};

use bevy::prelude::*;
use rand::rngs::StdRng;

use crate::shared::*;

/// NPCs snap onto their target within this distance.
pub const NPC_ARRIVE_THRESHOLD: f32 = 1.0;

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (npc_line_of_sight, npc_patrol)
                .chain()
                .in_set(FrameStep::NpcUpdate)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Patrol state for one NPC.
#[derive(Component, Debug, Clone)]
pub struct Patrol {
    /// Animation-key prefix (the sprite sheet this NPC uses).
    pub sprite: String,
    pub bounds: PatrolBounds,
    pub profile: PatrolProfile,
    /// Pending direction-change callback. `None` means cancelled or never
    /// scheduled; cancelling an already-fired timer is a no-op.
    pub move_timer: Option<Timer>,
    /// Interaction state: true while the player stands in the sight cone.
    pub sighted: bool,
    /// Set when sighting ends so the next patrol tick reschedules the timer.
    pub resume_pending: bool,
}

impl Patrol {
    pub fn new(sprite: impl Into<String>, bounds: PatrolBounds) -> Self {
        Self {
            sprite: sprite.into(),
            bounds,
            profile: PatrolProfile::from_bounds(&bounds),
            move_timer: None,
            sighted: false,
            resume_pending: false,
        }
    }

    /// Queue the next direction change after a fresh random delay. NPCs
    /// that never rotate never get a timer.
    pub fn schedule_next_move(&mut self, rng: &mut StdRng) {
        if !self.profile.rotates {
            return;
        }
        self.move_timer = Some(Timer::from_seconds(
            roll_patrol_delay(rng),
            TimerMode::Once,
        ));
    }

    /// Drop the pending direction change. Safe to call repeatedly and after
    /// the timer has already fired.
    pub fn cancel_move(&mut self) {
        self.move_timer = None;
    }
}

/// The dialogue bubble an NPC shows while the player is sighted.
#[derive(Component, Debug, Clone)]
pub struct SpeechBubble {
    pub text: String,
    pub visible: bool,
}

impl SpeechBubble {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: false,
        }
    }
}
