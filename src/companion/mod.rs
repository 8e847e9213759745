//! The companion: records the player's resolved movement targets and walks
//! the same trail, a few waypoints behind.
//!
//! The companion's per-frame simulation is driven from inside the player's
//! movement step (see `player::movement`), never scheduled on its own. This
//! module owns the follow-queue protocol, the following on/off latch, and
//! the companion's bottom-screen dialogue queue.

use bevy::prelude::*;
use std::collections::VecDeque;

use crate::shared::*;

/// Animation-key prefix for the companion's sprite.
pub const COMPANION_KIND: &str = "ember";

/// Lines played once when the companion first starts following.
pub const INTRO_DIALOGUE: [&str; 2] = [
    "Hey! I'm Ember. (Press the spacebar to advance my text.)",
    "I'll tag along from here. Lead the way and I'll keep up!",
];

pub struct CompanionPlugin;

impl Plugin for CompanionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CompanionDialogue>().add_systems(
            Update,
            advance_companion_dialogue.run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FOLLOW QUEUE
// ═══════════════════════════════════════════════════════════════════════

/// FIFO trail of leader waypoints. Recording appends at the back, playback
/// consumes from the front.
#[derive(Debug, Clone, Default)]
pub struct FollowQueue {
    entries: VecDeque<Vec2>,
}

impl FollowQueue {
    /// Append a sample if it lies on the half-tile lattice and differs from
    /// the current tail. Consecutive duplicates are never enqueued.
    pub fn record(&mut self, pos: Vec2) {
        if let Some(tail) = self.entries.back() {
            if tail.x == pos.x && tail.y == pos.y {
                return;
            }
        }
        if is_half_tile_aligned(pos.x) && is_half_tile_aligned(pos.y) {
            self.entries.push_back(pos);
        }
    }

    /// Pop the next waypoint for playback. Holds the last entry back so the
    /// follower always trails the leader by at least one sample.
    pub fn pop_waypoint(&mut self) -> Option<Vec2> {
        if self.entries.len() > 1 {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FOLLOWER COMPONENT
// ═══════════════════════════════════════════════════════════════════════

/// Follow state attached to the companion entity. The leader holds the only
/// owning reference; the companion reads the leader's position through a
/// query, never through a back-pointer.
#[derive(Component, Debug, Clone, Default)]
pub struct Follower {
    pub queue: FollowQueue,
    /// The waypoint currently being walked, if any.
    pub playback: Option<Vec2>,
    following: bool,
}

impl Follower {
    /// Restore persisted follow state at spawn. Restoring is not a toggle:
    /// it never replays the introduction.
    pub fn restored(following: bool) -> Self {
        Self {
            following,
            ..Default::default()
        }
    }

    pub fn following(&self) -> bool {
        self.following
    }

    /// Latch the following flag. Returns `true` exactly when the flag flips
    /// from off to on — the caller plays the introductory dialogue on that
    /// edge. Setting the same value again is a no-op.
    #[must_use]
    pub fn set_following(&mut self, on: bool) -> bool {
        let introduce = on && !self.following;
        self.following = on;
        introduce
    }

    /// Record one of the leader's resolved targets. Ignored entirely while
    /// not following.
    pub fn record_target(&mut self, pos: Vec2) {
        if !self.following {
            return;
        }
        self.queue.record(pos);
    }
}

/// Pick the walk/stand facing for a displacement: the dominant axis wins,
/// ties favor horizontal.
pub fn dominant_axis_facing(delta: Vec2) -> Facing {
    if delta.x.abs() >= delta.y.abs() {
        if delta.x > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    } else if delta.y > 0.0 {
        Facing::Down
    } else {
        Facing::Up
    }
}

/// One frame of follower simulation, invoked from the player's movement
/// step after the leader's own motion has resolved.
pub fn update_follower(
    follower: &mut Follower,
    mover: &mut GridMover,
    pos: &mut WorldPosition,
    anim: &mut AnimationKey,
    leader_pos: Vec2,
    dt: f32,
) {
    if follower.playback.is_none() {
        if let Some(next) = follower.queue.pop_waypoint() {
            follower.playback = Some(next);
            mover.target = next;
            mover.facing = dominant_axis_facing(next - pos.0);
            anim.0 = walk_key(COMPANION_KIND, mover.facing);
        } else {
            // Nothing queued: stand facing the leader instead of freezing
            // in the last walk direction.
            mover.facing = dominant_axis_facing(leader_pos - pos.0);
            anim.0 = stand_key(COMPANION_KIND, mover.facing);
        }
    }

    if let Some(waypoint) = follower.playback {
        let delta = waypoint - pos.0;
        let dist = delta.length();
        if dist < ARRIVE_THRESHOLD {
            pos.0 = waypoint;
            mover.target = waypoint;
            mover.velocity = Vec2::ZERO;
            follower.playback = None;
        } else {
            mover.velocity = delta / dist * mover.speed;
            pos.0 += mover.velocity * dt;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DIALOGUE QUEUE
// ═══════════════════════════════════════════════════════════════════════

/// The companion's pending dialogue lines plus the line currently on screen.
/// `current == None` means the box is hidden.
#[derive(Resource, Debug, Clone, Default)]
pub struct CompanionDialogue {
    pub pending: VecDeque<String>,
    pub current: Option<String>,
}

impl CompanionDialogue {
    /// Drop the shown line and surface the next one, if any.
    pub fn advance(&mut self) {
        self.current = self.pending.pop_front();
    }
}

/// System: load queued dialogue sequences and step through them on the
/// interact key.
pub fn advance_companion_dialogue(
    mut events: EventReader<CompanionDialogueEvent>,
    input: Res<PlayerInput>,
    mut dialogue: ResMut<CompanionDialogue>,
) {
    for event in events.read() {
        dialogue.pending = event.lines.iter().cloned().collect();
        dialogue.advance();
    }

    if input.interact && dialogue.current.is_some() {
        dialogue.advance();
    }
}
