//! Grid-locked player movement.
//!
//! The player walks in discrete one-tile steps: directional input is only
//! read while the avatar stands (within 1 unit) on its current target and no
//! walk cycle is mid-flight, so diagonal movement is impossible by
//! construction. Between steps the avatar seeks its target at constant
//! speed; on arrival it hard-snaps to kill residual float error.

use bevy::prelude::*;
use crate::companion::{update_follower, Follower, INTRO_DIALOGUE};
use crate::shared::*;
use super::{WalkCycle, PLAYER_KIND};

/// Distance to advance a target coordinate by: a full tile when the target
/// is tile-centered, otherwise just enough to re-center the entity in the
/// tile it is leaving.
pub fn step_length(target_coord: f32) -> f32 {
    let offset = (target_coord % TILE_SIZE) - HALF_TILE;
    if offset == 0.0 {
        TILE_SIZE
    } else {
        TILE_SIZE - offset.abs()
    }
}

/// Resolve one frame of directional input into a new movement target.
///
/// The vertical axis is read before the horizontal axis; once a vertical
/// step is accepted, horizontal input is ignored for the frame. At most one
/// axis ever advances the target.
pub fn resolve_step(input: &PlayerInput, target: Vec2) -> Option<(Facing, Vec2)> {
    let mut next = target;

    if input.up {
        next.y -= step_length(next.y);
        return Some((Facing::Up, next));
    }
    if input.down {
        next.y += step_length(next.y);
        return Some((Facing::Down, next));
    }
    if input.left {
        next.x -= step_length(next.x);
        return Some((Facing::Left, next));
    }
    if input.right {
        next.x += step_length(next.x);
        return Some((Facing::Right, next));
    }

    None
}

/// System: the player's per-frame motion step.
///
/// The companion's simulation is nested inside this step — the leader
/// resolves its own motion, forwards its *target* (not raw position) to the
/// follow recorder, then drives the follower's update. The companion is
/// never scheduled independently.
#[allow(clippy::type_complexity)]
pub fn player_motion(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut record: ResMut<PlayerRecord>,
    mut dialogue: EventWriter<CompanionDialogueEvent>,
    mut player_q: Query<
        (
            &mut WorldPosition,
            &mut GridMover,
            &mut WalkCycle,
            &mut AnimationKey,
        ),
        (With<Player>, Without<Companion>),
    >,
    mut companion_q: Query<
        (
            &mut WorldPosition,
            &mut GridMover,
            &mut Follower,
            &mut AnimationKey,
        ),
        (With<Companion>, Without<Player>),
    >,
) {
    let Ok((mut pos, mut mover, mut cycle, mut anim)) = player_q.get_single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    // A detached companion latches on once the player gets close enough.
    if let Ok((comp_pos, _, mut follower, _)) = companion_q.get_single_mut() {
        if !follower.following() {
            let gap = (pos.0 - comp_pos.0).abs();
            if gap.x < COMPANION_ADOPT_RADIUS
                && gap.y < COMPANION_ADOPT_RADIUS
                && follower.set_following(true)
            {
                record.max_is_following = true;
                dialogue.send(CompanionDialogueEvent {
                    lines: INTRO_DIALOGUE.iter().map(|s| s.to_string()).collect(),
                });
            }
        }
    }

    // At rest: snap both axes back onto the grid and re-anchor the target,
    // absorbing any drift picked up while moving.
    if mover.velocity.x.abs() <= VELOCITY_EPSILON && mover.velocity.y.abs() <= VELOCITY_EPSILON {
        pos.0.x = snap_to_grid(pos.0.x);
        pos.0.y = snap_to_grid(pos.0.y);
        mover.target = pos.0;
    }

    // Walk cycle: completing a directional walk reverts to the standing
    // animation for the current facing.
    cycle.timer.tick(time.delta());
    if cycle.active && cycle.timer.finished() {
        cycle.active = false;
        anim.0 = stand_key(PLAYER_KIND, mover.facing);
    }
    let mid_cycle = cycle.active && !cycle.timer.finished();

    if mover.target == pos.0 && !mid_cycle {
        anim.0 = stand_key(PLAYER_KIND, mover.facing);
    }

    // Read input only when settled on the current target with no walk
    // cycle mid-flight: one committed grid step at a time.
    let distance = pos.0.distance(mover.target);
    if distance < INPUT_ACCEPT_DISTANCE && !mid_cycle {
        if let Some((facing, next_target)) = resolve_step(&input, mover.target) {
            mover.target = next_target;
            mover.facing = facing;
            anim.0 = walk_key(PLAYER_KIND, facing);
            cycle.start();
            record.active = true;
            record.set_last_direction(facing);
        }
    }

    // Constant-speed seek toward the target.
    let delta = mover.target - pos.0;
    let dist = delta.length();
    if dist > f32::EPSILON {
        let dir = delta / dist;
        mover.velocity = dir * mover.speed;
        pos.0 += dir * (mover.speed * dt).min(dist);
    }

    // Forward the resolved target to the follow recorder and run the
    // follower's own frame, nested in ours.
    if let Ok((mut comp_pos, mut comp_mover, mut follower, mut comp_anim)) =
        companion_q.get_single_mut()
    {
        follower.record_target(mover.target);
        update_follower(
            &mut follower,
            &mut comp_mover,
            &mut comp_pos,
            &mut comp_anim,
            pos.0,
            dt,
        );
    }

    // Arrival: hard-snap onto the target and stop.
    if pos.0.distance(mover.target) < ARRIVE_THRESHOLD {
        pos.0 = mover.target;
        mover.velocity = Vec2::ZERO;
    }
}
