//! Randomized patrol: timers, direction rolls, and target seeking.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::shared::*;
use super::{Patrol, NPC_ARRIVE_THRESHOLD};

/// Uniform random delay before the next direction change, in seconds.
pub fn roll_patrol_delay(rng: &mut StdRng) -> f32 {
    rng.gen_range(PATROL_DELAY_MIN..=PATROL_DELAY_MAX)
}

/// Roll a uniformly random cardinal direction and compute the one-tile-step
/// candidate target from `target`. The facing always changes; the candidate
/// is returned only when it stays inside `bounds` — otherwise it is
/// discarded with no fallback direction tried.
pub fn pick_patrol_step(
    rng: &mut StdRng,
    target: Vec2,
    bounds: &PatrolBounds,
) -> (Facing, Option<Vec2>) {
    const DIRECTIONS: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];
    let facing = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];

    let candidate = target + facing.offset() * TILE_SIZE;
    if bounds.contains(candidate) {
        (facing, Some(candidate))
    } else {
        (facing, None)
    }
}

/// System: tick patrol timers, commit direction changes, and walk NPCs
/// toward their targets.
///
/// While the player is sighted the NPC holds position in its idle-facing
/// animation; its movement target is left untouched so the walk resumes
/// once the sighting ends.
pub fn npc_patrol(
    time: Res<Time>,
    mut rng: ResMut<PatrolRng>,
    mut query: Query<
        (
            &mut WorldPosition,
            &mut GridMover,
            &mut Patrol,
            &mut AnimationKey,
        ),
        With<Npc>,
    >,
) {
    let dt = time.delta_secs();

    for (mut pos, mut mover, mut patrol, mut anim) in query.iter_mut() {
        // A sighting just ended: put the patrol timer back.
        if patrol.resume_pending {
            patrol.resume_pending = false;
            patrol.schedule_next_move(&mut rng.0);
        }

        // Direction-change timer.
        let fired = match patrol.move_timer.as_mut() {
            Some(timer) => timer.tick(time.delta()).finished(),
            None => false,
        };
        if fired {
            patrol.move_timer = None;
            if !patrol.sighted {
                let (facing, candidate) =
                    pick_patrol_step(&mut rng.0, mover.target, &patrol.bounds);
                mover.facing = facing;
                if let Some(next) = candidate {
                    mover.target = next;
                    anim.0 = walk_key(&patrol.sprite, facing);
                }
                // Rescheduled whether or not the candidate was kept.
                patrol.schedule_next_move(&mut rng.0);
            }
        }

        // Sighting overrides locomotion entirely.
        if patrol.sighted {
            anim.0 = stand_key(&patrol.sprite, mover.facing);
            continue;
        }

        if mover.target == pos.0 {
            anim.0 = stand_key(&patrol.sprite, mover.facing);
        } else {
            let delta = mover.target - pos.0;
            let dist = delta.length();
            if dist > f32::EPSILON {
                let dir = delta / dist;
                mover.velocity = dir * mover.speed;
                pos.0 += dir * (mover.speed * dt).min(dist);
            }
        }

        if pos.0.distance(mover.target) < NPC_ARRIVE_THRESHOLD {
            pos.0 = mover.target;
            mover.velocity = Vec2::ZERO;
        }
    }
}
