//! Axis-aligned line-of-sight cone.

use bevy::prelude::*;
use crate::shared::*;
use super::{Patrol, SpeechBubble};

/// True when the player stands strictly ahead of the NPC along its facing
/// axis, within `SIGHT_DISTANCE`, and within `SIGHT_TOLERANCE` to either
/// side of the sight line. The lateral tolerance is constant regardless of
/// distance — a band, not a true frustum.
pub fn in_sight_cone(npc: Vec2, facing: Facing, player: Vec2) -> bool {
    match facing {
        Facing::Up => {
            (player.x - npc.x).abs() <= SIGHT_TOLERANCE
                && player.y >= npc.y - SIGHT_DISTANCE
                && player.y < npc.y
        }
        Facing::Down => {
            (player.x - npc.x).abs() <= SIGHT_TOLERANCE
                && player.y <= npc.y + SIGHT_DISTANCE
                && player.y > npc.y
        }
        Facing::Left => {
            (player.y - npc.y).abs() <= SIGHT_TOLERANCE
                && player.x >= npc.x - SIGHT_DISTANCE
                && player.x < npc.x
        }
        Facing::Right => {
            (player.y - npc.y).abs() <= SIGHT_TOLERANCE
                && player.x <= npc.x + SIGHT_DISTANCE
                && player.x > npc.x
        }
    }
}

/// System: run the sight test for every NPC each frame and drive the
/// unaware ⇄ player-sighted transitions.
///
/// Entering sight shows the bubble and cancels the pending patrol timer
/// (any in-flight movement target is still walked to completion once the
/// sighting ends — only future direction changes are suppressed). Leaving
/// sight hides the bubble and flags the timer for rescheduling.
pub fn npc_line_of_sight(
    player_q: Query<&WorldPosition, (With<Player>, Without<Npc>)>,
    mut npc_q: Query<(&WorldPosition, &GridMover, &mut Patrol, &mut SpeechBubble), With<Npc>>,
) {
    let Ok(player_pos) = player_q.get_single() else {
        return;
    };

    for (pos, mover, mut patrol, mut bubble) in npc_q.iter_mut() {
        let seen = in_sight_cone(pos.0, mover.facing, player_pos.0);

        if seen && !patrol.sighted {
            patrol.sighted = true;
            bubble.visible = true;
            patrol.cancel_move();
        } else if !seen && patrol.sighted {
            patrol.sighted = false;
            bubble.visible = false;
            patrol.resume_pending = true;
        }
    }
}
