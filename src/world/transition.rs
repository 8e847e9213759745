//! Zone transitions: debounced exit handling plus the two-phase fade
//! handoff.
//!
//! The intended state machine is Idle → FadingOut → Handoff → FadingIn,
//! collapsed into two guard flags. An exit overlap arms `debounce` for the
//! rest of the overlap episode and `is_fading` for the life of the attempt,
//! so at most one transition is ever in flight. Fade-out is awaited via
//! `FadeOutCompleteEvent`; fade-in is issued and deliberately NOT awaited —
//! user-visible timing depends on that asymmetry, so keep it. A stuck
//! fade-out notification would park the coordinator forever; there is no
//! abort path.

use bevy::prelude::*;

use crate::shared::*;

/// An exit placement. `target` is absent when the level data carries no
/// `targetScene` property; overlapping such an exit goes nowhere.
#[derive(Component, Debug, Clone)]
pub struct ExitTrigger {
    pub rect: WorldRect,
    pub target: Option<ZoneId>,
}

/// Coordinator state. `pending` holds a freshly armed request until
/// `begin_transition` picks it up; `awaiting` holds the target while the
/// fade-out runs.
#[derive(Resource, Debug, Clone, Default)]
pub struct ZoneTransition {
    pub debounce: bool,
    pub is_fading: bool,
    pending: Option<Option<ZoneId>>,
    awaiting: Option<ZoneId>,
}

impl ZoneTransition {
    /// The exit-overlap callback. Repeated firings while an episode is in
    /// flight are swallowed by the debounce latch. Returns whether a new
    /// transition attempt was armed.
    pub fn on_exit_overlap(&mut self, target: Option<ZoneId>) -> bool {
        if self.debounce {
            return false;
        }
        self.debounce = true;
        if !self.is_fading {
            self.is_fading = true;
            self.pending = Some(target);
            return true;
        }
        false
    }

    /// Both guards drop at the end of every attempt, successful or not, so
    /// a future exit can trigger again.
    pub fn reset(&mut self) {
        self.is_fading = false;
        self.debounce = false;
    }

    pub fn take_pending(&mut self) -> Option<Option<ZoneId>> {
        self.pending.take()
    }

    pub fn await_fade(&mut self, target: ZoneId) {
        self.awaiting = Some(target);
    }

    pub fn take_awaited(&mut self) -> Option<ZoneId> {
        self.awaiting.take()
    }
}

/// System: fire the overlap callback for every exit the player stands on.
pub fn check_exit_overlap(
    player_q: Query<&WorldPosition, With<Player>>,
    exits: Query<&ExitTrigger>,
    mut transition: ResMut<ZoneTransition>,
) {
    let Ok(player_pos) = player_q.get_single() else {
        return;
    };
    let bounds = player_bounds(player_pos.0);

    for exit in exits.iter() {
        if exit.rect.overlaps(&bounds) {
            transition.on_exit_overlap(exit.target.clone());
        }
    }
}

/// System: start an armed transition attempt.
///
/// With a resolved target: persist the player's facing into the record and
/// kick off the fade-out, then park until `FadeOutCompleteEvent`. Without
/// one: abandon the attempt — flags reset, no fade, no navigation.
pub fn begin_transition(
    mut transition: ResMut<ZoneTransition>,
    mut record: ResMut<PlayerRecord>,
    mut fades: EventWriter<FadeRequestEvent>,
    player_q: Query<&GridMover, With<Player>>,
) {
    let Some(request) = transition.take_pending() else {
        return;
    };

    let Some(target) = request else {
        info!("exit trigger has no targetScene; staying in '{}'", record.current_scene);
        transition.reset();
        return;
    };

    if let Ok(mover) = player_q.get_single() {
        record.set_facing(mover.facing);
    }

    fades.send(FadeRequestEvent(FadeDirection::Out));
    transition.await_fade(target);
}

/// System: the coordinator's continuation, resumed by the fade-out
/// completion notification.
///
/// Issues the fade-in without waiting on it, rotates past/current zone ids,
/// persists the record, and hands control to the new zone. The zone-change
/// handler clears all transient entities, NPCs included.
pub fn complete_transition(
    mut fade_done: EventReader<FadeOutCompleteEvent>,
    mut transition: ResMut<ZoneTransition>,
    mut record: ResMut<PlayerRecord>,
    mut fades: EventWriter<FadeRequestEvent>,
    mut zone_changes: EventWriter<ZoneChangeEvent>,
    mut saves: EventWriter<SaveRequestEvent>,
) {
    if fade_done.read().next().is_none() {
        return;
    }
    let Some(target) = transition.take_awaited() else {
        return;
    };

    fades.send(FadeRequestEvent(FadeDirection::In));

    record.past_scene = record.current_scene.clone();
    record.current_scene = target.clone();
    saves.send(SaveRequestEvent);

    info!("zone handoff: '{}' -> '{}'", record.past_scene, target);
    zone_changes.send(ZoneChangeEvent { zone: target });

    transition.reset();
}
