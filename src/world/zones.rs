//! Zone population. One controller, parameterized by `ZoneDef` data —
//! adding a zone means adding a data entry, not a type.

use bevy::prelude::*;
use bevy::sprite::Anchor;

use crate::companion::{Follower, COMPANION_KIND};
use crate::npcs::{Patrol, SpeechBubble};
use crate::player::{WalkCycle, PLAYER_KIND};
use crate::shared::*;

use super::transition::ExitTrigger;
use super::triggers::TriggerZone;

/// System (OnEnter Playing): kick off the first zone load from the
/// persisted record.
pub fn spawn_initial_zone(
    record: Res<PlayerRecord>,
    mut zone_changes: EventWriter<ZoneChangeEvent>,
) {
    zone_changes.send(ZoneChangeEvent {
        zone: record.current_scene.clone(),
    });
}

/// Pick the spawn placement matching the zone the player came from, falling
/// back to the zone's first spawn record.
pub fn resolve_spawn(def: &ZoneDef, past_scene: &str) -> Option<Vec2> {
    let mut first = None;
    for placement in &def.placements {
        if placement.kind != PlacementKind::Spawn {
            continue;
        }
        if placement.property("pastScene") == Some(past_scene) {
            return Some(Vec2::new(placement.x, placement.y));
        }
        if first.is_none() {
            first = Some(Vec2::new(placement.x, placement.y));
        }
    }
    first
}

/// System: tear down the previous zone and populate the new one from its
/// definition, passing the player record through.
pub fn handle_zone_change(
    mut commands: Commands,
    mut events: EventReader<ZoneChangeEvent>,
    registry: Res<ZoneRegistry>,
    mut record: ResMut<PlayerRecord>,
    mut rng: ResMut<PatrolRng>,
    asset_server: Res<AssetServer>,
    previous: Query<Entity, With<ZoneScoped>>,
) {
    let Some(zone) = events.read().last().map(|e| e.zone.clone()) else {
        return;
    };
    let Some(def) = registry.get(&zone) else {
        warn!("zone '{}' is not in the registry; staying put", zone);
        return;
    };

    for entity in &previous {
        commands.entity(entity).despawn_recursive();
    }

    info!("loading zone '{}' (tilemap '{}')", zone, def.tilemap);

    // ── Player ───────────────────────────────────────────────────────
    // A freshly loaded game resumes at the saved position; otherwise the
    // spawn point keyed by the zone we came from wins.
    let spawn_pos = if !record.active {
        record.active = true;
        Vec2::new(record.position.x, record.position.y)
    } else {
        resolve_spawn(def, &record.past_scene).unwrap_or_else(|| {
            warn!("zone '{}' has no spawn placement", zone);
            Vec2::splat(HALF_TILE)
        })
    };

    let facing = record.facing();
    commands.spawn((
        Player,
        ZoneScoped,
        WorldPosition(spawn_pos),
        GridMover::at(spawn_pos, PLAYER_SPEED, facing),
        WalkCycle::default(),
        AnimationKey(stand_key(PLAYER_KIND, facing)),
        Sprite::from_image(asset_server.load("sprites/player.png")),
        Transform::from_xyz(spawn_pos.x, -spawn_pos.y, 1.0),
    ));

    // ── Companion ────────────────────────────────────────────────────
    // Once following, the companion arrives with the player in every zone;
    // before that it waits wherever the zone data puts it.
    let companion_pos = if record.max_is_following {
        Some(spawn_pos + Vec2::new(0.0, TILE_SIZE))
    } else {
        def.companion.map(|c| Vec2::new(c.x, c.y))
    };
    if let Some(pos) = companion_pos {
        commands.spawn((
            Companion,
            ZoneScoped,
            WorldPosition(pos),
            GridMover::at(pos, COMPANION_SPEED, Facing::Up),
            Follower::restored(record.max_is_following),
            AnimationKey(stand_key(COMPANION_KIND, Facing::Up)),
            Sprite::from_image(asset_server.load("sprites/ember.png")),
            Transform::from_xyz(pos.x, -pos.y, 1.0),
        ));
    }

    // ── NPCs ─────────────────────────────────────────────────────────
    for config in &def.npcs {
        let pos = Vec2::new(config.x, config.y);
        let npc_facing = Facing::from_frame(config.frame);
        let mut patrol = Patrol::new(&config.sprite, config.bounds);
        patrol.schedule_next_move(&mut rng.0);

        commands.spawn((
            Npc,
            ZoneScoped,
            WorldPosition(pos),
            GridMover::at(pos, NPC_SPEED, npc_facing),
            patrol,
            SpeechBubble::new(&config.text),
            AnimationKey(stand_key(&config.sprite, npc_facing)),
            Sprite::from_image(asset_server.load(format!("sprites/{}.png", config.sprite))),
            Transform::from_xyz(pos.x, -pos.y, 1.0),
        ));
    }

    // ── Triggers & exits ─────────────────────────────────────────────
    for placement in &def.placements {
        match placement.kind {
            PlacementKind::Sign | PlacementKind::BigSign => {
                let rect = WorldRect::from_top_left(
                    placement.x,
                    placement.y,
                    placement.width,
                    placement.height,
                );
                let text = placement.property("text").unwrap_or("").to_string();
                let mut entity = commands.spawn((
                    TriggerZone::new(placement.kind, rect, text.clone()),
                    ZoneScoped,
                    Visibility::Hidden,
                ));

                // Small signs get a floating world-space label; big signs
                // render through the UI layer instead.
                if placement.kind == PlacementKind::Sign {
                    let center_x = (rect.min.x + rect.max.x) / 2.0;
                    entity.insert((
                        Text2d::new(text),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                        Anchor::BottomCenter,
                        Transform::from_xyz(center_x, -(rect.min.y - 10.0), 50.0),
                    ));
                }
            }
            PlacementKind::Exit => {
                let pos = Vec2::new(placement.x, placement.y);
                commands.spawn((
                    ExitTrigger {
                        rect: WorldRect::centered(pos, HALF_TILE),
                        target: placement.property("targetScene").map(String::from),
                    },
                    ZoneScoped,
                ));
            }
            PlacementKind::Spawn => {}
        }
    }
}
