//! Dialogue presentation: the companion's bottom-screen box, the centered
//! big-sign panel, floating sign labels, and NPC speech bubbles.
//!
//! All visibility decisions are made by the logic layer (trigger overlap,
//! patrol sighting, the companion dialogue queue); this module only mirrors
//! that state into renderable nodes.

use bevy::prelude::*;

use crate::companion::CompanionDialogue;
use crate::npcs::SpeechBubble;
use crate::shared::*;
use crate::world::triggers::TriggerZone;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct CompanionBoxRoot;

#[derive(Component)]
pub struct CompanionBoxText;

#[derive(Component)]
pub struct BigSignRoot;

#[derive(Component)]
pub struct BigSignText;

/// World-space label hovering over a sighted NPC.
#[derive(Component)]
pub struct BubbleLabel {
    pub npc: Entity,
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN — boxes exist from startup, hidden until needed
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_companion_box(mut commands: Commands) {
    commands
        .spawn((
            CompanionBoxRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::FlexEnd,
                padding: UiRect::bottom(Val::Px(40.0)),
                ..default()
            },
            Visibility::Hidden,
            GlobalZIndex(90),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(600.0),
                        padding: UiRect::all(Val::Px(20.0)),
                        border: UiRect::all(Val::Px(4.0)),
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                    BorderColor(Color::BLACK),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        CompanionBoxText,
                        Text::new(""),
                        TextFont {
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                });
        });
}

pub fn spawn_big_sign_panel(mut commands: Commands) {
    commands
        .spawn((
            BigSignRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Visibility::Hidden,
            GlobalZIndex(95),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(600.0),
                        padding: UiRect::all(Val::Px(20.0)),
                        border: UiRect::all(Val::Px(4.0)),
                        justify_content: JustifyContent::Center,
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                    BorderColor(Color::BLACK),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        BigSignText,
                        Text::new(""),
                        TextFont {
                            font_size: 28.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                });
        });
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Mirror the companion dialogue queue into the bottom box.
pub fn update_companion_box(
    dialogue: Res<CompanionDialogue>,
    mut root: Query<&mut Visibility, With<CompanionBoxRoot>>,
    mut text: Query<&mut Text, With<CompanionBoxText>>,
) {
    let Ok(mut visibility) = root.get_single_mut() else {
        return;
    };

    match &dialogue.current {
        Some(line) => {
            *visibility = Visibility::Visible;
            for mut t in &mut text {
                **t = format!("Ember: {}", line);
            }
        }
        None => *visibility = Visibility::Hidden,
    }
}

/// Show the first visible big sign's text in the centered panel.
pub fn update_big_sign_panel(
    triggers: Query<&TriggerZone>,
    mut root: Query<&mut Visibility, With<BigSignRoot>>,
    mut text: Query<&mut Text, With<BigSignText>>,
) {
    let Ok(mut visibility) = root.get_single_mut() else {
        return;
    };

    let shown = triggers
        .iter()
        .find(|t| t.kind == PlacementKind::BigSign && t.visible);

    match shown {
        Some(trigger) => {
            *visibility = Visibility::Visible;
            for mut t in &mut text {
                **t = trigger.text.clone();
            }
        }
        None => *visibility = Visibility::Hidden,
    }
}

/// Toggle the floating labels attached to small sign triggers.
pub fn update_sign_labels(mut query: Query<(&TriggerZone, &mut Visibility)>) {
    for (trigger, mut visibility) in query.iter_mut() {
        *visibility = if trigger.visible && trigger.kind == PlacementKind::Sign {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Spawn a speech label above an NPC when its bubble turns visible and tear
/// it down when the bubble hides (or the NPC is gone).
pub fn update_npc_bubbles(
    mut commands: Commands,
    npcs: Query<(Entity, &WorldPosition, &SpeechBubble), With<Npc>>,
    labels: Query<(Entity, &BubbleLabel)>,
) {
    for (npc_entity, pos, bubble) in &npcs {
        let existing = labels.iter().find(|(_, label)| label.npc == npc_entity);
        match (bubble.visible, existing) {
            (true, None) => {
                commands.spawn((
                    BubbleLabel { npc: npc_entity },
                    Text2d::new(bubble.text.clone()),
                    TextFont {
                        font_size: 16.0,
                        ..default()
                    },
                    TextColor(Color::BLACK),
                    Transform::from_xyz(pos.0.x, -(pos.0.y - 25.0), 60.0),
                ));
            }
            (false, Some((label_entity, _))) => {
                commands.entity(label_entity).despawn();
            }
            _ => {}
        }
    }

    for (label_entity, label) in &labels {
        if npcs.get(label.npc).is_err() {
            commands.entity(label_entity).despawn();
        }
    }
}
