//! Shared components, resources, events, and states for Emberway.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// GRID & FACING
// ═══════════════════════════════════════════════════════════════════════

/// Side length of one map tile in world units. Entities at rest sit on tile
/// centers: `tile_index * TILE_SIZE + TILE_SIZE / 2`.
pub const TILE_SIZE: f32 = 32.0;
pub const HALF_TILE: f32 = TILE_SIZE / 2.0;

/// World units per second while the player walks between tiles.
pub const PLAYER_SPEED: f32 = 110.0;
/// The companion keeps pace with the player.
pub const COMPANION_SPEED: f32 = 110.0;
/// NPCs amble more slowly.
pub const NPC_SPEED: f32 = 80.0;

/// Below this speed an entity counts as standing still and gets re-snapped
/// to the grid.
pub const VELOCITY_EPSILON: f32 = 1e-2;
/// Within this distance of the target the entity hard-snaps onto it.
pub const ARRIVE_THRESHOLD: f32 = TILE_SIZE / 8.0;
/// New directional input is only read when closer than this to the target.
pub const INPUT_ACCEPT_DISTANCE: f32 = 1.0;

/// How far ahead a patrolling NPC can see, and how far to either side of its
/// sight line the player may stand and still be noticed.
pub const SIGHT_DISTANCE: f32 = 3.0 * TILE_SIZE;
pub const SIGHT_TOLERANCE: f32 = 15.0;

/// Patrol NPCs re-roll their direction after a uniform random delay in this
/// range (seconds).
pub const PATROL_DELAY_MIN: f32 = 0.5;
pub const PATROL_DELAY_MAX: f32 = 5.0;

/// A detached companion starts following once the player is within this
/// distance of it on both axes.
pub const COMPANION_ADOPT_RADIUS: f32 = 33.0;

/// Screen fade duration for zone transitions, each leg.
pub const FADE_DURATION: f32 = 1.0;

pub const SCREEN_WIDTH: f32 = 800.0;
pub const SCREEN_HEIGHT: f32 = 600.0;

/// Snap a coordinate onto the tile-center grid: the nearest value satisfying
/// `(coord + HALF_TILE) % TILE_SIZE == 0`.
pub fn snap_to_grid(coord: f32) -> f32 {
    ((coord + HALF_TILE) / TILE_SIZE).round() * TILE_SIZE - HALF_TILE
}

/// True when the coordinate lies on the half-tile lattice (tile centers and
/// the midpoints between them). Follow-path samples are filtered with this.
pub fn is_half_tile_aligned(coord: f32) -> bool {
    coord % HALF_TILE == 0.0
}

/// Axis-aligned rectangle in world units (y-down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl WorldRect {
    /// From a level-data placement: top-left corner plus extent.
    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self {
            min: center - Vec2::splat(half),
            max: center + Vec2::splat(half),
        }
    }

    pub fn overlaps(&self, other: &WorldRect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// The player's collision bounds: one tile centered on its position.
pub fn player_bounds(pos: Vec2) -> WorldRect {
    WorldRect::centered(pos, TILE_SIZE)
}

/// Cardinal facing. Exactly one per mobile entity at all times.
///
/// World coordinates are y-down (the level editor's convention), so `Up`
/// decreases y. The render sync flips to Bevy's y-up axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Down
    }
}

impl Facing {
    /// Unit grid offset in y-down world coordinates.
    pub fn offset(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// The integer encoding used in the persisted player record
    /// (1=Up, 2=Down, 3=Left, 4=Right).
    pub fn to_record(self) -> u8 {
        match self {
            Facing::Up => 1,
            Facing::Down => 2,
            Facing::Left => 3,
            Facing::Right => 4,
        }
    }

    pub fn from_record(value: u8) -> Facing {
        match value {
            2 => Facing::Down,
            3 => Facing::Left,
            4 => Facing::Right,
            _ => Facing::Up,
        }
    }

    /// Spritesheet frame → initial facing, for NPC placement records
    /// (0=Up, 1=Right, 2=Down, 3=Left).
    pub fn from_frame(frame: u32) -> Facing {
        match frame {
            0 => Facing::Up,
            1 => Facing::Right,
            2 => Facing::Down,
            3 => Facing::Left,
            _ => Facing::Down,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FRAME ORDER
// ═══════════════════════════════════════════════════════════════════════

/// The declared per-frame compose order, configured in `main.rs` with
/// `.chain()`: sign/trigger checks run first, then the player's motion step
/// (with the companion nested inside it), then NPC sight and patrol.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameStep {
    Triggers,
    PlayerMotion,
    NpcUpdate,
}

// ═══════════════════════════════════════════════════════════════════════
// CORE COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Logical entity position in world units, y-down. The single source of
/// truth for gameplay; `Transform` is derived from it for rendering.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct WorldPosition(pub Vec2);

/// Grid-locked movement state: where the entity is headed and how fast.
/// `target == position` means idle.
#[derive(Component, Debug, Clone)]
pub struct GridMover {
    pub target: Vec2,
    pub velocity: Vec2,
    pub speed: f32,
    pub facing: Facing,
}

impl GridMover {
    pub fn at(pos: Vec2, speed: f32, facing: Facing) -> Self {
        Self {
            target: pos,
            velocity: Vec2::ZERO,
            speed,
            facing,
        }
    }
}

/// The animation the presentation layer should show for this entity:
/// `<kind>_walk_<dir>` or `<kind>_stand_<dir>`.
#[derive(Component, Debug, Clone, Default)]
pub struct AnimationKey(pub String);

pub fn walk_key(kind: &str, facing: Facing) -> String {
    format!("{}_walk_{}", kind, facing.suffix())
}

pub fn stand_key(kind: &str, facing: Facing) -> String {
    format!("{}_stand_{}", kind, facing.suffix())
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Companion;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Npc;

/// Everything spawned while populating a zone carries this marker so the
/// transition handoff can clear the zone wholesale.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ZoneScoped;

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// The single point where hardware input becomes game actions, written once
/// per frame in `PreUpdate` and read by everything else.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Interact / advance-dialogue, edge-triggered.
    pub interact: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// ZONE DATA — the level-object schema
// ═══════════════════════════════════════════════════════════════════════

pub type ZoneId = String;

/// One key-value pair from a placement's property list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementKind {
    #[serde(rename = "spawn")]
    Spawn,
    #[serde(rename = "exit")]
    Exit,
    #[serde(rename = "sign")]
    Sign,
    #[serde(rename = "bigSign")]
    BigSign,
}

/// A typed placement record from the level data: a type tag, a position,
/// optional extent, and a free-form property list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRecord {
    #[serde(rename = "type")]
    pub kind: PlacementKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl PlacementRecord {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

/// Axis-aligned rectangle constraining an NPC's patrol targets, in world
/// units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PatrolBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl PatrolBounds {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    fn sum(&self) -> f32 {
        self.min_x + self.max_x + self.min_y + self.max_y
    }
}

/// Explicit decoding of the compact bounds-sum convention carried by the
/// zone data: a bounds sum of 0 marks an NPC that stands in place but still
/// rotates on its patrol timer, a sum of 1 marks one that never turns at
/// all, and anything else is a real patrol rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatrolProfile {
    pub stationary: bool,
    pub rotates: bool,
}

impl PatrolProfile {
    pub fn from_bounds(bounds: &PatrolBounds) -> Self {
        let sum = bounds.sum();
        if sum == 1.0 {
            Self {
                stationary: true,
                rotates: false,
            }
        } else if sum < 2.0 {
            Self {
                stationary: true,
                rotates: true,
            }
        } else {
            Self {
                stationary: false,
                rotates: true,
            }
        }
    }
}

/// Declarative NPC placement: where it spawns, what it looks like, what it
/// says, and where it may wander.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcConfig {
    pub sprite: String,
    pub x: f32,
    pub y: f32,
    /// Spritesheet frame index; encodes the initial facing.
    pub frame: u32,
    pub text: String,
    pub bounds: PatrolBounds,
}

/// A whole zone, described by data rather than by a type per zone: its
/// placement records (spawns, exits, signage) and its NPC roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDef {
    pub tilemap: String,
    #[serde(default)]
    pub placements: Vec<PlacementRecord>,
    #[serde(default)]
    pub npcs: Vec<NpcConfig>,
    /// Where a detached companion waits in this zone, if anywhere.
    #[serde(default)]
    pub companion: Option<RecordPosition>,
}

/// All zones, keyed by zone id. Populated by the data plugin during Loading.
#[derive(Resource, Debug, Clone, Default)]
pub struct ZoneRegistry {
    pub zones: std::collections::HashMap<ZoneId, ZoneDef>,
}

impl ZoneRegistry {
    pub fn get(&self, id: &str) -> Option<&ZoneDef> {
        self.zones.get(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER RECORD — the persisted blob
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RecordPosition {
    pub x: f32,
    pub y: f32,
}

/// The flat player record persisted under the fixed storage key. Field names
/// and the integer direction encoding match the historical save blob, so
/// existing saves keep loading.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRecord {
    pub name: String,
    /// true = boy, false = girl, as the character creator encodes it.
    pub gender: bool,
    pub current_scene: ZoneId,
    pub past_scene: ZoneId,
    pub intro: ZoneId,
    pub credits: ZoneId,
    pub position: RecordPosition,
    pub active: bool,
    pub direction: u8,
    pub last_direction: u8,
    pub max_is_following: bool,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: true,
            current_scene: "cottage".to_string(),
            past_scene: String::new(),
            intro: String::new(),
            credits: String::new(),
            // The cottage's default spawn point, tile-center aligned.
            position: RecordPosition { x: 112.0, y: 144.0 },
            active: false,
            direction: Facing::Up.to_record(),
            last_direction: Facing::Up.to_record(),
            max_is_following: false,
        }
    }
}

impl PlayerRecord {
    pub fn facing(&self) -> Facing {
        Facing::from_record(self.direction)
    }

    pub fn set_facing(&mut self, facing: Facing) {
        self.direction = facing.to_record();
    }

    pub fn set_last_direction(&mut self, facing: Facing) {
        self.last_direction = facing.to_record();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SIGN VISIBILITY — scene-level aggregate flags
// ═══════════════════════════════════════════════════════════════════════

/// "At least one dialogue box of this kind is visible", recomputed from
/// scratch every frame by the trigger systems.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SignVisibility {
    pub sign: bool,
    pub big_sign: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// RANDOMNESS
// ═══════════════════════════════════════════════════════════════════════

/// Seedable random source for patrol direction and delay rolls. Tests seed
/// it for determinism.
#[derive(Resource, Debug)]
pub struct PatrolRng(pub StdRng);

impl Default for PatrolRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// Fade the viewport to opaque.
    Out,
    /// Fade back to transparent.
    In,
}

/// Ask the fade overlay to run one fade leg.
#[derive(Event, Debug, Clone, Copy)]
pub struct FadeRequestEvent(pub FadeDirection);

/// Emitted by the fade overlay once a fade-out reaches full opacity. The
/// transition coordinator suspends on this; fade-in completion is never
/// reported.
#[derive(Event, Debug, Clone, Copy)]
pub struct FadeOutCompleteEvent;

/// Hand control to a new zone. The world plugin despawns the old zone's
/// entities and populates the new one.
#[derive(Event, Debug, Clone)]
pub struct ZoneChangeEvent {
    pub zone: ZoneId,
}

/// Queue a sequence of companion dialogue lines for the bottom-screen box.
#[derive(Event, Debug, Clone)]
pub struct CompanionDialogueEvent {
    pub lines: Vec<String>,
}

/// Persist the current player record.
#[derive(Event, Debug, Clone, Copy)]
pub struct SaveRequestEvent;
