//! The built-in zone table.
//!
//! Zones are pure data: placement records (spawns, exits, signage) plus an
//! NPC roster, in the same schema the level editor exports. Positions are
//! world units, y-down; entities at rest sit on tile centers (multiples of
//! 32, offset 16).
//!
//! NPC patrol bounds use the compact convention the level data has always
//! carried: a real rectangle patrols, an all-zero rectangle stands in place
//! but keeps turning, and a rectangle summing to exactly 1 never turns at
//! all. `PatrolProfile::from_bounds` decodes this into explicit flags.

use std::collections::HashMap;

use crate::shared::{ZoneDef, ZoneId};

pub fn parse_zone_table(
    source: &str,
) -> Result<HashMap<ZoneId, ZoneDef>, ron::error::SpannedError> {
    ron::from_str(source)
}

pub const ZONE_TABLE: &str = r#"{
    "cottage": (
        tilemap: "cottage",
        placements: [
            (
                type: spawn,
                x: 112.0, y: 144.0,
            ),
            (
                type: spawn,
                x: 144.0, y: 208.0,
                properties: [(name: "pastScene", value: "meadow")],
            ),
            (
                type: sign,
                x: 96.0, y: 80.0, width: 64.0, height: 32.0,
                properties: [(name: "text", value: "A worn journal lies open on the desk.")],
            ),
            (
                type: exit,
                x: 144.0, y: 272.0,
                properties: [(name: "targetScene", value: "meadow")],
            ),
        ],
        npcs: [],
        companion: Some((x: 176.0, y: 144.0)),
    ),
    "meadow": (
        tilemap: "meadow",
        placements: [
            (
                type: spawn,
                x: 272.0, y: 112.0,
                properties: [(name: "pastScene", value: "cottage")],
            ),
            (
                type: spawn,
                x: 848.0, y: 464.0,
                properties: [(name: "pastScene", value: "village")],
            ),
            (
                type: sign,
                x: 432.0, y: 432.0, width: 64.0, height: 32.0,
                properties: [(name: "text", value: "Emberway Meadow. The village lies east.")],
            ),
            (
                type: exit,
                x: 272.0, y: 80.0,
                properties: [(name: "targetScene", value: "cottage")],
            ),
            (
                type: exit,
                x: 880.0, y: 464.0,
                properties: [(name: "targetScene", value: "village")],
            ),
        ],
        npcs: [
            (
                sprite: "rowan",
                x: 464.0, y: 336.0,
                frame: 2,
                text: "Mind the seedlings, please!",
                bounds: (min_x: 400.0, max_x: 560.0, min_y: 272.0, max_y: 400.0),
            ),
            (
                sprite: "wren",
                x: 336.0, y: 208.0,
                frame: 0,
                text: "Lovely breeze today.",
                bounds: (min_x: 0.0, max_x: 0.0, min_y: 0.0, max_y: 0.0),
            ),
            (
                sprite: "hazel",
                x: 560.0, y: 176.0,
                frame: 2,
                text: "I have stood watch here forty years.",
                bounds: (min_x: 0.0, max_x: 0.0, min_y: 0.0, max_y: 1.0),
            ),
        ],
    ),
    "village": (
        tilemap: "village",
        placements: [
            (
                type: spawn,
                x: 112.0, y: 272.0,
                properties: [(name: "pastScene", value: "meadow")],
            ),
            (
                type: sign,
                x: 208.0, y: 240.0, width: 64.0, height: 32.0,
                properties: [(name: "text", value: "Marla's Bakery")],
            ),
            (
                type: bigSign,
                x: 304.0, y: 400.0, width: 96.0, height: 48.0,
                properties: [(name: "text", value: "WELCOME TO EMBER VILLAGE. Founded long before anyone cared to write it down.")],
            ),
            (
                type: exit,
                x: 80.0, y: 272.0,
                properties: [(name: "targetScene", value: "meadow")],
            ),
        ],
        npcs: [
            (
                sprite: "marla",
                x: 368.0, y: 304.0,
                frame: 3,
                text: "Fresh bread, every morning!",
                bounds: (min_x: 304.0, max_x: 432.0, min_y: 240.0, max_y: 368.0),
            ),
        ],
    ),
}"#;
