//! Data layer — populates the zone registry at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), parses the built-in
//! zone table, then transitions the game into GameState::Playing. If the
//! table fails to parse the game stays in Loading — that is the one load
//! failure worth surfacing, and it is surfaced loudly in the log.

mod zones;

pub use zones::{parse_zone_table, ZONE_TABLE};

use bevy::prelude::*;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_zone_data);
    }
}

fn load_zone_data(
    mut registry: ResMut<ZoneRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: loading zone table…");
    match parse_zone_table(ZONE_TABLE) {
        Ok(zones) => {
            info!("  Zones loaded: {}", zones.len());
            registry.zones = zones;
            next_state.set(GameState::Playing);
        }
        Err(err) => {
            warn!("zone table failed to parse: {}", err);
        }
    }
}
