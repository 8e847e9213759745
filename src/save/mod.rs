//! Player record persistence.
//!
//! The record is one flat JSON blob under a fixed storage key. Native
//! builds keep it as a file in a `saves/` directory next to the executable
//! (written atomically via tmp-file + rename); wasm builds keep it in
//! `window.localStorage`, which is where historical saves live — the key
//! and field names are unchanged so those keep loading.

use bevy::prelude::*;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::shared::*;

/// The fixed storage key for the player record.
pub const STORAGE_KEY: &str = "playerData";

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_player_record)
            .add_systems(Update, handle_save_request);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// STORAGE BACKENDS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
fn saves_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("saves")
}

#[cfg(not(target_arch = "wasm32"))]
fn record_path() -> PathBuf {
    saves_directory().join(format!("{}.json", STORAGE_KEY))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write_record(record: &PlayerRecord) -> Result<(), String> {
    let dir = saves_directory();
    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| format!("Could not create saves directory: {}", e))?;
    }

    let json = serde_json::to_string(record).map_err(|e| format!("Serialization failed: {}", e))?;

    let path = record_path();
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read_record() -> Result<PlayerRecord, String> {
    let path = record_path();
    if !path.exists() {
        return Err("no saved player record".to_string());
    }
    let json = fs::read_to_string(&path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| format!("Deserialization failed: {}", e))
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())
}

#[cfg(target_arch = "wasm32")]
pub fn write_record(record: &PlayerRecord) -> Result<(), String> {
    let json = serde_json::to_string(record).map_err(|e| format!("Serialization failed: {}", e))?;
    local_storage()?
        .set_item(STORAGE_KEY, &json)
        .map_err(|_| "localStorage write failed".to_string())
}

#[cfg(target_arch = "wasm32")]
pub fn read_record() -> Result<PlayerRecord, String> {
    let json = local_storage()?
        .get_item(STORAGE_KEY)
        .map_err(|_| "localStorage read failed".to_string())?
        .ok_or_else(|| "no saved player record".to_string())?;
    serde_json::from_str(&json).map_err(|e| format!("Deserialization failed: {}", e))
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Startup: replace the default record with the persisted one, if any. A
/// missing or unreadable record means a fresh game, not an error.
fn load_player_record(mut record: ResMut<PlayerRecord>) {
    match read_record() {
        Ok(loaded) => {
            info!(
                "loaded player record: zone '{}', active={}",
                loaded.current_scene, loaded.active
            );
            *record = loaded;
        }
        Err(reason) => {
            info!("starting fresh: {}", reason);
        }
    }
}

/// Persist the record whenever anything requests it (the transition
/// coordinator does, after every zone handoff).
fn handle_save_request(mut events: EventReader<SaveRequestEvent>, record: Res<PlayerRecord>) {
    if events.read().next().is_none() {
        return;
    }
    if let Err(reason) = write_record(&record) {
        warn!("player record save failed: {}", reason);
    }
}
