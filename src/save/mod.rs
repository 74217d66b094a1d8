//! Load and store the running game as a JSON document
//!
//! The turn engine never touches the disk. The binary loads a state here
//! before the first turn and writes the engine's result back after each
//! completed one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::Result;
use crate::fleet::GameState;

/// Built-in opening scenario: the North Sea, August 1914
pub const DEFAULT_SEED: &str = include_str!("../../data/initial_state.json");

/// Parse a state document
pub fn load_from_json(json: &str) -> Result<GameState> {
    Ok(serde_json::from_str(json)?)
}

/// Parse the built-in opening scenario
pub fn default_seed() -> Result<GameState> {
    load_from_json(DEFAULT_SEED)
}

/// Load the saved game at `path`, or start from `seed` if there is none
pub fn load_or_seed(path: &Path, seed: &str) -> Result<GameState> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let state = load_from_json(&contents)?;
        tracing::info!("Resuming saved game at turn {} from {:?}", state.turn, path);
        Ok(state)
    } else {
        tracing::info!("No saved game at {:?}, starting a new one", path);
        load_from_json(seed)
    }
}

/// Write the state to `path`
///
/// The document goes to a sibling temp file first and is then renamed
/// over the target, so an interrupted write never leaves a torn save.
pub fn save(path: &Path, state: &GameState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, serde_json::to_string_pretty(state)?)?;
    fs::rename(&tmp, path)?;

    tracing::debug!("Saved turn {} to {:?}", state.turn, path);
    Ok(())
}

/// Remove a saved game so the next load starts from the seed
pub fn reset(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
        tracing::info!("Discarded saved game at {:?}", path);
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
