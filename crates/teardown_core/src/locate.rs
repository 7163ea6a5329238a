//! Best-effort lookup of the save file the game writes by default.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use log::info;

const GAME_DIR: &str = "Teardown";
const SAVE_FILE_NAME: &str = "savegame.xml";

/// `<local data dir>/Teardown/savegame.xml` (`%LOCALAPPDATA%` on Windows),
/// if that file exists.
pub fn find_default_location() -> Option<PathBuf> {
    let found = BaseDirs::new().and_then(|dirs| find_in_data_dir(dirs.data_local_dir()));
    match &found {
        Some(path) => info!("Found default save file: {}", path.display()),
        None => info!("Default save file not found."),
    }
    found
}

/// Looks for the save file below a specific local data directory.
pub fn find_in_data_dir(data_dir: &Path) -> Option<PathBuf> {
    let candidate = data_dir.join(GAME_DIR).join(SAVE_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
