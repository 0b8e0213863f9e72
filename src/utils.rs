use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub const APP_NAME: &str = "shelf-player";

pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "m4a", "m4b", "flac", "wav", "ogg", "opus"];

/// File names tried, in order, when looking for a book cover next to its audio files
pub const COVER_FILE_NAMES: &[&str] = &["cover.jpg", "cover.png", "folder.jpg", "folder.png"];

/// `<config dir>/shelf-player`, created on first use
pub fn app_config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Could not find config directory")?;
    path.push(APP_NAME);

    fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    Ok(path)
}
