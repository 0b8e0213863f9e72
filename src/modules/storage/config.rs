use crate::core::traits::Preferences;
use crate::utils::app_config_dir;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User settings, stored as `config.toml` next to the library
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Sleep timer duration in minutes
    pub sleep_timer_minutes: u32,

    /// Drop a bookmark whenever the sleep timer is armed
    pub bookmark_on_sleep_timer: bool,

    /// Rewind / fast-forward step
    pub seek_step_secs: u64,

    pub speed_adjustable: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sleep_timer_minutes: 20,
            bookmark_on_sleep_timer: false,
            seek_step_secs: 20,
            speed_adjustable: true,
        }
    }
}

impl PlayerConfig {
    pub fn default_path() -> Result<PathBuf> {
        Ok(app_config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn seek_step_ms(&self) -> u64 {
        self.seek_step_secs.saturating_mul(1_000)
    }
}

impl Preferences for PlayerConfig {
    fn sleep_timer_minutes(&self) -> u32 {
        self.sleep_timer_minutes
    }

    fn bookmark_on_sleep_timer(&self) -> bool {
        self.bookmark_on_sleep_timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shelf-player-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("config.toml")
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = PlayerConfig::load_from(Path::new("/does/not/exist/config.toml")).unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.seek_step_ms(), 20_000);
    }

    #[test]
    fn saved_config_loads_back() {
        let path = temp_path("roundtrip");
        let config = PlayerConfig {
            sleep_timer_minutes: 45,
            bookmark_on_sleep_timer: true,
            ..PlayerConfig::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(PlayerConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path("partial");
        fs::write(&path, "sleep_timer_minutes = 5\n").unwrap();

        let config = PlayerConfig::load_from(&path).unwrap();
        assert_eq!(config.sleep_timer_minutes, 5);
        assert!(config.speed_adjustable);
        assert_eq!(config.sleep_timer_minutes(), 5);
    }

    #[test]
    fn huge_seek_step_saturates() {
        let path = temp_path("huge-step");
        fs::write(&path, format!("seek_step_secs = {}\n", i64::MAX)).unwrap();

        let config = PlayerConfig::load_from(&path).unwrap();
        assert_eq!(config.seek_step_ms(), u64::MAX);
    }
}
