//! Configuration management for the digilife CLI.

use anyhow::{Context, Result};
use digilife::prelude::SimConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "digilife.toml";
pub const DATA_DIR: &str = ".digilife";

/// digilife project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub simulation: SimConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Simulated steps per second; each tick advances `1 / fps` seconds.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Ticks between statistics samples during a run.
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
    /// Worker threads for parallel scans (0 = one per core).
    #[serde(default)]
    pub workers: usize,
}

fn default_ticks() -> u64 { 3600 }
fn default_fps() -> u32 { 60 }
fn default_stats_interval() -> u64 { 600 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            fps: default_fps(),
            stats_interval: default_stats_interval(),
            workers: 0,
        }
    }
}

impl Config {
    /// Load `digilife.toml` from the current or a parent directory, then
    /// from the user config directory, else fall back to defaults.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .simulation
            .validate()
            .with_context(|| format!("Invalid simulation settings in {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find digilife.toml in current or parent directories, then in the user config dir.
fn find_config_file() -> Option<PathBuf> {
    if let Some(found) = std::env::current_dir().ok().and_then(|dir| search_upwards(&dir)) {
        return Some(found);
    }
    let user = dirs::config_dir()?.join("digilife").join(CONFIG_FILE);
    user.exists().then_some(user)
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Get the digilife data directory (.digilife/).
pub fn data_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(DATA_DIR))
}

/// Get the sessions directory.
pub fn sessions_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("sessions"))
}

/// Get the current session file path.
pub fn current_session_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("current.json"))
}

/// Resolve a `--load` argument: an existing file path, or the name of a saved session.
pub fn resolve_session(name_or_path: &str) -> Result<PathBuf> {
    let direct = PathBuf::from(name_or_path);
    if direct.is_file() {
        return Ok(direct);
    }
    Ok(sessions_dir()?.join(format!("{}.json", name_or_path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.run.ticks, config.run.ticks);
        assert_eq!(parsed.simulation, config.simulation);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            "[run]\nticks = 10\n\n[simulation.world]\ninitial_population = 3\n",
        )
        .unwrap();
        assert_eq!(parsed.run.ticks, 10);
        assert_eq!(parsed.run.fps, 60);
        assert_eq!(parsed.simulation.world.initial_population, 3);
        assert_eq!(parsed.simulation.world.max_population, 120);
    }

    #[test]
    fn search_finds_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        Config::default().save(&dir.path().join(CONFIG_FILE)).unwrap();

        let found = search_upwards(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
        assert!(Config::load_from(&found).is_ok());
    }
}
