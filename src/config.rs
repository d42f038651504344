use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;
use voxelforge_world::BiomeConfig;

const DEFAULT_CONFIG_PATH: &str = "config/voxelforge.toml";

/// Engine settings shared by every subcommand.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed text; numeric strings hash the same way the in-game seed
    /// prompt does.
    pub seed: String,
    /// Chunk radius streamed around the player.
    pub view_radius: i32,
    /// Generations plus mesh builds allowed per streaming step (0 = unlimited).
    pub work_budget: usize,
    /// Fixed simulation rate in ticks per second.
    pub tick_rate: u32,
    /// Where saves land unless a subcommand overrides it.
    pub save_path: String,
    /// Biome roster override file; when absent the built-in roster is used.
    pub biomes_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: "0".to_string(),
            view_radius: 6,
            work_budget: 4,
            tick_rate: 60,
            save_path: "saves/world.vfs".to_string(),
            biomes_path: "config/biomes.toml".to_string(),
        }
    }
}

/// Biome override file layout: a `[[biomes]]` array of roster entries.
#[derive(Debug, Deserialize)]
struct BiomeFile {
    biomes: Vec<BiomeConfig>,
}

/// Biome roster override, if `path` holds a usable one.
pub fn load_biome_overrides(path: &Path) -> Option<Vec<BiomeConfig>> {
    let contents = fs::read_to_string(path).ok()?;
    match toml::from_str::<BiomeFile>(&contents) {
        Ok(file) if !file.biomes.is_empty() => Some(file.biomes),
        Ok(_) => {
            warn!(
                "{} declares no biomes. Using the standard roster",
                path.display()
            );
            None
        }
        Err(err) => {
            warn!(
                "Failed to parse {}: {err}. Using the standard roster",
                path.display()
            );
            None
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<EngineConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    EngineConfig::default()
                }
            },
            Err(err) => {
                if path.exists() {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                EngineConfig::default()
            }
        }
    }

    /// Persist the configuration, creating parent directories as needed.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Seconds per simulation tick.
    pub fn tick_seconds(&self) -> f64 {
        1.0 / f64::from(self.tick_rate.max(1))
    }
}
