use anyhow::Result;
use digsite_world::WorldConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/world.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Tick budget for a headless run when none is given on the command line.
    pub max_ticks: u64,
    pub world: WorldConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_ticks: 200,
            world: WorldConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load the game configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    ///
    /// A file that parses but fails validation is also replaced by defaults.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
                Ok(cfg) => match cfg.world.validate() {
                    Ok(()) => cfg,
                    Err(err) => {
                        warn!("Invalid world config in {}: {err}. Using defaults", path.display());
                        GameConfig::default()
                    }
                },
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    GameConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("World config not found at {}. Using defaults", path.display());
                }
                GameConfig::default()
            }
        }
    }

    /// Save the configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digsite_core::BlockType;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "digsite-{name}-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let cfg: GameConfig = toml::from_str(
            r#"
            max_ticks = 40

            [world]
            seed = "quarry"
            chunk_load_distance = 1
            chunk_unload_distance = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.max_ticks, 40);
        assert_eq!(cfg.world.seed.as_deref(), Some("quarry"));
        assert_eq!(cfg.world.chunk_load_distance, 1);
        assert_eq!(cfg.world.world_width_tiles, 100);
        assert_eq!(cfg.world.terrain.surface_level, 5);
    }

    #[test]
    fn terrain_layers_parse_from_toml() {
        let cfg: GameConfig = toml::from_str(
            r#"
            [world.terrain]
            surface_level = 8

            [[world.terrain.layers]]
            start_depth = 0
            end_depth = 4
            block_type = "dirt"

            [[world.terrain.layers]]
            start_depth = 4
            block_type = "dark_stone"

            [[world.terrain.ore_layers]]
            start_depth = 6
            end_depth = 12
            block_type = "ruby"
            chance = 0.25
            "#,
        )
        .unwrap();
        let terrain = &cfg.world.terrain;
        assert_eq!(terrain.surface_level, 8);
        assert_eq!(terrain.layers.len(), 2);
        assert_eq!(terrain.layers[1].end_depth, None);
        assert_eq!(terrain.layers[1].block_type, BlockType::DarkStone);
        assert_eq!(terrain.ore_layers[0].block_type, BlockType::Ruby);
    }

    #[test]
    fn missing_or_invalid_file_falls_back_to_defaults() {
        let dir = temp_dir("config-fallback");
        assert_eq!(
            GameConfig::load_from_path(&dir.join("absent.toml")),
            GameConfig::default()
        );

        fs::create_dir_all(&dir).unwrap();
        let broken = dir.join("broken.toml");
        fs::write(&broken, "max_ticks = \"soon\"").unwrap();
        assert_eq!(GameConfig::load_from_path(&broken), GameConfig::default());

        let invalid = dir.join("invalid.toml");
        fs::write(&invalid, "[world]\nchunk_width_tiles = 0\n").unwrap();
        assert_eq!(GameConfig::load_from_path(&invalid), GameConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_preserves_config() {
        let dir = temp_dir("config-save");
        let path = dir.join("world.toml");
        let mut cfg = GameConfig::default();
        cfg.world.seed = Some("saved".into());
        cfg.max_ticks = 12;
        cfg.save_to_path(&path).unwrap();
        assert_eq!(GameConfig::load_from_path(&path), cfg);
        let _ = fs::remove_dir_all(&dir);
    }
}
