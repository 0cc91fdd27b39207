use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::models::PracticePool;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_practice_pool")]
    pub practice_pool: String,
    #[serde(default = "default_practice_limit")]
    pub practice_limit: usize,
    #[serde(default = "default_practice_shuffle")]
    pub practice_shuffle: bool,
    #[serde(default = "default_reveal_ms")]
    pub reveal_ms: u64,
    #[serde(default = "default_generate_cards")]
    pub generate_cards: usize,
    #[serde(default = "default_generate_temperature")]
    pub generate_temperature: f64,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_practice_pool() -> String {
    "due_recent".to_string()
}
fn default_practice_limit() -> usize {
    20
}
fn default_practice_shuffle() -> bool {
    false
}
fn default_reveal_ms() -> u64 {
    200
}
fn default_generate_cards() -> usize {
    5
}
fn default_generate_temperature() -> f64 {
    0.7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            theme: default_theme(),
            practice_pool: default_practice_pool(),
            practice_limit: default_practice_limit(),
            practice_shuffle: default_practice_shuffle(),
            reveal_ms: default_reveal_ms(),
            generate_cards: default_generate_cards(),
            generate_temperature: default_generate_temperature(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studywire")
            .join("config.toml")
    }

    /// Clamp out-of-range values and reset unknown pool names.
    /// Call after deserialization to handle stale keys from old configs.
    pub fn validate(&mut self) {
        if self.server_url.trim().is_empty() {
            self.server_url = default_server_url();
        }
        if PracticePool::from_str(&self.practice_pool).is_none() {
            self.practice_pool = default_practice_pool();
        }
        self.practice_limit = self.practice_limit.min(500);
        self.reveal_ms = self.reveal_ms.clamp(0, 2000);
        self.generate_cards = self.generate_cards.clamp(1, 50);
        self.generate_temperature = self.generate_temperature.clamp(0.0, 1.5);
    }

    pub fn pool(&self) -> PracticePool {
        PracticePool::from_str(&self.practice_pool).unwrap_or(PracticePool::DueRecent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.practice_pool, "due_recent");
        assert_eq!(config.practice_limit, 20);
        assert_eq!(config.reveal_ms, 200);
    }

    #[test]
    fn test_config_serde_defaults_from_partial_file() {
        let toml_str = r#"
server_url = "http://studywire.local/api"
theme = "terminal-default"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server_url, "http://studywire.local/api");
        assert_eq!(config.theme, "terminal-default");
        // Missing fields take defaults.
        assert_eq!(config.generate_cards, 5);
        assert!(!config.practice_shuffle);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.server_url, deserialized.server_url);
        assert_eq!(config.practice_pool, deserialized.practice_pool);
        assert_eq!(config.reveal_ms, deserialized.reveal_ms);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.practice_limit = 9999;
        config.reveal_ms = 60_000;
        config.generate_cards = 0;
        config.generate_temperature = 9.0;
        config.validate();
        assert_eq!(config.practice_limit, 500);
        assert_eq!(config.reveal_ms, 2000);
        assert_eq!(config.generate_cards, 1);
        assert_eq!(config.generate_temperature, 1.5);
    }

    #[test]
    fn test_validate_resets_unknown_pool() {
        let mut config = Config::default();
        config.practice_pool = "everything".to_string();
        config.validate();
        assert_eq!(config.practice_pool, "due_recent");
    }

    #[test]
    fn test_validate_resets_blank_server_url() {
        let mut config = Config::default();
        config.server_url = "   ".to_string();
        config.validate();
        assert_eq!(config.server_url, "http://127.0.0.1:8000/api");
    }

    #[test]
    fn test_save_and_load_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.theme = "terminal-default".to_string();
        config.practice_limit = 50;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.theme, "terminal-default");
        assert_eq!(loaded.practice_limit, 50);
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.server_url, "http://127.0.0.1:8000/api");
    }
}
