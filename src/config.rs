use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::lesson::LessonSettings;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_game_seconds")]
    pub game_seconds: u32,
    #[serde(default = "default_preflight_timeout_secs")]
    pub preflight_timeout_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_game_seconds() -> u32 {
    30
}
fn default_preflight_timeout_secs() -> u64 {
    5
}
fn default_idle_timeout_secs() -> u64 {
    5
}
fn default_tick_rate_ms() -> u64 {
    40
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            game_seconds: default_game_seconds(),
            preflight_timeout_secs: default_preflight_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quill")
            .join("config.toml")
    }

    /// Clamp values a hand-edited config file could get wrong.
    pub fn validate(&mut self) {
        self.game_seconds = self.game_seconds.clamp(5, 300);
        self.preflight_timeout_secs = self.preflight_timeout_secs.clamp(1, 60);
        self.idle_timeout_secs = self.idle_timeout_secs.clamp(1, 600);
        self.tick_rate_ms = self.tick_rate_ms.clamp(10, 250);
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
    }

    pub fn lesson_settings(&self) -> LessonSettings {
        LessonSettings {
            preflight_timeout: Duration::from_secs(self.preflight_timeout_secs),
            game_seconds: self.game_seconds,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}
