use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// When a complete class produces a notification
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Only on the lesson that crosses the quota
    #[default]
    Once,
    /// On every lesson added while the class is at or past its quota
    EveryLesson,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Write one log line per delivery
    #[default]
    Log,
    /// Append deliveries to a JSONL journal on disk
    Journal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub policy: TriggerPolicy,
    /// Serialize lesson writes per class inside this process
    #[serde(default = "default_true")]
    pub serialize_per_class: bool,
    #[serde(default)]
    pub delivery: DeliveryMode,
    /// Journal directory (only used with `delivery = "journal"`).
    /// Defaults to the directory holding the database.
    #[serde(default)]
    pub journal_dir: Option<String>,
}

fn default_true() -> bool { true }

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            policy: TriggerPolicy::Once,
            serialize_per_class: true,
            delivery: DeliveryMode::Log,
            journal_dir: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                path: "./data/lesson-tracker.db".to_string(),
            },
            notifications: NotificationConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Try to load from environment variable
        if let Ok(path) = std::env::var("LESSON_TRACKER_CONFIG") {
            return Self::load_from_path(&PathBuf::from(path));
        }

        // Try to load from default locations
        let default_paths = vec![
            PathBuf::from("lesson-tracker.toml"),
            PathBuf::from("config/lesson-tracker.toml"),
            PathBuf::from("/etc/lesson-tracker/server.toml"),
        ];

        for path in default_paths {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        // Return default config if no file found
        tracing::warn!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Directory for the delivery journal
    pub fn journal_dir(&self) -> PathBuf {
        match &self.notifications.journal_dir {
            Some(dir) => PathBuf::from(dir),
            None => Path::new(&self.database.path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("./data")),
        }
    }
}
