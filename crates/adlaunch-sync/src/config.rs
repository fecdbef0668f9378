//! # Engine Configuration
//!
//! Settings for the sync engine: where the local store lives, how wide bulk
//! pauses fan out, and the creative asset limits enforced before submission.
//!
//! ## Configuration Sources (priority order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ADLAUNCH_DB_PATH, ADLAUNCH_MAX_PARALLEL_ACCOUNTS, ...              │
//! │                                                                         │
//! │  2. Config File (engine.toml)                                          │
//! │     ~/.config/adlaunch/engine.toml (Linux)                             │
//! │     ~/Library/Application Support/com.adlaunch.adlaunch/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example engine.toml
//! ```toml
//! [database]
//! path = "/var/lib/adlaunch/adlaunch.db"
//! max_connections = 5
//!
//! [pause]
//! max_parallel_accounts = 4
//!
//! [creative]
//! max_headlines = 15
//! headline_max_chars = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use adlaunch_core::validation::CreativeLimits;
use adlaunch_db::DbConfig;

// =============================================================================
// Database Settings
// =============================================================================

/// Local store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file path, or `:memory:`.
    pub path: PathBuf,

    /// Pool size.
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: 5,
        }
    }
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "adlaunch", "adlaunch")
        .map(|dirs| dirs.data_dir().join("adlaunch.db"))
        .unwrap_or_else(|| PathBuf::from("adlaunch.db"))
}

// =============================================================================
// Pause Settings
// =============================================================================

/// Bulk pause fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseSettings {
    /// Account groups paused concurrently. Calls within one account always
    /// run one at a time.
    pub max_parallel_accounts: usize,
}

impl Default for PauseSettings {
    fn default() -> Self {
        PauseSettings {
            max_parallel_accounts: 4,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Local store settings.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Bulk pause settings.
    #[serde(default)]
    pub pause: PauseSettings,

    /// Responsive ad asset limits.
    #[serde(default)]
    pub creative: CreativeLimits,
}

impl EngineConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (engine.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(SyncError::InvalidConfig("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(SyncError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.pause.max_parallel_accounts == 0 {
            return Err(SyncError::InvalidConfig(
                "pause.max_parallel_accounts must be greater than 0".into(),
            ));
        }

        self.creative
            .check()
            .map_err(|reason| SyncError::InvalidConfig(format!("creative: {reason}")))?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ADLAUNCH_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("ADLAUNCH_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid ADLAUNCH_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(parallel) = lookup("ADLAUNCH_MAX_PARALLEL_ACCOUNTS") {
            match parallel.parse::<usize>() {
                Ok(n) => {
                    debug!(max_parallel_accounts = n, "Overriding pause fan-out from environment");
                    self.pause.max_parallel_accounts = n;
                }
                Err(_) => warn!(value = %parallel, "Ignoring invalid ADLAUNCH_MAX_PARALLEL_ACCOUNTS"),
            }
        }

        if let Some(limit) = lookup("ADLAUNCH_HEADLINE_LIMIT") {
            if let Ok(n) = limit.parse::<usize>() {
                self.creative.max_headlines = n;
            }
        }

        if let Some(limit) = lookup("ADLAUNCH_DESCRIPTION_LIMIT") {
            if let Ok(n) = limit.parse::<usize>() {
                self.creative.max_descriptions = n;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "adlaunch", "adlaunch")
            .map(|dirs| dirs.config_dir().join("engine.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Builds the pool configuration for the local store.
    pub fn db_config(&self) -> DbConfig {
        if self.database.path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
        }
    }

    /// Returns the bulk pause fan-out.
    pub fn max_parallel_accounts(&self) -> usize {
        self.pause.max_parallel_accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.pause.max_parallel_accounts, 4);
        assert_eq!(config.creative, CreativeLimits::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.pause.max_parallel_accounts = 0;
        assert!(config.validate().is_err());

        config.pause.max_parallel_accounts = 2;
        config.creative.min_headlines = 20;
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("creative"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ADLAUNCH_DB_PATH", ":memory:"),
            ("ADLAUNCH_MAX_PARALLEL_ACCOUNTS", "8"),
            ("ADLAUNCH_HEADLINE_LIMIT", "10"),
            ("ADLAUNCH_DB_MAX_CONNECTIONS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = EngineConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from(":memory:"));
        assert_eq!(config.max_parallel_accounts(), 8);
        assert_eq!(config.creative.max_headlines, 10);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.db_config().is_in_memory());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [pause]
            max_parallel_accounts = 2

            [creative]
            headline_max_chars = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.max_parallel_accounts(), 2);
        assert_eq!(config.creative.headline_max_chars, 25);
        assert_eq!(config.creative.max_headlines, 15);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engine.toml");

        let mut config = EngineConfig::default();
        config.database.path = dir.path().join("adlaunch.db");
        config.pause.max_parallel_accounts = 3;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[pause]"));
        assert!(contents.contains("[creative]"));

        let loaded: EngineConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.pause.max_parallel_accounts, 3);
        assert_eq!(loaded.database.path, config.database.path);
    }
}
