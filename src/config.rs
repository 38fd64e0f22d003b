//! Server configuration: TOML file, then environment overrides.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Environment variable prefix for overrides, e.g. `MINING_GAME_PORT`.
pub const ENV_PREFIX: &str = "MINING_GAME_";

/// Settings needed to start the server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Host to bind to.
    host: String,

    /// Port to bind to.
    port: u16,

    /// Path of the store file.
    db_path: String,

    /// Path of the shop catalog (JSON or TOML).
    catalog_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3288,
            db_path: "mining_game.db".to_string(),
            catalog_path: PathBuf::from("shop.json"),
        }
    }
}

impl GameConfig {
    /// Parses configuration from TOML text. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid TOML for this shape.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given and present, otherwise the defaults, then
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicitly named file is missing or
    /// invalid, or an override does not parse.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                debug!("No config file, using defaults");
                Self::default()
            }
        };
        config.with_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Applies overrides looked up by key (`HOST`, `PORT`, `DB_PATH`,
    /// `CATALOG_PATH`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `PORT` is not a valid port number.
    #[instrument(skip(self, lookup))]
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid port '{}': {}", port, e)))?;
        }
        if let Some(db_path) = lookup("DB_PATH") {
            self.db_path = db_path;
        }
        if let Some(catalog_path) = lookup("CATALOG_PATH") {
            self.catalog_path = PathBuf::from(catalog_path);
        }
        Ok(self)
    }

    /// Sets the bind host.
    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// Sets the bind port.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Sets the store path.
    pub fn set_db_path(&mut self, db_path: impl Into<String>) {
        self.db_path = db_path.into();
    }

    /// Sets the catalog path.
    pub fn set_catalog_path(&mut self, catalog_path: impl Into<PathBuf>) {
        self.catalog_path = catalog_path.into();
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
