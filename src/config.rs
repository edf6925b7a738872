//! Configuration file parser for ~/.config/podshelf/config.toml.
//!
//! The config file is optional: a missing or empty file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning, since they are
//! usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the SQLite database. `None` means `podcasts.db` in the config directory.
    pub database: Option<PathBuf>,

    /// Whether to clear the terminal before printing the banner.
    pub clear_screen: bool,

    /// Maximum display width of podcast names when listing.
    pub name_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            clear_screen: true,
            name_width: 60,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 3] = ["database", "clear_screen", "name_width"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.iter().any(|known| known == key) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Database path to use: an explicit override wins over the config file,
    /// which wins over `podcasts.db` in the directory `default_dir` returns.
    ///
    /// `default_dir` is only called when neither path is set.
    pub fn database_path<E>(
        &self,
        override_path: Option<&Path>,
        default_dir: impl FnOnce() -> Result<PathBuf, E>,
    ) -> Result<PathBuf, E> {
        match override_path.map(Path::to_path_buf).or_else(|| self.database.clone()) {
            Some(path) => Ok(path),
            None => Ok(default_dir()?.join("podcasts.db")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(test_name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("podshelf_config_test_{}", test_name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database.is_none());
        assert!(config.clear_screen);
        assert_eq!(config.name_width, 60);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/podshelf_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert!(config.clear_screen);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.name_width, 60);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let (dir, path) = write_config(
            "full",
            r#"
database = "/var/lib/podshelf/podcasts.db"
clear_screen = false
name_width = 40
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.database.as_deref(),
            Some(Path::new("/var/lib/podshelf/podcasts.db"))
        );
        assert!(!config.clear_screen);
        assert_eq!(config.name_width, 40);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "clear_screen = false\n");
        let config = Config::load(&path).unwrap();
        assert!(!config.clear_screen);
        assert!(config.database.is_none());
        assert_eq!(config.name_width, 60);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "name_width = 30\nvolume = 11\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.name_width, 30);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "name_width = \"wide\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"#".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_database_path_precedence() {
        let config_dir = || Ok::<_, ConfigError>(PathBuf::from("/home/user/.config/podshelf"));
        let mut config = Config::default();

        assert_eq!(
            config.database_path(None, config_dir).unwrap(),
            PathBuf::from("/home/user/.config/podshelf/podcasts.db")
        );

        config.database = Some(PathBuf::from("/data/from_config.db"));
        assert_eq!(
            config.database_path(None, config_dir).unwrap(),
            PathBuf::from("/data/from_config.db")
        );
        assert_eq!(
            config
                .database_path(Some(Path::new("/data/from_flag.db")), config_dir)
                .unwrap(),
            PathBuf::from("/data/from_flag.db")
        );
    }

    #[test]
    fn test_database_path_skips_default_dir_when_set() {
        let unavailable = || -> Result<PathBuf, &'static str> { Err("HOME not set") };

        let config = Config::default();
        assert_eq!(
            config
                .database_path(Some(Path::new("/data/flag.db")), unavailable)
                .unwrap(),
            PathBuf::from("/data/flag.db")
        );
        assert_eq!(config.database_path(None, unavailable), Err("HOME not set"));

        let config = Config {
            database: Some(PathBuf::from("/data/config.db")),
            ..Config::default()
        };
        assert_eq!(
            config.database_path(None, unavailable).unwrap(),
            PathBuf::from("/data/config.db")
        );
    }
}
