use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the configured storage directory.
pub const STORAGE_ENV_VAR: &str = "DOCOPS_STORAGE_DIR";

/// Storage directory used when neither the CLI, the environment nor the
/// config file names one.
pub const DEFAULT_STORAGE_DIR: &str = "storage";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding current revisions, outlines and version snapshots
    pub storage_path: PathBuf,
    /// Title heading placed at the top of redline documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redline_title: Option<String>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded storage path
        config.storage_path =
            Self::expand_path(&config.storage_path).unwrap_or(config.storage_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/docops");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

/// Pick the storage directory: CLI flag, then `DOCOPS_STORAGE_DIR`, then the
/// config file, then `./storage`.
pub fn resolve_storage_path(cli_override: Option<PathBuf>, config: Option<&Config>) -> PathBuf {
    let from_env = std::env::var(STORAGE_ENV_VAR).ok();
    resolve_storage_path_with(cli_override, from_env, config)
}

fn resolve_storage_path_with(
    cli_override: Option<PathBuf>,
    from_env: Option<String>,
    config: Option<&Config>,
) -> PathBuf {
    if let Some(path) = cli_override {
        return Config::expand_path(&path).unwrap_or(path);
    }
    if let Some(value) = from_env.filter(|v| !v.trim().is_empty()) {
        let path = PathBuf::from(value);
        return Config::expand_path(&path).unwrap_or(path);
    }
    match config {
        Some(config) => config.storage_path.clone(),
        None => PathBuf::from(DEFAULT_STORAGE_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/docops/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            storage_path: PathBuf::from("/tmp/docops-storage"),
            redline_title: Some("Changes".to_string()),
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original.storage_path, deserialized.storage_path);
        assert_eq!(original.redline_title, deserialized.redline_title);
    }

    #[test]
    fn test_redline_title_is_optional() {
        let config: Config = toml::from_str(r#"storage_path = "/srv/docops""#).unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/srv/docops"));
        assert!(config.redline_title.is_none());
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/docops/storage");
        let expanded = Config::expand_path(&path).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("docops/storage"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("DOCOPS_TEST_ROOT", "/test/env/path");
        }

        let path = PathBuf::from("$DOCOPS_TEST_ROOT/subdir");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("DOCOPS_TEST_ROOT");
        }
    }

    #[test]
    fn test_expand_path_with_relative_path() {
        let path = PathBuf::from("relative/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "storage_path = [unterminated").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            storage_path: PathBuf::from("/tmp/docops-storage"),
            redline_title: None,
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config.storage_path, test_config.storage_path);
    }

    #[test]
    fn test_cli_override_wins() {
        let config = Config {
            storage_path: PathBuf::from("/from/config"),
            redline_title: None,
        };

        let resolved = resolve_storage_path_with(
            Some(PathBuf::from("/from/cli")),
            Some("/from/env".to_string()),
            Some(&config),
        );

        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_env_beats_config_file() {
        let config = Config {
            storage_path: PathBuf::from("/from/config"),
            redline_title: None,
        };

        let resolved =
            resolve_storage_path_with(None, Some("/from/env".to_string()), Some(&config));

        assert_eq!(resolved, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_blank_env_value_is_ignored() {
        let config = Config {
            storage_path: PathBuf::from("/from/config"),
            redline_title: None,
        };

        let resolved = resolve_storage_path_with(None, Some("  ".to_string()), Some(&config));

        assert_eq!(resolved, PathBuf::from("/from/config"));
    }

    #[test]
    fn test_default_storage_dir() {
        let resolved = resolve_storage_path_with(None, None, None);
        assert_eq!(resolved, PathBuf::from(DEFAULT_STORAGE_DIR));
    }
}
