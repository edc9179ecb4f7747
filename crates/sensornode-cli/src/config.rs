//! Configuration file management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sensornode_store::{StorageConfig, ValidationError};

use crate::cli::StorageArgs;

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it is missing.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_or_default(default_config_path())
    }

    /// Load configuration from `path`, or defaults if it is missing.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml()?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, args: &StorageArgs) -> Self {
        if let Some(backend) = args.backend {
            self.storage.backend = backend;
        }
        if let Some(path) = &args.path {
            self.storage.path = path.clone();
        }
        if let Some(namespace) = &args.namespace {
            self.storage.namespace = namespace.clone();
        }
        self
    }

    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = self.storage.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sensornode")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensornode_store::{Backend, DEFAULT_NAMESPACE, default_data_dir};

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.storage.backend, Backend::Ring);
        assert_eq!(config.storage.path, default_data_dir());
        assert_eq!(config.storage.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            storage: StorageConfig {
                backend: Backend::Relational,
                path: PathBuf::from("/tmp/node"),
                namespace: "bench".to_string(),
            },
        };

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_partial_toml() {
        let toml = r#"
            [storage]
            backend = "relational"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.backend, Backend::Relational);
        assert_eq!(config.storage.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_config_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_or_default_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_unknown_backend_rejected() {
        let result: Result<Config, _> = toml::from_str("[storage]\nbackend = \"flash\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let args = StorageArgs {
            backend: Some(Backend::Relational),
            path: None,
            namespace: Some("lab".to_string()),
        };
        let config = Config::default().with_overrides(&args);
        assert_eq!(config.storage.backend, Backend::Relational);
        assert_eq!(config.storage.path, default_data_dir());
        assert_eq!(config.storage.namespace, "lab");
    }

    #[test]
    fn test_validation_collects_errors() {
        let config = Config {
            storage: StorageConfig {
                path: PathBuf::new(),
                namespace: String::new(),
                ..Default::default()
            },
        };
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                let display = ConfigError::Validation(errors).to_string();
                assert!(display.contains("storage.path"));
                assert!(display.contains("storage.namespace"));
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("sensornode/config.toml"));
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Read {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let display = error.to_string();
        assert!(display.contains("/test/path"));
        assert!(display.contains("not found"));
    }
}
