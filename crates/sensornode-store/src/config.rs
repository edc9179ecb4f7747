//! Storage configuration shared by every front end.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ring::DEFAULT_NAMESPACE;

/// File name of the relational database inside the storage directory.
pub const DATABASE_FILE: &str = "measurements.db";

/// Longest namespace the key/value medium accepts.
pub const MAX_NAMESPACE_LEN: usize = 15;

/// Storage strategy, chosen once per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Fixed-capacity ring over a key/value medium.
    #[default]
    Ring,
    /// SQLite database.
    Relational,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Ring => write!(f, "ring"),
            Backend::Relational => write!(f, "relational"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ring" => Ok(Backend::Ring),
            "relational" | "sqlite" => Ok(Backend::Relational),
            _ => Err(format!(
                "unknown backend '{}': expected 'ring' or 'relational'",
                s
            )),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend to open.
    pub backend: Backend,
    /// Storage directory. The ring keeps one file per namespace here, the
    /// relational backend keeps [`DATABASE_FILE`].
    pub path: PathBuf,
    /// Ring namespace.
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_data_dir(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Location of the relational database.
    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE)
    }

    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "storage path cannot be empty".to_string(),
            });
        }

        if let Some(message) = namespace_problem(&self.namespace) {
            errors.push(ValidationError {
                field: "storage.namespace".to_string(),
                message,
            });
        }

        errors
    }
}

/// Why `namespace` cannot name a ring namespace, if it cannot.
pub(crate) fn namespace_problem(namespace: &str) -> Option<String> {
    if namespace.is_empty() {
        Some("namespace cannot be empty".to_string())
    } else if namespace.len() > MAX_NAMESPACE_LEN {
        Some(format!(
            "namespace '{}' is longer than {} characters",
            namespace, MAX_NAMESPACE_LEN
        ))
    } else if !namespace
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Some(format!(
            "namespace '{}' may only contain letters, digits, '_' and '-'",
            namespace
        ))
    } else {
        None
    }
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `storage.namespace`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Default storage directory following platform conventions.
///
/// - Linux: `~/.local/share/sensornode`
/// - macOS: `~/Library/Application Support/sensornode`
/// - Windows: `C:\Users\<user>\AppData\Local\sensornode`
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sensornode")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, Backend::Ring);
        assert_eq!(config.path, default_data_dir());
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_database_path() {
        let config = StorageConfig {
            path: PathBuf::from("/var/lib/node"),
            ..Default::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/node/measurements.db")
        );
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("ring".parse::<Backend>().unwrap(), Backend::Ring);
        assert_eq!("Relational".parse::<Backend>().unwrap(), Backend::Relational);
        assert_eq!("sqlite".parse::<Backend>().unwrap(), Backend::Relational);
        assert!("flash".parse::<Backend>().is_err());
    }

    #[test]
    fn test_backend_display_matches_serde() {
        for backend in [Backend::Ring, Backend::Relational] {
            let json = serde_json::to_string(&backend).unwrap();
            assert_eq!(json, format!("\"{}\"", backend));
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StorageConfig = serde_json::from_str(r#"{"backend":"relational"}"#).unwrap();
        assert_eq!(config.backend, Backend::Relational);
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_storage_path_validation() {
        let config = StorageConfig {
            path: PathBuf::new(),
            ..Default::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "storage.path");
    }

    #[test]
    fn test_namespace_validation() {
        let cases = [
            ("", "cannot be empty"),
            ("a_namespace_that_is_long", "longer than"),
            ("bad/name", "may only contain"),
        ];
        for (namespace, expected) in cases {
            let config = StorageConfig {
                namespace: namespace.to_string(),
                ..Default::default()
            };
            let errors = config.validate();
            assert_eq!(errors.len(), 1, "namespace {:?}", namespace);
            assert!(
                errors[0].message.contains(expected),
                "{}: {}",
                namespace,
                errors[0]
            );
        }
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            field: "storage.namespace".to_string(),
            message: "namespace cannot be empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "storage.namespace: namespace cannot be empty"
        );
    }
}
