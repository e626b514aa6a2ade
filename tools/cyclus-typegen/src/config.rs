// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator configuration.
//!
//! Supports both file-based (YAML) and command-line configuration; flags
//! given on the command line override file values.

use cyclus_typesystem::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypegenConfig {
    /// Path of the `dbtypes.json` type table.
    #[serde(default = "default_dbtypes_json")]
    pub dbtypes_json: PathBuf,

    /// Target version; the newest version in the table when unset.
    #[serde(default)]
    pub cyclus_version: Option<String>,

    /// Namespace of the native enum header.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_dbtypes_json() -> PathBuf {
    PathBuf::from("dbtypes.json")
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TypegenConfig {
    fn default() -> Self {
        Self {
            dbtypes_json: default_dbtypes_json(),
            cyclus_version: None,
            namespace: default_namespace(),
            log_level: default_log_level(),
        }
    }
}

impl TypegenConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dbtypes_json.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("Empty dbtypes_json path".into()));
        }

        if !is_identifier(&self.namespace) {
            return Err(ConfigError::Invalid(format!(
                "Namespace {:?} is not an identifier",
                self.namespace
            )));
        }

        if let Some(version) = &self.cyclus_version {
            if version.trim().is_empty() {
                return Err(ConfigError::Invalid("Empty cyclus_version".into()));
            }
        }

        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: TypegenConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, TypegenConfig::default());
        assert_eq!(config.namespace, "cpp_typesystem");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "dbtypes_json: share/dbtypes.json\ncyclus_version: \"1.5.3\"\nnamespace: cts\nlog_level: debug"
        )
        .unwrap();

        let config = TypegenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.dbtypes_json, PathBuf::from("share/dbtypes.json"));
        assert_eq!(config.cyclus_version.as_deref(), Some("1.5.3"));
        assert_eq!(config.namespace, "cts");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_invalid_namespace() {
        let config = TypegenConfig {
            namespace: "cpp-typesystem".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "namespace: [unclosed").unwrap();
        assert!(matches!(
            TypegenConfig::from_file(file.path()),
            Err(ConfigError::Yaml(_))
        ));
    }
}
