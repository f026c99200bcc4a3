//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use relmap::{RelmapError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for RelmapError {
    fn from(err: ConfigError) -> Self {
        RelmapError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (relmap/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or holds invalid values
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, RelmapError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("relmap/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "relmap", "relmap") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, RelmapError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .layout()
        .validate()
        .map_err(ConfigError::Validation)?;
    config
        .style()
        .color_map()
        .map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_explicit_file() {
        let file = config_file(
            r#"
[layout]
k = 3.0
random_seed = 7

[style]
title = "Threat Actors"

[style.color_map]
Group = "teal"

[data]
strict = true
"#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout().k(), 3.0);
        assert_eq!(config.layout().random_seed(), 7);
        assert_eq!(config.layout().iterations(), 1000);
        assert_eq!(config.style().title(), "Threat Actors");
        assert!(config.data().strict());

        let colors = config.style().color_map().unwrap();
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = load_config(Some("definitely/not/here.toml"));
        match result {
            Err(RelmapError::Config(message)) => {
                assert!(message.contains("Missing configuration file"));
            }
            other => panic!("Expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_toml() {
        let file = config_file("[layout\nk = ");
        let result = load_config(Some(file.path()));
        assert!(matches!(result, Err(RelmapError::Config(m)) if m.starts_with("Failed to parse")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = config_file("[layout]\nk = -2.0\n");
        let result = load_config(Some(file.path()));
        assert!(matches!(result, Err(RelmapError::Config(m)) if m.starts_with("Validation error")));

        let file = config_file("[style.color_map]\nGroup = \"not-a-color\"\n");
        let result = load_config(Some(file.path()));
        assert!(matches!(result, Err(RelmapError::Config(m)) if m.starts_with("Validation error")));
    }
}
