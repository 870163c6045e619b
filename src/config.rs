//! Application configuration for the Haze Visuals bot.
//!
//! Settings come from an optional `config.toml` next to the binary, with
//! environment variables taking precedence over the file and built-in
//! defaults filling the rest. The Discord token is deliberately *not* part
//! of [`AppConfig`]; it is read from the environment directly before use.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_CLEANUP_INTERVAL_HOURS: u64 = 24;

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the JSON document store.
    pub data_dir: PathBuf,
    /// How often the cleanup worker wakes up, in hours.
    pub cleanup_interval_hours: u64,
}

/// Shape of the optional `config.toml` file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    cleanup_interval_hours: Option<u64>,
}

/// Loads the application configuration from `config.toml` (if present) and
/// the environment (`DATA_DIR`, `CLEANUP_INTERVAL_HOURS`).
pub fn load_app_configuration() -> Result<AppConfig> {
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

    let file_config = match std::fs::read_to_string(&config_path) {
        Ok(raw) => {
            info!(path = %config_path, "loaded configuration file");
            toml::from_str::<FileConfig>(&raw).map_err(|e| Error::Config {
                message: format!("failed to parse {config_path}: {e}"),
            })?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
        Err(e) => {
            return Err(Error::Config {
                message: format!("failed to read {config_path}: {e}"),
            });
        }
    };

    let data_dir = std::env::var("DATA_DIR").map_or_else(
        |_| {
            file_config
                .data_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
        },
        PathBuf::from,
    );

    let cleanup_interval_hours = match std::env::var("CLEANUP_INTERVAL_HOURS") {
        Ok(raw) => raw.parse().map_err(|e| Error::Config {
            message: format!("CLEANUP_INTERVAL_HOURS must be a positive integer: {e}"),
        })?,
        Err(_) => file_config
            .cleanup_interval_hours
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL_HOURS),
    };
    if cleanup_interval_hours == 0 {
        return Err(Error::Config {
            message: "cleanup_interval_hours must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        data_dir,
        cleanup_interval_hours,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_file_config_parses_partial_toml() {
        let parsed: FileConfig = toml::from_str("data_dir = \"/var/lib/haze\"").unwrap();
        assert_eq!(parsed.data_dir, Some(PathBuf::from("/var/lib/haze")));
        assert!(parsed.cleanup_interval_hours.is_none());
    }

    #[test]
    fn test_file_config_parses_empty_toml() {
        let parsed: FileConfig = toml::from_str("").unwrap();
        assert!(parsed.data_dir.is_none());
        assert!(parsed.cleanup_interval_hours.is_none());
    }
}
