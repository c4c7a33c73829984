//! Configuration Loading
//!
//! Layered configuration for the session core: built-in defaults, an
//! optional TOML file under the platform config directory, and `SOLACE_*`
//! environment overrides applied last.
//!
//! The file is entirely optional; a missing file yields the defaults, and
//! only a present-but-unreadable (or unparseable) file is an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::controller::ControllerConfig;
use crate::responder::DEFAULT_ENDPOINT;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("failed to read config file {path:?}")]
    Io {
        /// Path that failed to read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be parsed as TOML
    #[error("failed to parse config file {path:?}")]
    Parse {
        /// Path that failed to parse
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk configuration file shape
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SolaceToml {
    /// `[responder]` section
    #[serde(default)]
    pub responder: ResponderSection,
    /// `[controller]` section
    #[serde(default)]
    pub controller: ControllerSection,
}

/// `[responder]` section of the config file
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResponderSection {
    /// Chat endpoint URL
    pub endpoint: Option<String>,
}

/// `[controller]` section of the config file
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ControllerSection {
    /// Opening bot message (empty string disables it)
    pub welcome_message: Option<String>,
    /// Delay before the carryover auto-send, in milliseconds
    pub carryover_delay_ms: Option<u64>,
    /// Delay before the crisis follow-up, in milliseconds
    pub crisis_followup_delay_ms: Option<u64>,
    /// Scroll settle delay, in milliseconds
    pub scroll_settle_delay_ms: Option<u64>,
    /// Maximum input surface height
    pub max_input_height: Option<u32>,
}

/// Where the loaded configuration came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults (no config file present)
    Defaults,
    /// Loaded from a config file
    File(PathBuf),
}

/// Fully resolved configuration
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    /// Controller configuration
    pub controller: ControllerConfig,
    /// Responder endpoint URL
    pub endpoint: String,
    /// Provenance of the file layer
    pub source: ConfigSource,
}

/// Environment overrides, applied over whatever the file layer produced
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// `SOLACE_CHAT_ENDPOINT`
    pub endpoint: Option<String>,
    /// `SOLACE_WELCOME_MESSAGE` (empty string disables the welcome)
    pub welcome_message: Option<String>,
    /// `SOLACE_CARRYOVER_DELAY_MS`
    pub carryover_delay_ms: Option<u64>,
    /// `SOLACE_CRISIS_FOLLOWUP_DELAY_MS`
    pub crisis_followup_delay_ms: Option<u64>,
    /// `SOLACE_SCROLL_SETTLE_DELAY_MS`
    pub scroll_settle_delay_ms: Option<u64>,
    /// `SOLACE_MAX_INPUT_HEIGHT`
    pub max_input_height: Option<u32>,
}

impl ConfigOverrides {
    /// Read overrides from the environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("SOLACE_CHAT_ENDPOINT").ok(),
            welcome_message: std::env::var("SOLACE_WELCOME_MESSAGE").ok(),
            carryover_delay_ms: env_parse("SOLACE_CARRYOVER_DELAY_MS"),
            crisis_followup_delay_ms: env_parse("SOLACE_CRISIS_FOLLOWUP_DELAY_MS"),
            scroll_settle_delay_ms: env_parse("SOLACE_SCROLL_SETTLE_DELAY_MS"),
            max_input_height: env_parse("SOLACE_MAX_INPUT_HEIGHT"),
        }
    }

    /// Apply these overrides to a loaded configuration
    pub fn apply(&self, config: &mut LoadedConfig) {
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ref welcome) = self.welcome_message {
            config.controller.welcome_message = if welcome.is_empty() {
                None
            } else {
                Some(welcome.clone())
            };
        }
        if let Some(ms) = self.carryover_delay_ms {
            config.controller.carryover_delay = std::time::Duration::from_millis(ms);
        }
        if let Some(ms) = self.crisis_followup_delay_ms {
            config.controller.crisis_followup_delay = std::time::Duration::from_millis(ms);
        }
        if let Some(ms) = self.scroll_settle_delay_ms {
            config.controller.scroll_settle_delay = std::time::Duration::from_millis(ms);
        }
        if let Some(height) = self.max_input_height {
            config.controller.max_input_height = height;
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.parse().ok())
}

/// Default config file location under the platform config directory
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("solace").join("solace.toml"))
}

/// Load configuration from the default location
///
/// A missing file is not an error; defaults plus environment overrides
/// apply.
pub fn load_config() -> Result<LoadedConfig, ConfigError> {
    match default_config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => {
            let mut config = LoadedConfig {
                controller: ControllerConfig::default(),
                endpoint: DEFAULT_ENDPOINT.to_string(),
                source: ConfigSource::Defaults,
            };
            ConfigOverrides::from_env().apply(&mut config);
            Ok(config)
        }
    }
}

/// Load configuration from a specific file, then apply environment overrides
pub fn load_config_from_path(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: SolaceToml = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut controller = ControllerConfig::default();
    if let Some(welcome) = file.controller.welcome_message {
        controller.welcome_message = if welcome.is_empty() {
            None
        } else {
            Some(welcome)
        };
    }
    if let Some(ms) = file.controller.carryover_delay_ms {
        controller.carryover_delay = std::time::Duration::from_millis(ms);
    }
    if let Some(ms) = file.controller.crisis_followup_delay_ms {
        controller.crisis_followup_delay = std::time::Duration::from_millis(ms);
    }
    if let Some(ms) = file.controller.scroll_settle_delay_ms {
        controller.scroll_settle_delay = std::time::Duration::from_millis(ms);
    }
    if let Some(height) = file.controller.max_input_height {
        controller.max_input_height = height;
    }

    let mut config = LoadedConfig {
        controller,
        endpoint: file
            .responder
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        source: ConfigSource::File(path.to_path_buf()),
    };
    ConfigOverrides::from_env().apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_load_from_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[responder]
endpoint = "http://chat.internal:8080/api/chat"

[controller]
welcome_message = "Welcome back"
carryover_delay_ms = 500
crisis_followup_delay_ms = 1500
max_input_height = 200
"#
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://chat.internal:8080/api/chat");
        assert_eq!(
            config.controller.welcome_message.as_deref(),
            Some("Welcome back")
        );
        assert_eq!(config.controller.carryover_delay, Duration::from_millis(500));
        assert_eq!(
            config.controller.crisis_followup_delay,
            Duration::from_millis(1500)
        );
        assert_eq!(config.controller.max_input_height, 200);
        assert_eq!(config.source, ConfigSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[controller]").unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(
            config.controller.carryover_delay,
            ControllerConfig::default().carryover_delay
        );
    }

    #[test]
    fn test_empty_welcome_disables_it() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[controller]\nwelcome_message = \"\"").unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert!(config.controller.welcome_message.is_none());
    }

    #[test]
    fn test_unparseable_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not toml {{").unwrap();

        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = LoadedConfig {
            controller: ControllerConfig::default(),
            endpoint: "http://file.example/api/chat".to_string(),
            source: ConfigSource::Defaults,
        };
        let overrides = ConfigOverrides {
            endpoint: Some("http://env.example/api/chat".to_string()),
            crisis_followup_delay_ms: Some(250),
            ..Default::default()
        };

        overrides.apply(&mut config);
        assert_eq!(config.endpoint, "http://env.example/api/chat");
        assert_eq!(
            config.controller.crisis_followup_delay,
            Duration::from_millis(250)
        );
    }
}
