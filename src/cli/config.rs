//! Council configuration file handling
//!
//! Configuration is TOML and only seeds a fresh engine: the initial controller
//! set, where snapshots live, and how to log. Once a snapshot exists the
//! controller set is whatever governance has made it; editing
//! `initial_controllers` afterwards has no effect on a running council.

use council::observability::LogFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config must list at least one initial controller")]
    NoControllers,

    #[error("initial_controllers[{index}] is blank")]
    BlankController { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilConfig {
    pub governance: GovernanceConfig,

    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Controllers of a fresh council, in registry order
    pub initial_controllers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// CBOR snapshot path; without one, `run` starts fresh and saves nothing
    /// unless `--snapshot` is given
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl CouncilConfig {
    pub fn new(initial_controllers: Vec<String>) -> Self {
        Self {
            governance: GovernanceConfig {
                initial_controllers,
            },
            state: StateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: CouncilConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        write_file(path, &contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let controllers = &self.governance.initial_controllers;
        if controllers.is_empty() {
            return Err(ConfigError::NoControllers);
        }
        if let Some(index) = controllers.iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::BlankController { index });
        }
        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(controllers: &[String], snapshot_path: &Path) -> String {
        let controllers = controllers
            .iter()
            .map(|c| format!("    \"{}\",", escape_basic_string(c)))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"# Council Configuration
#
# Only seeds a fresh council. After the first run the controller set lives
# in the snapshot and changes only through Add-Controller / Remove-Controller
# proposals.

[governance]
# Controllers of a fresh council, in registry order (at least one)
initial_controllers = [
{controllers}
]

[state]
# CBOR snapshot, loaded on start and written after every run
snapshot_path = "{snapshot_path}"

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
level = "info"

# Log format: pretty, compact, json
format = "pretty"
"#,
            snapshot_path = escape_basic_string(&snapshot_path.display().to_string())
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        controllers: &[String],
        snapshot_path: &Path,
    ) -> Result<(), ConfigError> {
        let contents = Self::generate_default_toml(controllers, snapshot_path);
        write_file(config_path, &contents)
    }
}

/// Escape a value for a TOML basic (double-quoted) string.
fn escape_basic_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let write_error = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
    }
    fs::write(path, contents).map_err(write_error)
}

/// Default config directory: `<config dir>/council`
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("council")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Snapshot stored next to the config file
pub fn default_snapshot_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .unwrap_or(config_path)
        .join("state.cbor")
}
