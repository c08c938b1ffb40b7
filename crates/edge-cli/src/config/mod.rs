pub mod profile;

use serde::{Deserialize, Serialize};
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;

pub use profile::{Profile, Profiles};

pub const CONFIG_VERSION: u32 = 1;
pub const CONFIG_ENV: &str = "EDGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to determine the config directory. Set EDGE_CONFIG to a file path.")]
    NoConfigDir,
    #[error("Error reading config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Error parsing config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Error serializing config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Error writing config file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

impl crate::CmdOutput for ConfigError {
    fn code(&self) -> String {
        match self {
            ConfigError::NoConfigDir => "config/no-config-dir",
            ConfigError::Read { .. } => "config/read-error",
            ConfigError::Parse { .. } => "config/parse-error",
            ConfigError::Serialize(_) => "config/serialize-error",
            ConfigError::Write { .. } => "config/write-error",
        }
        .to_string()
    }

    fn exitcode(&self) -> crate::errors::ExitCode {
        match self {
            ConfigError::NoConfigDir | ConfigError::Parse { .. } => crate::errors::CONFIG,
            ConfigError::Read { .. } => crate::errors::IOERR,
            ConfigError::Serialize(_) => crate::errors::SOFTWARE,
            ConfigError::Write { .. } => crate::errors::CANTCREAT,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// The persisted CLI configuration. Plain values are declared before tables
/// so the TOML serializer can emit them.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub config_version: u32,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub profiles: Profiles,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            profiles: Profiles::new(),
        }
    }
}

/// `$EDGE_CONFIG` if set, otherwise `edge/config.toml` under the platform
/// config directory.
pub fn config_path(env_override: Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("edge").join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: display,
                    source,
                })
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Replaces the file at `path` in one rename so a failed write never
    /// leaves a truncated config behind.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let mut file = NamedTempFile::new_in(&dir).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;
        file.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
