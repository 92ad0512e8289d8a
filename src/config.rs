use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::ControlError;

pub const DEFAULT_SERVER: &str = "http://localhost:26538";
pub const DEFAULT_API: &str = "/api/v1";
pub const DEFAULT_USER: &str = "youtube-music-control";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: Option<String>,
    pub api: Option<String>,
    pub user: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Reads `explicit` when given, otherwise the default config file if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ControlError> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Config::default()),
            },
        };

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            ControlError::Config(format!("failed to read {}: {}", config_path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            ControlError::Config(format!("failed to parse {}: {}", config_path.display(), e))
        })
    }
}

/// `$XDG_CONFIG_HOME/youtube-music-control/config.toml`, falling back to `~/.config`.
fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("youtube-music-control").join("config.toml"))
}

/// Connection settings after layering flags and environment over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server: String,
    pub api: String,
    pub user: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: Config) -> Self {
        let server = cli
            .server
            .clone()
            .or(config.server)
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        let api = cli
            .api
            .clone()
            .or(config.api)
            .unwrap_or_else(|| DEFAULT_API.to_string());
        let user = cli
            .user
            .clone()
            .or(config.user)
            .unwrap_or_else(|| DEFAULT_USER.to_string());

        Settings {
            server: server.trim_end_matches('/').to_string(),
            api: api.trim_end_matches('/').to_string(),
            user,
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}
