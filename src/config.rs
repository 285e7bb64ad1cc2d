//! Configuration resolution
//!
//! Settings come from command-line flags and environment variables (both
//! handled by the CLI and passed in as [`ConfigOverrides`]) and from an
//! optional TOML config file. Overrides win over the file; built-in defaults
//! fill whatever is left.

use crate::scanner::{DEFAULT_TV_SECTION, DEFAULT_WORKERS};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default name of the library section holding movies
pub const DEFAULT_MOVIE_SECTION: &str = "Movies";

/// Default per-request HTTP timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CONFIG_FILENAME: &str = "config.toml";

/// Errors that can occur while resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not provided anywhere
    #[error("{env} is required. Set the {env} environment variable or `{key}` in the config file{hint}")]
    Missing {
        env: &'static str,
        key: &'static str,
        hint: &'static str,
    },

    /// Failed to determine the config directory location
    #[error("Failed to determine config directory location")]
    ConfigDirectoryNotFound,

    /// Failed to read the config file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unexpected fields
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Contents of the TOML config file
///
/// Every field is optional; anything left out falls back to overrides or
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub plex_url: Option<String>,
    pub plex_token: Option<String>,
    pub tvdb_api_key: Option<String>,
    pub tvdb_pin: Option<String>,
    pub tv_section: Option<String>,
    pub movie_section: Option<String>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Location of the default config file
    ///
    /// `~/.config/episode-auditor/config.toml` on Linux, the platform
    /// equivalent elsewhere.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs = directories::ProjectDirs::from("", "", "episode-auditor")
            .ok_or(ConfigError::ConfigDirectoryNotFound)?;
        Ok(proj_dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// Loads the config file at `path`; the file must exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Loads the default config file, or an empty config if there is none
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = match Self::default_path() {
            Ok(path) => path,
            // No home directory: environment variables are all we have
            Err(ConfigError::ConfigDirectoryNotFound) => return Ok(Self::default()),
            Err(e) => return Err(e),
        };

        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

/// Settings given on the command line or through environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub plex_url: Option<String>,
    pub plex_token: Option<String>,
    pub tvdb_api_key: Option<String>,
    pub tvdb_pin: Option<String>,
    pub tv_section: Option<String>,
    pub movie_section: Option<String>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Connection details for the local library server
#[derive(Clone, PartialEq, Eq)]
pub struct LibrarySettings {
    pub url: String,
    pub token: String,
}

/// Credentials for the remote catalog
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub api_key: String,
    /// Subscriber PIN, required by some API keys
    pub pin: Option<String>,
}

// Credentials stay out of debug output
impl std::fmt::Debug for LibrarySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibrarySettings")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for CatalogSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSettings")
            .field("api_key", &"<redacted>")
            .field("pin", &self.pin.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub library: LibrarySettings,
    /// Absent when no API key was configured; only the missing-episode
    /// audit needs it
    pub catalog: Option<CatalogSettings>,
    pub tv_section: String,
    pub movie_section: String,
    pub workers: usize,
    pub timeout: Duration,
}

/// Picks the first non-blank value
fn pick(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .into_iter()
        .chain(fallback)
        .find(|value| !value.trim().is_empty())
}

impl Settings {
    /// Merges overrides with the config file and applies defaults
    ///
    /// Blank values count as absent. Fails if the library URL or token is
    /// missing; a missing catalog key is only reported by
    /// [`Settings::catalog`].
    pub fn resolve(overrides: ConfigOverrides, file: ConfigFile) -> Result<Self, ConfigError> {
        let url = pick(overrides.plex_url, file.plex_url).ok_or(ConfigError::Missing {
            env: "PLEX_URL",
            key: "plex_url",
            hint: "",
        })?;
        let token = pick(overrides.plex_token, file.plex_token).ok_or(ConfigError::Missing {
            env: "PLEX_TOKEN",
            key: "plex_token",
            hint: "",
        })?;

        let catalog =
            pick(overrides.tvdb_api_key, file.tvdb_api_key).map(|api_key| CatalogSettings {
                api_key,
                pin: pick(overrides.tvdb_pin, file.tvdb_pin),
            });

        Ok(Self {
            library: LibrarySettings { url, token },
            catalog,
            tv_section: pick(overrides.tv_section, file.tv_section)
                .unwrap_or_else(|| DEFAULT_TV_SECTION.to_string()),
            movie_section: pick(overrides.movie_section, file.movie_section)
                .unwrap_or_else(|| DEFAULT_MOVIE_SECTION.to_string()),
            workers: overrides
                .workers
                .or(file.workers)
                .unwrap_or(DEFAULT_WORKERS)
                .max(1),
            timeout: overrides
                .timeout_secs
                .or(file.timeout_secs)
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    /// Catalog credentials, required for the missing-episode audit
    pub fn catalog(&self) -> Result<&CatalogSettings, ConfigError> {
        self.catalog.as_ref().ok_or(ConfigError::Missing {
            env: "TVDB_API_KEY",
            key: "tvdb_api_key",
            hint: ".\nGet your API key from https://thetvdb.com/dashboard/account/apikeys",
        })
    }
}
