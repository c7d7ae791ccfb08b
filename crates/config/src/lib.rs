mod custom_deserializer;

use pipe_trait::Pipe;
use serde::Deserialize;
use std::{fs, io, path::PathBuf, time::Duration};

use crate::custom_deserializer::{
    default_api_base, default_cache_ttl, default_catalog_max_age, default_local_state_timeout,
    default_progress_buffer, default_refresh_timeout, default_request_timeout,
    deserialize_api_base, deserialize_capacity, deserialize_optional_pathbuf, deserialize_seconds,
};

/// Name of the configuration file looked up in the current directory and then in the home
/// directory.
pub const CONFIG_FILE_NAME: &str = ".tapsterrc";

/// Configuration read from `.tapsterrc`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Base URL of the catalog JSON API (trailing slash included).
    #[serde(default = "default_api_base", deserialize_with = "deserialize_api_base")]
    pub api_base: String,

    /// Location of the `brew` executable. When unset, `brew` is looked up in `PATH`.
    #[serde(default, deserialize_with = "deserialize_optional_pathbuf")]
    pub brew_path: Option<PathBuf>,

    /// Timeout of a single HTTP request, in seconds.
    #[serde(default = "default_request_timeout", deserialize_with = "deserialize_seconds")]
    pub request_timeout: Duration,

    /// Timeout of each of the two list downloads of a catalog refresh, in seconds.
    #[serde(default = "default_refresh_timeout", deserialize_with = "deserialize_seconds")]
    pub refresh_timeout: Duration,

    /// Timeout of a `brew info` call used to read the local installation state, in seconds.
    #[serde(default = "default_local_state_timeout", deserialize_with = "deserialize_seconds")]
    pub local_state_timeout: Duration,

    /// How long a fetched item stays in the in-memory cache, in seconds.
    ///
    /// Default value is 3600 (1 hour).
    #[serde(default = "default_cache_ttl", deserialize_with = "deserialize_seconds")]
    pub cache_ttl: Duration,

    /// Age after which the bulk package and cask lists are downloaded again, in seconds.
    ///
    /// Default value is 3600 (1 hour).
    #[serde(default = "default_catalog_max_age", deserialize_with = "deserialize_seconds")]
    pub catalog_max_age: Duration,

    /// Capacity of the channel that carries installation progress events.
    #[serde(default = "default_progress_buffer", deserialize_with = "deserialize_capacity")]
    pub progress_buffer: usize,
}

impl Config {
    pub fn new() -> Self {
        Config {
            api_base: default_api_base(),
            brew_path: None,
            request_timeout: default_request_timeout(),
            refresh_timeout: default_refresh_timeout(),
            local_state_timeout: default_local_state_timeout(),
            cache_ttl: default_cache_ttl(),
            catalog_max_age: default_catalog_max_age(),
            progress_buffer: default_progress_buffer(),
        }
    }

    /// Parse the content of a `.tapsterrc` file.
    pub fn parse(content: &str) -> Result<Self, serde_ini::de::Error> {
        serde_ini::from_str(content)
    }

    /// Load the configuration that applies to the current process.
    ///
    /// `.tapsterrc` in the current directory wins over the one in the home directory.
    /// A file that cannot be read or parsed is skipped.
    pub fn current<CurrentDir, HomeDir, Error>(current_dir: CurrentDir, home_dir: HomeDir) -> Self
    where
        CurrentDir: FnOnce() -> Result<PathBuf, Error>,
        HomeDir: FnOnce() -> Option<PathBuf>,
    {
        let load = |dir: PathBuf| -> Option<Config> {
            let path = dir.join(CONFIG_FILE_NAME);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(error) if error.kind() == io::ErrorKind::NotFound => return None,
                Err(error) => {
                    tracing::warn!(target: "tapster::config", ?path, %error, "Failed to read");
                    return None;
                }
            };
            match Config::parse(&content) {
                Ok(config) => Some(config),
                Err(error) => {
                    tracing::warn!(target: "tapster::config", ?path, %error, "Failed to parse");
                    None
                }
            }
        };

        current_dir()
            .ok()
            .and_then(load)
            .or_else(|| home_dir().and_then(load))
            .unwrap_or_default()
    }

    /// Persist the config data until the program terminates.
    pub fn leak(self) -> &'static mut Self {
        self.pipe(Box::new).pipe(Box::leak)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
