use std::{env, path::PathBuf, str::FromStr, time::Duration};

use serde::{de, Deserialize, Deserializer};

pub fn default_api_base() -> String {
    "https://formulae.brew.sh/api/".to_string()
}

pub fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

pub fn default_refresh_timeout() -> Duration {
    Duration::from_secs(30)
}

pub fn default_local_state_timeout() -> Duration {
    Duration::from_secs(30)
}

pub fn default_cache_ttl() -> Duration {
    Duration::from_secs(60 * 60)
}

pub fn default_catalog_max_age() -> Duration {
    Duration::from_secs(60 * 60)
}

pub fn default_progress_buffer() -> usize {
    100
}

/// Read a whole number of seconds.
pub fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    u64::from_str(s.trim()).map(Duration::from_secs).map_err(de::Error::custom)
}

/// Channel capacities must be at least 1.
pub fn deserialize_capacity<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match usize::from_str(s.trim()).map_err(de::Error::custom)? {
        0 => Err(de::Error::custom("capacity must be greater than zero")),
        capacity => Ok(capacity),
    }
}

/// Relative paths are resolved against the current directory.
pub fn deserialize_optional_pathbuf<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.trim().is_empty() {
        return Ok(None);
    }

    let path = PathBuf::from_str(s.trim()).map_err(de::Error::custom)?;
    if path.is_absolute() {
        return Ok(Some(path));
    }

    Ok(Some(env::current_dir().map_err(de::Error::custom)?.join(path)))
}

/// This deserializer adds a trailing "/" if not exist so that endpoints can be joined by
/// plain concatenation.
pub fn deserialize_api_base<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;

    if s.ends_with('/') {
        return Ok(s);
    }

    Ok(format!("{s}/"))
}
