use serde::{Deserialize, Serialize};

use crate::serde_helpers::null_as_default;

/// One installed version of an item, as reported by the local package manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstalledInstance {
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub used_options: Vec<String>,
    pub built_as_bottle: bool,
    /// Whether a prebuilt bottle was used instead of building from source.
    pub poured_from_bottle: bool,
    /// Seconds since the Unix epoch.
    #[serde(rename = "time")]
    pub installed_at: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub runtime_dependencies: Vec<RuntimeDependency>,
    pub installed_as_dependency: bool,
    pub installed_on_request: bool,
}

/// Dependency that was resolved when an instance was installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeDependency {
    pub full_name: String,
    pub version: String,
    pub revision: u32,
    pub pkg_version: String,
    pub declared_directly: bool,
}
