use serde::{Deserialize, Serialize};
use tapster_network::{FetchError, HttpClient};

use crate::{serde_helpers::null_as_default, ItemKind};

/// Entry of the bulk package list (`formula.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
}

/// Entry of the bulk cask list (`cask.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaskSummary {
    pub token: String,
    /// Human readable names, e.g. `["GitHub Desktop"]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub desc: String,
}

impl PackageSummary {
    pub async fn fetch_list(
        http_client: &HttpClient,
        api_base: &str,
    ) -> Result<Vec<Self>, FetchError> {
        http_client.get_json(&ItemKind::Package.list_url(api_base)).await
    }
}

impl CaskSummary {
    pub async fn fetch_list(
        http_client: &HttpClient,
        api_base: &str,
    ) -> Result<Vec<Self>, FetchError> {
        http_client.get_json(&ItemKind::Cask.list_url(api_base)).await
    }
}
