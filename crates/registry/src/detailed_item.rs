use pipe_trait::Pipe;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tapster_network::{FetchError, HttpClient};

use crate::{
    cask_document::CaskDocument, serde_helpers::null_as_default, InstalledInstance, ItemKind,
};

/// Full metadata of one catalog entry.
///
/// Package documents decode directly into this type. Cask documents have a different shape
/// and are converted on arrival.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedItem {
    /// Which endpoint this document came from.
    #[serde(skip)]
    pub kind: ItemKind,
    pub name: String,
    pub full_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tap: String,
    pub oldname: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub aliases: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub desc: String,
    pub license: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub homepage: String,
    pub versions: Versions,
    pub revision: u32,
    pub keg_only: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub build_dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub test_dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommended_dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub optional_dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub conflicts_with: Vec<String>,
    pub caveats: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub installed: Vec<InstalledInstance>,
    pub linked_keg: Option<String>,
    pub pinned: bool,
    pub outdated: bool,
    pub deprecated: bool,
    pub deprecation_reason: Option<String>,
    pub disabled: bool,
    pub disable_reason: Option<String>,
    pub service: Option<Service>,
}

/// Versions of a package known to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Versions {
    pub stable: Option<String>,
    pub head: Option<String>,
    /// Whether a prebuilt bottle exists for the stable version.
    pub bottle: bool,
}

/// Background service descriptor of a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub run_type: Option<String>,
    pub run_at_load: bool,
    /// Either a boolean or an object of conditions.
    pub keep_alive: Option<Value>,
    pub working_dir: Option<String>,
}

impl Service {
    /// Whether the service is kept alive. A condition object counts as enabled.
    pub fn keep_alive(&self) -> bool {
        match &self.keep_alive {
            None | Some(Value::Null) => false,
            Some(Value::Bool(value)) => *value,
            Some(_) => true,
        }
    }
}

impl DetailedItem {
    /// Fetch the detail document of `identifier` from the endpoint of `kind`.
    pub async fn fetch_from_registry(
        kind: ItemKind,
        identifier: &str,
        http_client: &HttpClient,
        api_base: &str,
    ) -> Result<Self, FetchError> {
        let url = kind.item_url(api_base, identifier);
        tracing::debug!(target: "tapster::registry", %kind, ?identifier, "Fetch detail document");
        match kind {
            ItemKind::Package => http_client
                .get_json::<DetailedItem>(&url)
                .await?
                .pipe(|item| DetailedItem { kind, ..item })
                .pipe(Ok),
            ItemKind::Cask => http_client
                .get_json::<CaskDocument>(&url)
                .await?
                .into_detailed_item()
                .pipe(Ok),
        }
    }

    /// Version of the most recent installed instance, if any.
    pub fn installed_version(&self) -> Option<&str> {
        self.installed.last().map(|instance| instance.version.as_str())
    }

    pub fn is_installed(&self) -> bool {
        !self.installed.is_empty()
    }
}
