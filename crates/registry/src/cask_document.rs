use serde::Deserialize;

use crate::{serde_helpers::null_as_default, DetailedItem, InstalledInstance, ItemKind, Versions};

/// Shape of `cask/<token>.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CaskDocument {
    token: String,
    #[serde(deserialize_with = "null_as_default")]
    tap: String,
    #[serde(deserialize_with = "null_as_default")]
    name: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    desc: String,
    #[serde(deserialize_with = "null_as_default")]
    homepage: String,
    version: Option<String>,
    /// Installed version, if any.
    installed: Option<String>,
    outdated: bool,
    deprecated: bool,
    deprecation_reason: Option<String>,
    disabled: bool,
    disable_reason: Option<String>,
    caveats: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    depends_on: CaskRelations,
    #[serde(deserialize_with = "null_as_default")]
    conflicts_with: CaskRelations,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CaskRelations {
    #[serde(deserialize_with = "null_as_default")]
    formula: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    cask: Vec<String>,
}

impl CaskRelations {
    fn into_names(self) -> Vec<String> {
        self.formula.into_iter().chain(self.cask).collect()
    }
}

impl CaskDocument {
    pub(crate) fn into_detailed_item(self) -> DetailedItem {
        let CaskDocument {
            token,
            tap,
            name,
            desc,
            homepage,
            version,
            installed,
            outdated,
            deprecated,
            deprecation_reason,
            disabled,
            disable_reason,
            caveats,
            depends_on,
            conflicts_with,
        } = self;

        let installed = installed
            .into_iter()
            .map(|version| InstalledInstance { version, ..InstalledInstance::default() })
            .collect();

        DetailedItem {
            kind: ItemKind::Cask,
            full_name: if name.is_empty() { token.clone() } else { name.join(", ") },
            name: token,
            tap,
            desc,
            homepage,
            versions: Versions { stable: version, head: None, bottle: false },
            dependencies: depends_on.into_names(),
            conflicts_with: conflicts_with.into_names(),
            caveats,
            installed,
            outdated,
            deprecated,
            deprecation_reason,
            disabled,
            disable_reason,
            ..DetailedItem::default()
        }
    }
}
