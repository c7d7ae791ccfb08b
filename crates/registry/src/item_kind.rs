use derive_more::Display;

/// Category of an installable unit.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Built from source or poured from a bottle. Called a "formula" by the catalog.
    #[default]
    #[display("formula")]
    Package,
    /// Prebuilt application bundle.
    #[display("cask")]
    Cask,
}

impl ItemKind {
    /// Order in which kinds are tried when the kind of an identifier is unknown.
    pub const FALLBACK_ORDER: [ItemKind; 2] = [ItemKind::Package, ItemKind::Cask];

    /// Path segment of the catalog endpoints serving this kind.
    pub fn endpoint(self) -> &'static str {
        match self {
            ItemKind::Package => "formula",
            ItemKind::Cask => "cask",
        }
    }

    /// URL of the bulk list of this kind.
    pub fn list_url(self, api_base: &str) -> String {
        format!("{api_base}{}.json", self.endpoint())
    }

    /// URL of the detail document of `identifier`.
    pub fn item_url(self, api_base: &str, identifier: &str) -> String {
        format!("{api_base}{}/{identifier}.json", self.endpoint())
    }
}
