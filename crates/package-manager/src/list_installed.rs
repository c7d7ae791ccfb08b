use tapster_executor::{Brew, LocalStateError};
use tapster_registry::DetailedItem;

/// This subroutine lists every package installed by the local `brew`.
#[must_use]
pub struct ListInstalled<'a> {
    pub brew: &'a Brew,
}

impl<'a> ListInstalled<'a> {
    /// Execute the subroutine.
    pub async fn run(self) -> Result<Vec<DetailedItem>, LocalStateError> {
        let items = self.brew.installed_items().await?;
        tracing::debug!(target: "tapster::list_installed", count = items.len(), "Listed");
        Ok(items)
    }
}
