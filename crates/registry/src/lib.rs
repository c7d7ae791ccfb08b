mod cask_document;
mod catalog_item;
mod detailed_item;
mod installed_instance;
mod item_kind;
mod serde_helpers;

pub use catalog_item::{CaskSummary, PackageSummary};
pub use detailed_item::{DetailedItem, Service, Versions};
pub use installed_instance::{InstalledInstance, RuntimeDependency};
pub use item_kind::ItemKind;
