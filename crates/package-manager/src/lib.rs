mod get_item;
mod install;
mod list_installed;

pub use get_item::{GetItem, GetItemError, ItemCache};
pub use install::Install;
pub use list_installed::ListInstalled;
