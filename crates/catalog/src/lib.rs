mod catalog_cache;
mod search;

pub use catalog_cache::{CatalogCache, CatalogSnapshot, DEFAULT_MAX_AGE, DEFAULT_REFRESH_TIMEOUT};
pub use search::{match_casks, match_packages, Search, SearchResults};
