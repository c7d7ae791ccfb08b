use derive_more::{Display, Error};
use miette::Diagnostic;
use pipe_trait::Pipe;
use std::sync::Arc;
use tapster_catalog::CatalogCache;
use tapster_config::Config;
use tapster_executor::{Brew, LocateBrewError};
use tapster_network::HttpClient;
use tapster_package_manager::ItemCache;

/// Application state shared by the commands that talk to the catalog.
pub struct State {
    /// Configuration read from `.tapsterrc`.
    pub config: &'static Config,
    /// HTTP client to make HTTP requests.
    pub http_client: HttpClient,
    /// Bulk package and cask lists, loaded on first search.
    pub catalog: Arc<CatalogCache>,
    /// Detail documents fetched so far.
    pub item_cache: ItemCache,
}

/// Error type of [`State::init`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum InitStateError {
    #[display("Failed to create the HTTP client: {_0}")]
    #[diagnostic(code(tapster_cli::http_client))]
    HttpClient(#[error(source)] reqwest::Error),
}

impl State {
    /// Initialize the application state. No request is made until a command needs one.
    pub fn init(config: &'static Config) -> Result<Self, InitStateError> {
        let http_client =
            HttpClient::new(config.request_timeout).map_err(InitStateError::HttpClient)?;

        let catalog = CatalogCache::new(http_client.clone(), config.api_base.as_str())
            .with_refresh_timeout(config.refresh_timeout)
            .with_max_age(config.catalog_max_age)
            .pipe(Arc::new);

        Ok(State { config, http_client, catalog, item_cache: ItemCache::new(config.cache_ttl) })
    }

    /// Find the `brew` executable configured by `brew-path` or in `PATH`.
    pub fn locate_brew(&self) -> Result<Brew, LocateBrewError> {
        locate_brew(self.config)
    }
}

pub(crate) fn locate_brew(config: &Config) -> Result<Brew, LocateBrewError> {
    Brew::locate(config.brew_path.as_deref())?.with_timeout(config.local_state_timeout).pipe(Ok)
}
