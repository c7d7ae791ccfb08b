use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use pipe_trait::Pipe;
use tapster_network::{FetchError, HttpClient};
use tapster_registry::{CaskSummary, ItemKind, PackageSummary};
use tokio::sync::{Mutex, RwLock};

/// Default age after which the lists are considered stale.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Default timeout of each list download.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only view of the lists held by a [`CatalogCache`].
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub packages: Arc<Vec<PackageSummary>>,
    pub casks: Arc<Vec<CaskSummary>>,
    /// When the package list was last replaced. `None` if it never was.
    pub refreshed_at: Option<Instant>,
}

impl CatalogSnapshot {
    /// The lists should be downloaded again when they are older than `max_age` or when
    /// either of them is empty.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        let expired = match self.refreshed_at {
            None => true,
            Some(refreshed_at) => refreshed_at.elapsed() > max_age,
        };
        expired || self.packages.is_empty() || self.casks.is_empty()
    }
}

/// The two halves of the catalog. Each half is replaced on its own.
#[derive(Debug, Default)]
pub(crate) struct CatalogState {
    pub(crate) packages: Arc<Vec<PackageSummary>>,
    pub(crate) packages_refreshed_at: Option<Instant>,
    pub(crate) casks: Arc<Vec<CaskSummary>>,
    pub(crate) casks_refreshed_at: Option<Instant>,
}

/// In-memory copy of the bulk package and cask lists.
///
/// Readers never wait for a download: they see the lists as of the last completed refresh.
/// A failed download keeps the previous copy of that list.
#[derive(Debug)]
pub struct CatalogCache {
    http_client: HttpClient,
    api_base: String,
    refresh_timeout: Duration,
    max_age: Duration,
    pub(crate) state: RwLock<CatalogState>,
    /// Held for the whole duration of a refresh so that concurrent callers share it.
    refresh_gate: Mutex<()>,
    /// Number of completed refreshes.
    generation: AtomicU64,
}

impl CatalogCache {
    /// Create an empty cache that downloads from `api_base` (trailing slash included).
    pub fn new(http_client: HttpClient, api_base: impl Into<String>) -> Self {
        CatalogCache {
            http_client,
            api_base: api_base.into(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            max_age: DEFAULT_MAX_AGE,
            state: RwLock::default(),
            refresh_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_refresh_timeout(self, refresh_timeout: Duration) -> Self {
        CatalogCache { refresh_timeout, ..self }
    }

    pub fn with_max_age(self, max_age: Duration) -> Self {
        CatalogCache { max_age, ..self }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Current lists and the freshness of the package list.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().await;
        CatalogSnapshot {
            packages: Arc::clone(&state.packages),
            casks: Arc::clone(&state.casks),
            refreshed_at: state.packages_refreshed_at,
        }
    }

    /// Download both lists concurrently and replace each one that arrived.
    ///
    /// This never fails: a list that could not be downloaded or decoded is logged and left
    /// as it was.
    pub async fn refresh(&self) {
        tracing::debug!(target: "tapster::catalog", api_base = ?self.api_base, "Loading lists");

        let (packages, casks) = tokio::join!(
            self.fetch_with_timeout(
                ItemKind::Package,
                PackageSummary::fetch_list(&self.http_client, &self.api_base),
            ),
            self.fetch_with_timeout(
                ItemKind::Cask,
                CaskSummary::fetch_list(&self.http_client, &self.api_base),
            ),
        );

        let mut state = self.state.write().await;
        let now = Instant::now();
        if let Some(packages) = packages {
            state.packages = Arc::new(packages);
            state.packages_refreshed_at = Some(now);
        }
        if let Some(casks) = casks {
            state.casks = Arc::new(casks);
            state.casks_refreshed_at = Some(now);
        }
        drop(state);

        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Refresh the lists if the current snapshot is stale, then return the snapshot.
    ///
    /// At most one refresh runs at a time. A caller that arrives while a refresh is in
    /// flight waits for it to finish and reuses its result instead of starting another one.
    pub async fn refresh_if_stale(&self) -> CatalogSnapshot {
        let observed_generation = self.generation.load(Ordering::SeqCst);
        let snapshot = self.snapshot().await;
        if !snapshot.is_stale(self.max_age) {
            return snapshot;
        }

        let _gate = self.refresh_gate.lock().await;
        if self.generation.load(Ordering::SeqCst) != observed_generation {
            tracing::debug!(target: "tapster::catalog", "Reuse the refresh that was in flight");
            return self.snapshot().await;
        }

        tracing::debug!(target: "tapster::catalog", "Cache expired or empty, reloading");
        self.refresh().await;
        self.snapshot().await
    }

    async fn fetch_with_timeout<Value, Fetch>(
        &self,
        kind: ItemKind,
        fetch: Fetch,
    ) -> Option<Vec<Value>>
    where
        Fetch: Future<Output = Result<Vec<Value>, FetchError>>,
    {
        let result = tokio::time::timeout(self.refresh_timeout, fetch).await.unwrap_or_else(|_| {
            kind.list_url(&self.api_base).pipe(|url| FetchError::Timeout { url }).pipe(Err)
        });

        match result {
            Ok(list) => {
                tracing::debug!(target: "tapster::catalog", %kind, count = list.len(), "Loaded");
                Some(list)
            }
            Err(error) => {
                tracing::warn!(target: "tapster::catalog", %kind, %error, "Failed to load list");
                None
            }
        }
    }
}
