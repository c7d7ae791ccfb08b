use derive_more::{Display, Error};
use miette::Diagnostic;
use std::sync::Arc;
use tapster_executor::Brew;
use tapster_mem_cache::MemCache;
use tapster_network::{FetchError, HttpClient};
use tapster_registry::{DetailedItem, ItemKind};

/// Cache of detail documents keyed by the identifier they were requested with.
pub type ItemCache = MemCache<Arc<DetailedItem>>;

/// Error type of [`GetItem`].
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum GetItemError {
    #[display("invalid identifier: {identifier:?}")]
    #[diagnostic(
        code(tapster_package_manager::invalid_identifier),
        help("Use the plain name of a formula or cask, such as `git` or `firefox`"),
    )]
    InvalidIdentifier { identifier: String },

    #[display("package not found: {identifier} (tried both formula and cask)")]
    #[diagnostic(code(tapster_package_manager::not_found))]
    NotFound {
        identifier: String,
        /// Failure of each kind, in the order the kinds were tried.
        #[related]
        attempts: Vec<FetchError>,
    },
}

/// This subroutine resolves an identifier into a detailed item without knowing its kind.
///
/// A cached item is returned as is. Otherwise the identifier is fetched as each kind of
/// [`ItemKind::FALLBACK_ORDER`] in turn until one succeeds. Only packages are merged with the
/// local installation state.
#[must_use]
pub struct GetItem<'a> {
    pub http_client: &'a HttpClient,
    pub api_base: &'a str,
    pub item_cache: &'a ItemCache,
    /// Reads the local installation state. `None` skips the merge.
    pub brew: Option<&'a Brew>,
    pub identifier: &'a str,
}

impl<'a> GetItem<'a> {
    /// Execute the subroutine.
    pub async fn run(self) -> Result<Arc<DetailedItem>, GetItemError> {
        let GetItem { http_client, api_base, item_cache, brew, identifier } = self;

        if !is_valid_identifier(identifier) {
            return Err(GetItemError::InvalidIdentifier { identifier: identifier.to_string() });
        }

        if let Some(item) = item_cache.load(identifier) {
            tracing::debug!(target: "tapster::get_item", ?identifier, "Cache hit");
            return Ok(item);
        }

        let mut attempts = Vec::with_capacity(ItemKind::FALLBACK_ORDER.len());
        for kind in ItemKind::FALLBACK_ORDER {
            match DetailedItem::fetch_from_registry(kind, identifier, http_client, api_base).await {
                Ok(mut item) => {
                    if let (ItemKind::Package, Some(brew)) = (kind, brew) {
                        merge_local_state(&mut item, brew, identifier).await;
                    }
                    return Ok(cache_item(item_cache, identifier, item));
                }
                Err(error) => {
                    tracing::debug!(
                        target: "tapster::get_item",
                        ?identifier,
                        %kind,
                        %error,
                        "Not found as this kind",
                    );
                    attempts.push(error);
                }
            }
        }

        Err(GetItemError::NotFound { identifier: identifier.to_string(), attempts })
    }
}

/// An identifier is spliced into a URL path, so it must be a single non-empty segment.
fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier != "."
        && identifier != ".."
        && !identifier.contains(['/', '\\'])
}

/// Replace the installed instances reported by the catalog with those of the local `brew`.
///
/// Failures are logged and otherwise ignored.
async fn merge_local_state(item: &mut DetailedItem, brew: &Brew, identifier: &str) {
    match brew.installed_instances(identifier).await {
        Ok(instances) if instances.is_empty() => {}
        Ok(instances) => item.installed = instances,
        Err(error) => {
            tracing::warn!(
                target: "tapster::get_item",
                ?identifier,
                %error,
                "Failed to read local state, continuing without it",
            );
        }
    }
}

fn cache_item(item_cache: &ItemCache, identifier: &str, item: DetailedItem) -> Arc<DetailedItem> {
    let item = Arc::new(item);
    item_cache.store(identifier, Arc::clone(&item));
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn git_document() -> String {
        json!({
            "name": "git",
            "full_name": "git",
            "desc": "Distributed revision control system",
            "homepage": "https://git-scm.com",
            "versions": { "stable": "2.44.0", "head": "HEAD", "bottle": true },
            "dependencies": ["gettext", "pcre2"],
            "installed": [],
        })
        .to_string()
    }

    fn firefox_document() -> String {
        json!({
            "token": "firefox",
            "name": ["Mozilla Firefox"],
            "desc": "Web browser",
            "homepage": "https://www.mozilla.org/firefox/",
            "version": "124.0.1",
        })
        .to_string()
    }

    #[tokio::test]
    async fn fetch_package_and_cache_it() {
        let mut server = mockito::Server::new_async().await;
        let package = server
            .mock("GET", "/formula/git.json")
            .with_status(200)
            .with_body(git_document())
            .expect(1)
            .create_async()
            .await;
        let cask = server.mock("GET", "/cask/git.json").expect(0).create_async().await;

        let http_client = HttpClient::default();
        let api_base = format!("{}/", server.url());
        let item_cache = ItemCache::default();
        let get_item = || GetItem {
            http_client: &http_client,
            api_base: &api_base,
            item_cache: &item_cache,
            brew: None,
            identifier: "git",
        };

        let first = get_item().run().await.unwrap();
        assert_eq!(first.kind, ItemKind::Package);
        assert_eq!(first.versions.stable.as_deref(), Some("2.44.0"));

        let second = get_item().run().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second), "the second call should be served by the cache");

        package.assert_async().await;
        cask.assert_async().await;
    }

    #[tokio::test]
    async fn fall_back_to_cask() {
        let mut server = mockito::Server::new_async().await;
        let _package =
            server.mock("GET", "/formula/firefox.json").with_status(404).create_async().await;
        let cask = server
            .mock("GET", "/cask/firefox.json")
            .with_status(200)
            .with_body(firefox_document())
            .expect(1)
            .create_async()
            .await;

        let http_client = HttpClient::default();
        let api_base = format!("{}/", server.url());
        let item_cache = ItemCache::default();
        let item = GetItem {
            http_client: &http_client,
            api_base: &api_base,
            item_cache: &item_cache,
            brew: None,
            identifier: "firefox",
        }
        .run()
        .await
        .unwrap();

        assert_eq!(item.kind, ItemKind::Cask);
        assert_eq!(item.name, "firefox");
        assert_eq!(item.full_name, "Mozilla Firefox");
        assert!(item_cache.load("firefox").is_some());
        cask.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_names_both_kinds() {
        let mut server = mockito::Server::new_async().await;
        let _package =
            server.mock("GET", "/formula/nope.json").with_status(404).create_async().await;
        let _cask = server.mock("GET", "/cask/nope.json").with_status(404).create_async().await;

        let http_client = HttpClient::default();
        let api_base = format!("{}/", server.url());
        let item_cache = ItemCache::default();
        let error = GetItem {
            http_client: &http_client,
            api_base: &api_base,
            item_cache: &item_cache,
            brew: None,
            identifier: "nope",
        }
        .run()
        .await
        .unwrap_err();

        dbg!(&error);
        assert_eq!(error.to_string(), "package not found: nope (tried both formula and cask)");
        let GetItemError::NotFound { identifier, attempts } = error else {
            panic!("expected NotFound, got {error:?}");
        };
        assert_eq!(identifier, "nope");
        let urls: Vec<_> = attempts.iter().map(FetchError::url).collect();
        assert_eq!(
            urls,
            [format!("{api_base}formula/nope.json"), format!("{api_base}cask/nope.json")],
        );
        assert!(attempts.iter().all(FetchError::is_not_found));
        assert!(item_cache.is_empty());
    }

    #[tokio::test]
    async fn reject_identifiers_that_escape_the_item_path() {
        let mut server = mockito::Server::new_async().await;
        let any = server.mock("GET", mockito::Matcher::Any).expect(0).create_async().await;

        let http_client = HttpClient::default();
        let api_base = format!("{}/", server.url());
        let item_cache = ItemCache::default();
        for identifier in ["../cask/firefox", "homebrew/core/git", "a\\b", "..", ""] {
            let error = GetItem {
                http_client: &http_client,
                api_base: &api_base,
                item_cache: &item_cache,
                brew: None,
                identifier,
            }
            .run()
            .await
            .unwrap_err();
            dbg!(&error);
            let GetItemError::InvalidIdentifier { identifier: rejected } = &error else {
                panic!("unexpected error for {identifier:?}: {error:?}");
            };
            assert_eq!(rejected.as_str(), identifier);
        }

        any.assert_async().await;
    }

    #[test]
    fn plain_names_are_valid_identifiers() {
        for identifier in ["git", "python@3.12", "font-fira-code", "c++"] {
            assert!(is_valid_identifier(identifier), "{identifier:?} should be valid");
        }
    }

    #[cfg(unix)]
    mod local_state {
        use super::*;
        use pretty_assertions::assert_eq;
        use tapster_testing_utils::fake_brew::FakeBrew;
        use text_block_macros::text_block;

        fn fake(body: &str) -> (FakeBrew, Brew) {
            let fake = FakeBrew::new(body);
            let brew = Brew::new(FakeBrew::PROGRAM).with_leading_args([fake.script()]);
            (fake, brew)
        }

        #[tokio::test]
        async fn merge_installed_instances_into_package() {
            let mut server = mockito::Server::new_async().await;
            let _package = server
                .mock("GET", "/formula/git.json")
                .with_status(200)
                .with_body(git_document())
                .create_async()
                .await;
            let (fake, brew) = fake(text_block! {
                "cat <<'JSON'"
                r#"[{"name": "git", "installed": [{"version": "2.43.0"}, {"version": "2.44.0"}]}]"#
                "JSON"
            });

            let http_client = HttpClient::default();
            let api_base = format!("{}/", server.url());
            let item_cache = ItemCache::default();
            let item = GetItem {
                http_client: &http_client,
                api_base: &api_base,
                item_cache: &item_cache,
                brew: Some(&brew),
                identifier: "git",
            }
            .run()
            .await
            .unwrap();

            assert_eq!(item.installed_version(), Some("2.44.0"));
            assert_eq!(item.installed.len(), 2);
            assert_eq!(fake.invocations(), ["info --json=v1 git"]);
        }

        #[tokio::test]
        async fn broken_local_state_is_not_fatal() {
            let mut server = mockito::Server::new_async().await;
            let _package = server
                .mock("GET", "/formula/git.json")
                .with_status(200)
                .with_body(git_document())
                .create_async()
                .await;
            let (_fake, brew) = fake("exit 1");

            let http_client = HttpClient::default();
            let api_base = format!("{}/", server.url());
            let item_cache = ItemCache::default();
            let item = GetItem {
                http_client: &http_client,
                api_base: &api_base,
                item_cache: &item_cache,
                brew: Some(&brew),
                identifier: "git",
            }
            .run()
            .await
            .unwrap();

            assert_eq!(item.name, "git");
            assert!(!item.is_installed());
            assert!(item_cache.load("git").is_some());
        }

        #[tokio::test]
        async fn cask_is_not_merged() {
            let mut server = mockito::Server::new_async().await;
            let _package =
                server.mock("GET", "/formula/firefox.json").with_status(404).create_async().await;
            let _cask = server
                .mock("GET", "/cask/firefox.json")
                .with_status(200)
                .with_body(firefox_document())
                .create_async()
                .await;
            let (fake, brew) = fake("echo '[]'");

            let http_client = HttpClient::default();
            let api_base = format!("{}/", server.url());
            let item_cache = ItemCache::default();
            let item = GetItem {
                http_client: &http_client,
                api_base: &api_base,
                item_cache: &item_cache,
                brew: Some(&brew),
                identifier: "firefox",
            }
            .run()
            .await
            .unwrap();

            assert_eq!(item.kind, ItemKind::Cask);
            assert!(fake.invocations().is_empty());
        }
    }
}
