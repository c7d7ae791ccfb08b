use std::sync::Arc;

use tapster_registry::{CaskSummary, PackageSummary};
use tokio::task::JoinError;

use crate::CatalogCache;

/// Names of the catalog entries matching a search term.
///
/// Both lists keep the order of the catalog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub packages: Vec<String>,
    pub casks: Vec<String>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.casks.is_empty()
    }
}

/// This subroutine finds packages and casks whose names or descriptions contain a term,
/// ignoring case.
///
/// Stale lists are refreshed first. When the catalog cannot be reached the search runs over
/// whatever is cached, which may be nothing.
#[must_use]
pub struct Search<'a> {
    pub catalog: &'a CatalogCache,
    pub term: &'a str,
}

impl<'a> Search<'a> {
    /// Execute the subroutine.
    pub async fn run(self) -> SearchResults {
        let Search { catalog, term } = self;

        let snapshot = catalog.refresh_if_stale().await;
        let lower_term: Arc<str> = term.to_lowercase().into();

        let packages = {
            let (list, lower_term) = (Arc::clone(&snapshot.packages), Arc::clone(&lower_term));
            tokio::task::spawn_blocking(move || match_packages(&list, &lower_term))
        };
        let casks = {
            let (list, lower_term) = (Arc::clone(&snapshot.casks), Arc::clone(&lower_term));
            tokio::task::spawn_blocking(move || match_casks(&list, &lower_term))
        };
        let (packages, casks) = tokio::join!(packages, casks);

        let results = SearchResults {
            packages: unwrap_matches(packages, "packages"),
            casks: unwrap_matches(casks, "casks"),
        };

        tracing::debug!(
            target: "tapster::search",
            ?term,
            packages = results.packages.len(),
            casks = results.casks.len(),
            "Search completed",
        );

        results
    }
}

fn unwrap_matches(result: Result<Vec<String>, JoinError>, list: &str) -> Vec<String> {
    result.unwrap_or_else(|error| {
        tracing::error!(target: "tapster::search", %list, %error, "Matching task failed");
        Vec::new()
    })
}

/// A package matches when its name or its description contains `lower_term`.
pub fn match_packages(packages: &[PackageSummary], lower_term: &str) -> Vec<String> {
    packages
        .iter()
        .filter(|package| {
            package.name.to_lowercase().contains(lower_term)
                || package.desc.to_lowercase().contains(lower_term)
        })
        .map(|package| package.name.clone())
        .collect()
}

/// A cask matches when its token, its description, or any of its display names contains
/// `lower_term`.
pub fn match_casks(casks: &[CaskSummary], lower_term: &str) -> Vec<String> {
    casks
        .iter()
        .filter(|cask| {
            cask.token.to_lowercase().contains(lower_term)
                || cask.desc.to_lowercase().contains(lower_term)
                || cask.name.iter().any(|name| name.to_lowercase().contains(lower_term))
        })
        .map(|cask| cask.token.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_cache::tests::{cask, package, seeded_cache};
    use pretty_assertions::assert_eq;
    use std::time::Instant;

    async fn git_catalog(api_base: &str) -> CatalogCache {
        seeded_cache(
            api_base,
            vec![
                package("git", "Distributed version control"),
                package("node", "JavaScript runtime"),
            ],
            vec![cask("github", &["GitHub Desktop"], "Desktop client for GitHub repositories")],
            Some(Instant::now()),
        )
        .await
    }

    #[tokio::test]
    async fn find_by_name() {
        let catalog = git_catalog("http://127.0.0.1:9/").await;
        let results = Search { catalog: &catalog, term: "git" }.run().await;
        assert_eq!(
            results,
            SearchResults { packages: vec!["git".to_string()], casks: vec!["github".to_string()] }
        );
    }

    #[tokio::test]
    async fn case_insensitive() {
        let catalog = git_catalog("http://127.0.0.1:9/").await;
        let lower = Search { catalog: &catalog, term: "javascript" }.run().await;
        let mixed = Search { catalog: &catalog, term: "JavaScript" }.run().await;
        let upper = Search { catalog: &catalog, term: "JAVASCRIPT" }.run().await;
        assert_eq!(lower.packages, ["node"]);
        assert_eq!(lower, mixed);
        assert_eq!(lower, upper);
    }

    #[tokio::test]
    async fn no_match_is_empty() {
        let catalog = git_catalog("http://127.0.0.1:9/").await;
        let results = Search { catalog: &catalog, term: "kubernetes" }.run().await;
        assert!(results.is_empty());
        assert_eq!(results, SearchResults::default());
    }

    #[test]
    fn cask_display_names_are_searched() {
        let casks = [cask("visual-studio-code", &["Microsoft Visual Studio Code"], "Code editor")];
        assert_eq!(match_casks(&casks, "microsoft"), ["visual-studio-code"]);
        assert_eq!(match_casks(&casks, "editor"), ["visual-studio-code"]);
        assert!(match_casks(&casks, "vim").is_empty());
    }

    #[test]
    fn keep_catalog_order() {
        let packages = [
            package("zsh", "UNIX shell"),
            package("bash", "Bourne-Again SHell"),
            package("fish", "User-friendly command-line shell"),
        ];
        assert_eq!(match_packages(&packages, "shell"), ["zsh", "bash", "fish"]);
    }

    #[tokio::test]
    async fn unreachable_catalog_yields_no_results() {
        let mut server = mockito::Server::new_async().await;
        let _packages = server.mock("GET", "/formula.json").with_status(500).create_async().await;
        let _casks = server.mock("GET", "/cask.json").with_status(500).create_async().await;

        let catalog = CatalogCache::new(Default::default(), format!("{}/", server.url()));
        let results = Search { catalog: &catalog, term: "git" }.run().await;
        assert_eq!(results, SearchResults::default());
    }

    #[tokio::test]
    async fn empty_catalog_is_loaded_before_searching() {
        let mut server = mockito::Server::new_async().await;
        let packages = server
            .mock("GET", "/formula.json")
            .with_status(200)
            .with_body(
                serde_json::json!([
                    {"name": "git", "desc": "Distributed version control"},
                    {"name": "node", "desc": "JavaScript runtime"},
                ])
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let casks = server
            .mock("GET", "/cask.json")
            .with_status(200)
            .with_body(
                serde_json::json!([
                    {"token": "github", "name": ["GitHub Desktop"], "desc": "Desktop client"},
                ])
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let catalog = CatalogCache::new(Default::default(), format!("{}/", server.url()));
        let results = Search { catalog: &catalog, term: "GIT" }.run().await;
        assert_eq!(results.packages, ["git"]);
        assert_eq!(results.casks, ["github"]);

        // the lists are fresh now, so a second search does not download them again
        let results = Search { catalog: &catalog, term: "node" }.run().await;
        assert_eq!(results.packages, ["node"]);

        packages.assert_async().await;
        casks.assert_async().await;
    }
}
