use crate::State;
use clap::Args;
use std::fmt;
use tapster_catalog::{Search, SearchResults};

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to look for in names and descriptions, ignoring case.
    pub term: String,
}

impl SearchArgs {
    pub async fn run(self, state: State) -> miette::Result<()> {
        let State { catalog, .. } = &state;
        let results = Search { catalog, term: &self.term }.run().await;
        print!("{}", SearchReport(&results));
        Ok(())
    }
}

struct SearchReport<'a>(&'a SearchResults);

impl fmt::Display for SearchReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let SearchResults { packages, casks } = self.0;
        for (title, names) in [("Formulae", packages), ("Casks", casks)] {
            if names.is_empty() {
                continue;
            }
            writeln!(f, "==> {title}")?;
            for name in names {
                writeln!(f, "{name}")?;
            }
            writeln!(f)?;
        }
        match packages.len() + casks.len() {
            0 => writeln!(f, "No results found"),
            1 => writeln!(f, "Total: 1 result"),
            total => writeln!(f, "Total: {total} results"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_both_sections() {
        let results = SearchResults {
            packages: vec!["git".to_string(), "git-lfs".to_string()],
            casks: vec!["github".to_string()],
        };
        let expected = "==> Formulae\ngit\ngit-lfs\n\n==> Casks\ngithub\n\nTotal: 3 results\n";
        assert_eq!(SearchReport(&results).to_string(), expected);
    }

    #[test]
    fn skip_empty_section() {
        let results = SearchResults { packages: Vec::new(), casks: vec!["firefox".to_string()] };
        assert_eq!(SearchReport(&results).to_string(), "==> Casks\nfirefox\n\nTotal: 1 result\n");
    }

    #[test]
    fn nothing_found() {
        let results = SearchResults::default();
        assert_eq!(SearchReport(&results).to_string(), "No results found\n");
    }
}
