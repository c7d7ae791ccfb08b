use miette::Context;
use std::fmt;
use tapster_executor::Brew;
use tapster_package_manager::ListInstalled;
use tapster_registry::DetailedItem;

/// Longest description shown, in characters.
const DESCRIPTION_WIDTH: usize = 50;

pub async fn run(brew: Brew) -> miette::Result<()> {
    let items = ListInstalled { brew: &brew }.run().await.wrap_err("list installed packages")?;
    print!("{}", InstalledReport(&items));
    Ok(())
}

struct InstalledReport<'a>(&'a [DetailedItem]);

impl fmt::Display for InstalledReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.0;
        if items.is_empty() {
            return writeln!(f, "No packages installed");
        }

        writeln!(f, "==> Installed packages ({} total)", items.len())?;
        for item in items {
            let status = match (item.pinned, item.outdated) {
                (true, _) => "pinned",
                (false, true) => "outdated",
                (false, false) => "",
            };
            let version = item.installed_version().unwrap_or_default();
            write!(f, "{:<30} {version:<12} {status:<8}", item.name)?;
            if !item.desc.is_empty() {
                write!(f, " {}", truncate(&item.desc, DESCRIPTION_WIDTH))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width - 3).collect();
    truncated.push_str("...");
    truncated
}
