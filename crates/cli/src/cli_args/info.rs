use crate::State;
use clap::Args;
use miette::Context;
use std::fmt;
use tapster_diagnostics::tracing;
use tapster_package_manager::GetItem;
use tapster_registry::DetailedItem;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Name of the package or cask.
    pub package: String,
}

impl InfoArgs {
    pub async fn run(self, state: State) -> miette::Result<()> {
        let brew = match state.locate_brew() {
            Ok(brew) => Some(brew),
            Err(error) => {
                tracing::debug!(target: "tapster::cli", %error, "Skip local installation state");
                None
            }
        };

        let State { config, http_client, item_cache, .. } = &state;
        let item = GetItem {
            http_client,
            api_base: &config.api_base,
            item_cache,
            brew: brew.as_ref(),
            identifier: &self.package,
        }
        .run()
        .await
        .wrap_err("get information")?;

        print!("{}", ItemReport(&item));
        Ok(())
    }
}

struct ItemReport<'a>(&'a DetailedItem);

impl fmt::Display for ItemReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let item = self.0;

        write!(f, "==> {} ({})", item.name, item.kind)?;
        if !item.desc.is_empty() {
            write!(f, ": {}", item.desc)?;
        }
        writeln!(f)?;
        if !item.homepage.is_empty() {
            writeln!(f, "Homepage: {}", item.homepage)?;
        }
        if let Some(version) = &item.versions.stable {
            writeln!(f, "Version: {version}")?;
        }
        if let Some(license) = &item.license {
            writeln!(f, "License: {license}")?;
        }
        if item.deprecated {
            let reason = item.deprecation_reason.as_deref().unwrap_or("no reason given");
            writeln!(f, "Deprecated: {reason}")?;
        }
        if item.disabled {
            let reason = item.disable_reason.as_deref().unwrap_or("no reason given");
            writeln!(f, "Disabled: {reason}")?;
        }

        match item.installed.last() {
            Some(instance) => {
                let source = if instance.poured_from_bottle { "bottle" } else { "source" };
                writeln!(f, "Installed: {} (from {source})", instance.version)?;
            }
            None => writeln!(f, "Not installed")?,
        }

        for (title, names) in [
            ("Dependencies", &item.dependencies),
            ("Build dependencies", &item.build_dependencies),
            ("Conflicts with", &item.conflicts_with),
        ] {
            if !names.is_empty() {
                writeln!(f, "{title}: {}", names.join(", "))?;
            }
        }

        let caveats = item.caveats.as_deref().map(str::trim).unwrap_or_default();
        if !caveats.is_empty() {
            writeln!(f, "==> Caveats")?;
            for line in caveats.lines() {
                writeln!(f, "{line}")?;
            }
        }

        Ok(())
    }
}
