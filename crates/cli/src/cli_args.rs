pub mod info;
pub mod install;
pub mod list;
pub mod search;

use crate::{state::locate_brew, State};
use clap::{Args, Parser, Subcommand};
use info::InfoArgs;
use install::InstallArgs;
use miette::Context;
use search::SearchArgs;
use std::{env, ffi::OsString};
use tapster_config::Config;

/// Fast front-end for Homebrew with a cached catalog.
#[derive(Debug, Parser)]
#[clap(name = "tapster")]
#[clap(bin_name = "tapster")]
#[clap(version)]
#[clap(about = "Fast front-end for Homebrew with a cached catalog")]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: CliCommand,

    /// Log what tapster is doing.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Log everything, including HTTP requests and cache hits.
    #[clap(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Search packages and casks by name or description.
    #[clap(visible_alias = "s")]
    Search(SearchArgs),
    /// Show information about a package or a cask.
    Info(InfoArgs),
    /// List installed packages.
    #[clap(visible_alias = "ls")]
    List,
    /// Install packages.
    #[clap(visible_alias = "i")]
    Install(InstallArgs),
    /// Uninstall packages.
    #[clap(visible_aliases = ["remove", "rm"])]
    Uninstall(PackageList),
    /// Fetch the newest version of Homebrew and of the catalog.
    #[clap(visible_alias = "up")]
    Update,
    /// Upgrade outdated packages, or only the given ones.
    Upgrade(OptionalPackageList),
    /// Print the version of tapster.
    Version,
    /// Any other command is passed to brew as is.
    #[clap(external_subcommand)]
    External(Vec<OsString>),
}

#[derive(Debug, Args)]
pub struct PackageList {
    /// Names of the packages or casks.
    #[clap(required = true)]
    pub packages: Vec<String>,
}

#[derive(Debug, Args)]
pub struct OptionalPackageList {
    /// Names of the packages or casks.
    pub packages: Vec<String>,
}

impl CliArgs {
    /// Execute the command
    pub async fn run(self) -> miette::Result<()> {
        let CliArgs { command, .. } = self;
        let config = || Config::current(env::current_dir, home::home_dir).leak();
        let state = || State::init(config()).wrap_err("initialize the state");
        let brew = || locate_brew(config());

        match command {
            CliCommand::Search(args) => args.run(state()?).await,
            CliCommand::Info(args) => args.run(state()?).await,
            CliCommand::List => list::run(brew()?).await,
            CliCommand::Install(args) => {
                let config = config();
                args.run(locate_brew(config)?, config).await
            }
            CliCommand::Uninstall(PackageList { packages }) => {
                brew()?.uninstall(&packages).await.wrap_err("uninstall packages")
            }
            CliCommand::Update => brew()?.update().await.wrap_err("update homebrew"),
            CliCommand::Upgrade(OptionalPackageList { packages }) => {
                brew()?.upgrade(&packages).await.wrap_err("upgrade packages")
            }
            CliCommand::Version => {
                println!("tapster {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            CliCommand::External(args) => brew()?.execute(&args).await.wrap_err("run brew"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse<const N: usize>(args: [&str; N]) -> CliCommand {
        CliArgs::try_parse_from(args).unwrap().command
    }

    #[test]
    fn aliases() {
        assert!(matches!(parse(["tapster", "s", "git"]), CliCommand::Search(_)));
        assert!(matches!(parse(["tapster", "ls"]), CliCommand::List));
        assert!(matches!(parse(["tapster", "i", "wget"]), CliCommand::Install(_)));
        assert!(matches!(parse(["tapster", "rm", "wget"]), CliCommand::Uninstall(_)));
        assert!(matches!(parse(["tapster", "remove", "wget"]), CliCommand::Uninstall(_)));
        assert!(matches!(parse(["tapster", "up"]), CliCommand::Update));
    }

    #[test]
    fn unknown_commands_are_passed_through() {
        let CliCommand::External(args) = parse(["tapster", "doctor", "--list-checks"]) else {
            panic!("expected an external command");
        };
        assert_eq!(args, [OsString::from("doctor"), OsString::from("--list-checks")]);
    }

    #[test]
    fn uninstall_requires_a_package() {
        CliArgs::try_parse_from(["tapster", "uninstall"]).unwrap_err();
        let CliCommand::Upgrade(OptionalPackageList { packages }) = parse(["tapster", "upgrade"])
        else {
            panic!("expected upgrade");
        };
        assert!(packages.is_empty());
    }

    #[test]
    fn global_verbosity_flags() {
        let cli = CliArgs::try_parse_from(["tapster", "search", "git", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(!cli.verbose);
    }
}
