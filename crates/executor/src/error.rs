use derive_more::{Display, Error};
use miette::Diagnostic;
use std::{io, path::PathBuf, process::ExitStatus, time::Duration};

/// Error when the `brew` executable cannot be found.
#[derive(Debug, Display, Error, Diagnostic)]
#[display("Cannot find the brew executable: {error}")]
#[diagnostic(
    code(tapster_executor::brew_not_found),
    help("Please install it from https://brew.sh or set brew-path in .tapsterrc")
)]
pub struct LocateBrewError {
    #[error(source)]
    pub error: which::Error,
}

/// Error of a `brew` command whose output goes straight to the terminal.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum ExecutorError {
    #[display("Failed to run {program:?}: {error}")]
    #[diagnostic(code(tapster_executor::spawn))]
    Spawn {
        program: PathBuf,
        #[error(source)]
        error: io::Error,
    },

    #[display("brew {command} exited with {status}")]
    #[diagnostic(code(tapster_executor::exit))]
    Exit { command: String, status: ExitStatus },
}

/// Error when reading the local installation state through `brew info`.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum LocalStateError {
    #[display("Failed to run brew info: {error}")]
    #[diagnostic(code(tapster_executor::local_state::spawn))]
    Spawn {
        #[error(source)]
        error: io::Error,
    },

    #[display("brew info exited with {status}: {stderr}")]
    #[diagnostic(code(tapster_executor::local_state::exit))]
    Exit { status: ExitStatus, stderr: String },

    #[display("Failed to decode the output of brew info: {error}")]
    #[diagnostic(code(tapster_executor::local_state::decode))]
    Decode {
        #[error(source)]
        error: serde_json::Error,
    },

    #[display("brew info did not finish within {timeout:?}")]
    #[diagnostic(code(tapster_executor::local_state::timeout))]
    Timeout { timeout: Duration },
}

/// Error of a single `brew install`.
#[derive(Debug, Display, Error, Diagnostic)]
#[non_exhaustive]
pub enum InstallError {
    #[display("Failed to start the installation of {item}: {error}")]
    #[diagnostic(code(tapster_executor::install::spawn))]
    Spawn {
        item: String,
        #[error(source)]
        error: io::Error,
    },

    #[display("Failed to wait for the installation of {item}: {error}")]
    #[diagnostic(code(tapster_executor::install::wait))]
    Wait {
        item: String,
        #[error(source)]
        error: io::Error,
    },

    #[display("Installation of {item} exited with {status}")]
    #[diagnostic(code(tapster_executor::install::exit))]
    Exit { item: String, status: ExitStatus },
}
