use crate::{ExecutorError, LocateBrewError};
use pipe_trait::Pipe;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};
use tokio::process::Command;

/// Default limit of a `brew info` call.
pub const DEFAULT_LOCAL_STATE_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle to the `brew` executable.
#[derive(Debug, Clone)]
pub struct Brew {
    program: PathBuf,
    leading_args: Vec<OsString>,
    timeout: Duration,
}

impl Brew {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Brew {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: DEFAULT_LOCAL_STATE_TIMEOUT,
        }
    }

    /// Arguments placed before every subcommand, e.g. the script when `program` is a shell.
    pub fn with_leading_args<Args, Arg>(mut self, args: Args) -> Self
    where
        Args: IntoIterator<Item = Arg>,
        Arg: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Limit how long a `brew info` call may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Find `brew`, either at `configured` or in `PATH`.
    pub fn locate(configured: Option<&Path>) -> Result<Self, LocateBrewError> {
        let program = match configured {
            Some(path) => which::which(path),
            None => which::which("brew"),
        }
        .map_err(|error| LocateBrewError { error })?;
        tracing::debug!(target: "tapster::executor", ?program, "Found brew");
        program.pipe(Brew::new).pipe(Ok)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a command that runs `brew` with the leading arguments already applied.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args);
        command
    }

    /// Run `brew <args>` with the standard streams of the current process.
    pub async fn run_inherited<Args, Arg>(&self, args: Args) -> Result<(), ExecutorError>
    where
        Args: IntoIterator<Item = Arg>,
        Arg: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|arg| arg.as_ref().to_os_string()).collect();
        let command_line =
            args.iter().map(|arg| arg.to_string_lossy()).collect::<Vec<_>>().join(" ");
        tracing::info!(target: "tapster::executor", command = %command_line, "Run brew");

        let status = self
            .command()
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|error| ExecutorError::Spawn { program: self.program.clone(), error })?;

        if !status.success() {
            return Err(ExecutorError::Exit { command: command_line, status });
        }
        Ok(())
    }

    /// Run `brew uninstall <identifiers>`.
    pub async fn uninstall(&self, identifiers: &[String]) -> Result<(), ExecutorError> {
        let args = std::iter::once("uninstall").chain(identifiers.iter().map(String::as_str));
        self.run_inherited(args).await
    }

    /// Run `brew update`.
    pub async fn update(&self) -> Result<(), ExecutorError> {
        self.run_inherited(["update"]).await
    }

    /// Run `brew upgrade`, optionally restricted to `identifiers`.
    pub async fn upgrade(&self, identifiers: &[String]) -> Result<(), ExecutorError> {
        let args = std::iter::once("upgrade").chain(identifiers.iter().map(String::as_str));
        self.run_inherited(args).await
    }

    /// Pass `args` to `brew` unchanged.
    pub async fn execute(&self, args: &[OsString]) -> Result<(), ExecutorError> {
        self.run_inherited(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn locate_missing_configured_path() {
        let error = Brew::locate(Some(Path::new("/nonexistent/tapster/brew"))).unwrap_err();
        dbg!(&error);
        assert!(error.to_string().starts_with("Cannot find the brew executable"));
    }

    #[test]
    fn leading_args_come_first() {
        let brew = Brew::new("sh").with_leading_args(["brew.sh"]);
        let mut command = brew.command();
        command.arg("update");
        let args: Vec<_> = command.as_std().get_args().collect();
        assert_eq!(args, ["brew.sh", "update"]);
        assert_eq!(brew.program(), Path::new("sh"));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use pretty_assertions::assert_eq;
        use tapster_testing_utils::fake_brew::FakeBrew;

        fn fake(body: &str) -> (FakeBrew, Brew) {
            let fake = FakeBrew::new(body);
            let brew = Brew::new(FakeBrew::PROGRAM).with_leading_args([fake.script()]);
            (fake, brew)
        }

        #[tokio::test]
        async fn pass_arguments_through() {
            let (fake, brew) = fake("exit 0");
            brew.uninstall(&["git".to_string(), "node".to_string()]).await.unwrap();
            brew.update().await.unwrap();
            brew.upgrade(&[]).await.unwrap();
            brew.execute(&[OsString::from("doctor"), OsString::from("--verbose")]).await.unwrap();
            assert_eq!(
                fake.invocations(),
                ["uninstall git node", "update", "upgrade", "doctor --verbose"],
            );
        }

        #[tokio::test]
        async fn report_exit_failure() {
            let (_fake, brew) = fake("exit 3");
            let error = brew.update().await.unwrap_err();
            dbg!(&error);
            let ExecutorError::Exit { command, status } = error else {
                panic!("expected an exit error");
            };
            assert_eq!(command, "update");
            assert_eq!(status.code(), Some(3));
        }
    }
}
