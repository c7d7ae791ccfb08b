use clap::Args;
use std::{
    fmt,
    time::{Duration, Instant},
};
use tapster_config::Config;
use tapster_executor::{Brew, ProgressEvent, Stage};
use tapster_package_manager::Install;
use tokio::sync::mpsc::{self, Receiver};

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Names of the packages or casks to install, in order.
    #[clap(required = true)]
    pub packages: Vec<String>,
}

impl InstallArgs {
    pub async fn run(self, brew: Brew, config: &Config) -> miette::Result<()> {
        let InstallArgs { packages } = self;
        let started_at = Instant::now();

        println!("==> Installing {}", packages.join(", "));
        let (events, receiver) = mpsc::channel(config.progress_buffer);
        let install = Install { brew: &brew, items: &packages, events };
        let ((), failed) = tokio::join!(install.run(), print_progress(receiver));
        println!("==> Finished in {}", DisplayDuration(started_at.elapsed()));

        if !failed.is_empty() {
            miette::bail!("Failed to install {}", failed.join(", "));
        }
        Ok(())
    }
}

/// Print every event until the channel closes. Returns the items that failed.
async fn print_progress(mut receiver: Receiver<ProgressEvent>) -> Vec<String> {
    let mut failed = Vec::new();
    while let Some(event) = receiver.recv().await {
        println!("{}", EventReport { event: &event, elapsed: event.started_at.elapsed() });
        if event.stage == Stage::Failed {
            failed.push(event.item_name);
        }
    }
    failed
}

struct EventReport<'a> {
    event: &'a ProgressEvent,
    elapsed: Duration,
}

impl fmt::Display for EventReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let EventReport { event, elapsed } = self;
        let ProgressEvent { item_name, stage, progress, error, .. } = event;
        write!(
            f,
            "{item_name} {stage:<12} {progress:>3}% [{elapsed}]",
            stage = stage.to_string(),
            elapsed = DisplayDuration(*elapsed),
        )?;
        if let Some(error) = error {
            write!(f, " - {error}")?;
        }
        Ok(())
    }
}

struct DisplayDuration(Duration);

impl fmt::Display for DisplayDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let DisplayDuration(duration) = *self;
        if duration < Duration::from_secs(1) {
            write!(f, "{}ms", duration.as_millis())
        } else if duration < Duration::from_secs(60) {
            write!(f, "{:.1}s", duration.as_secs_f64())
        } else {
            let seconds = duration.as_secs();
            write!(f, "{}m {}s", seconds / 60, seconds % 60)
        }
    }
}
