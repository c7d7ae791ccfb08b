use crate::{Brew, InstallError, ProgressEvent, ProgressMonitor};
use std::{process::Stdio, time::Instant};
use tokio::sync::mpsc::Sender;

impl Brew {
    /// Run `brew install <item_name>` and publish the progress it prints on `events`.
    ///
    /// Only line-based events are sent here. Every scanner has finished by the time this
    /// function returns, so the caller may follow up with a terminal event.
    pub async fn install(
        &self,
        item_name: &str,
        started_at: Instant,
        events: &Sender<ProgressEvent>,
    ) -> Result<(), InstallError> {
        tracing::info!(target: "tapster::install", ?item_name, "Start installing");

        let mut child = self
            .command()
            .arg("install")
            .arg(item_name)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| InstallError::Spawn { item: item_name.to_string(), error })?;

        let monitor = ProgressMonitor::new(item_name, started_at, events.clone())
            .watch(child.stdout.take(), child.stderr.take());
        let status = child.wait().await;
        monitor.join().await;

        let status =
            status.map_err(|error| InstallError::Wait { item: item_name.to_string(), error })?;
        if !status.success() {
            return Err(InstallError::Exit { item: item_name.to_string(), status });
        }

        tracing::info!(
            target: "tapster::install",
            ?item_name,
            elapsed = ?started_at.elapsed(),
            "Installed",
        );
        Ok(())
    }
}
