use crate::InstallError;
use derive_more::Display;
use std::{sync::Arc, time::Instant};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::mpsc::Sender,
    task::JoinHandle,
};

/// Stage of the installation of one item.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    #[display("starting")]
    Starting,
    #[display("downloading")]
    Downloading,
    #[display("installing")]
    Installing,
    #[display("linking")]
    Linking,
    #[display("completed")]
    Completed,
    #[display("failed")]
    Failed,
}

impl Stage {
    /// No further event follows a terminal stage for the same item.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }
}

/// Progress of the installation of one item.
#[derive(Debug)]
pub struct ProgressEvent {
    pub item_name: String,
    pub stage: Stage,
    /// Percentage between 0 and 100.
    pub progress: u8,
    /// When the installation of the item started.
    pub started_at: Instant,
    /// Only present on [`Stage::Failed`].
    pub error: Option<InstallError>,
}

impl ProgressEvent {
    pub fn new(
        item_name: impl Into<String>,
        stage: Stage,
        progress: u8,
        started_at: Instant,
    ) -> Self {
        ProgressEvent { item_name: item_name.into(), stage, progress, started_at, error: None }
    }

    pub fn failed(item_name: impl Into<String>, started_at: Instant, error: InstallError) -> Self {
        ProgressEvent {
            item_name: item_name.into(),
            stage: Stage::Failed,
            progress: 0,
            started_at,
            error: Some(error),
        }
    }
}

/// Ordered rules of [`classify_line`]. The first rule whose needle occurs in the line wins.
const LINE_RULES: &[(&str, Stage, u8)] = &[
    ("downloading", Stage::Downloading, 25),
    ("installing", Stage::Installing, 50),
    ("pouring", Stage::Installing, 60),
    ("linking", Stage::Linking, 90),
    ("installed", Stage::Completed, 100),
];

/// Map one output line of `brew install` to a stage and a percentage.
///
/// Returns `None` for lines that say nothing about progress.
pub fn classify_line(line: &str) -> Option<(Stage, u8)> {
    let line = line.to_lowercase();
    LINE_RULES
        .iter()
        .find(|(needle, ..)| line.contains(needle))
        .map(|&(_, stage, progress)| (stage, progress))
}

/// Turns the output of one install process into [`ProgressEvent`]s.
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    item_name: Arc<str>,
    started_at: Instant,
    events: Sender<ProgressEvent>,
}

impl ProgressMonitor {
    pub fn new(item_name: &str, started_at: Instant, events: Sender<ProgressEvent>) -> Self {
        ProgressMonitor { item_name: item_name.into(), started_at, events }
    }

    /// Scan `stdout` and `stderr` concurrently until both reach the end.
    ///
    /// Events of the two streams share one channel and may interleave in any order.
    pub fn watch<Stdout, Stderr>(
        &self,
        stdout: Option<Stdout>,
        stderr: Option<Stderr>,
    ) -> MonitorHandle
    where
        Stdout: AsyncRead + Unpin + Send + 'static,
        Stderr: AsyncRead + Unpin + Send + 'static,
    {
        let mut scanners = Vec::with_capacity(2);
        if let Some(stdout) = stdout {
            scanners.push(tokio::spawn(self.clone().scan(stdout, "stdout")));
        }
        if let Some(stderr) = stderr {
            scanners.push(tokio::spawn(self.clone().scan(stderr, "stderr")));
        }
        MonitorHandle { scanners }
    }

    async fn scan<Stream>(self, stream: Stream, stream_name: &'static str)
    where
        Stream: AsyncRead + Unpin,
    {
        let ProgressMonitor { item_name, started_at, events } = self;
        let mut segments = BufReader::new(stream).split(b'\n');
        let mut receiver_dropped = false;

        loop {
            let segment = match segments.next_segment().await {
                Ok(Some(segment)) => segment,
                Ok(None) => break,
                Err(error) => {
                    tracing::warn!(
                        target: "tapster::progress",
                        stream = stream_name,
                        %error,
                        "Failed to read output",
                    );
                    break;
                }
            };

            // the stream is drained to the end even after the receiver is gone so that the
            // process never blocks on a full pipe
            if receiver_dropped {
                continue;
            }

            let line = String::from_utf8_lossy(&segment);
            let line = line.trim_end_matches('\r');
            tracing::trace!(target: "tapster::progress", stream = stream_name, ?line);

            let Some((stage, progress)) = classify_line(line) else {
                continue;
            };
            let event = ProgressEvent::new(&*item_name, stage, progress, started_at);
            if events.send(event).await.is_err() {
                tracing::debug!(target: "tapster::progress", ?item_name, "Receiver dropped");
                receiver_dropped = true;
            }
        }
    }
}

/// Scanners started by [`ProgressMonitor::watch`].
#[must_use]
#[derive(Debug)]
pub struct MonitorHandle {
    scanners: Vec<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Wait for every scanner to reach the end of its stream.
    pub async fn join(self) {
        for scanner in self.scanners {
            if let Err(error) = scanner.await {
                tracing::error!(target: "tapster::progress", %error, "Scanner failed");
            }
        }
    }
}
