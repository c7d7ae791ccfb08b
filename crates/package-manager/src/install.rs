use std::time::Instant;
use tapster_executor::{Brew, ProgressEvent, Stage};
use tokio::sync::mpsc::Sender;

/// This subroutine installs items one after another and reports their progress.
///
/// Every item gets a `starting` event, the events recognized in the output of `brew`, and
/// then exactly one terminal event. A failed item does not stop the items after it.
/// The channel is closed once the subroutine returns.
#[must_use]
pub struct Install<'a, ItemList>
where
    ItemList: IntoIterator,
    ItemList::Item: AsRef<str>,
{
    pub brew: &'a Brew,
    pub items: ItemList,
    pub events: Sender<ProgressEvent>,
}

impl<'a, ItemList> Install<'a, ItemList>
where
    ItemList: IntoIterator,
    ItemList::Item: AsRef<str>,
{
    /// Execute the subroutine.
    pub async fn run(self) {
        let Install { brew, items, events } = self;

        tracing::info!(target: "tapster::install", "Start all");

        for item in items {
            let item = item.as_ref();
            let started_at = Instant::now();
            emit(&events, ProgressEvent::new(item, Stage::Starting, 0, started_at)).await;

            let terminal = match brew.install(item, started_at, &events).await {
                Ok(()) => ProgressEvent::new(item, Stage::Completed, 100, started_at),
                Err(error) => {
                    tracing::warn!(target: "tapster::install", ?item, %error, "Failed");
                    ProgressEvent::failed(item, started_at, error)
                }
            };
            emit(&events, terminal).await;
        }

        tracing::info!(target: "tapster::install", "Complete all");
    }
}

async fn emit(events: &Sender<ProgressEvent>, event: ProgressEvent) {
    if let Err(error) = events.send(event).await {
        let event = error.0;
        tracing::debug!(
            target: "tapster::install",
            item = ?event.item_name,
            stage = %event.stage,
            "Nobody is listening to progress events",
        );
    }
}
