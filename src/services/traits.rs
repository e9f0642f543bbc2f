//! Capabilities the refresh engine consumes.
//!
//! The engine only sees these traits; the SQLite store, the HTTP metadata
//! client and the broadcast event bus are wired in by [`crate::state`].

use crate::domain::SeriesId;
use crate::domain::events::LibraryEvent;
use crate::models::{Episode, RemoteEpisode, RemoteSeries, Season, Series};

/// Remote catalog record for one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSeriesInfo {
    pub series: RemoteSeries,
    pub episodes: Vec<RemoteEpisode>,
}

#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetches the series and its full episode list by provider id.
    ///
    /// # Errors
    ///
    /// Network, HTTP status and payload errors.
    async fn fetch(&self, external_id: i32) -> anyhow::Result<RemoteSeriesInfo>;
}

#[async_trait::async_trait]
pub trait SeriesRepository: Send + Sync {
    async fn get(&self, id: SeriesId) -> anyhow::Result<Option<Series>>;

    async fn list(&self) -> anyhow::Result<Vec<Series>>;

    async fn update(&self, series: &Series) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait EpisodeRepository: Send + Sync {
    async fn list_by_series(&self, series_id: SeriesId) -> anyhow::Result<Vec<Episode>>;

    async fn insert_many(&self, episodes: &[Episode]) -> anyhow::Result<()>;

    async fn update_many(&self, episodes: &[Episode]) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
pub trait SeasonRepository: Send + Sync {
    async fn list_by_series(&self, series_id: SeriesId) -> anyhow::Result<Vec<Season>>;
}

/// Fire-and-forget event sink.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: LibraryEvent);
}

impl EventPublisher for tokio::sync::broadcast::Sender<LibraryEvent> {
    fn publish(&self, event: LibraryEvent) {
        let kind = event.kind();
        // An error only means nobody is subscribed right now.
        if self.send(event).is_err() {
            tracing::trace!(event = kind, "No subscribers for library event");
        }
    }
}
