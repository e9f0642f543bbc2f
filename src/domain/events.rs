//! Library change events.
//!
//! Events are plain value payloads sent over the in-process event bus. The
//! refresh engine consumes [`LibraryEvent::SeriesAdded`] and produces the
//! other variants.

use serde::Serialize;

use crate::models::{Episode, Series};

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum LibraryEvent {
    /// A series row was created and still needs its first refresh.
    SeriesAdded { series: Series },

    /// Series-level fields were refreshed. Published after the episode lists
    /// of the same refresh have been persisted.
    SeriesUpdated { series: Series },

    EpisodeInfoAdded {
        series: Series,
        episodes: Vec<Episode>,
    },

    EpisodeInfoUpdated { episodes: Vec<Episode> },
}

impl LibraryEvent {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SeriesAdded { .. } => "SeriesAdded",
            Self::SeriesUpdated { .. } => "SeriesUpdated",
            Self::EpisodeInfoAdded { .. } => "EpisodeInfoAdded",
            Self::EpisodeInfoUpdated { .. } => "EpisodeInfoUpdated",
        }
    }
}
