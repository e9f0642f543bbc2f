use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EpisodeId, SeasonEpisode, SeriesId};

/// An episode row in the local library.
///
/// `episode_file_id` and `ignored` are locally owned and survive refreshes;
/// every other field is overwritten from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub series_id: SeriesId,
    pub external_episode_id: Option<i32>,
    pub season_number: i32,
    pub episode_number: i32,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<DateTime<Utc>>,
    /// 0 when no media file is linked.
    pub episode_file_id: i32,
    pub ignored: bool,
}

impl Episode {
    /// An unsaved episode for `series_id`; fields are filled from the remote record.
    #[must_use]
    pub const fn new(series_id: SeriesId) -> Self {
        Self {
            id: EpisodeId::UNSAVED,
            series_id,
            external_episode_id: None,
            season_number: 0,
            episode_number: 0,
            title: None,
            overview: None,
            air_date: None,
            episode_file_id: 0,
            ignored: false,
        }
    }

    #[must_use]
    pub const fn numbering(&self) -> SeasonEpisode {
        SeasonEpisode::new(self.season_number, self.episode_number)
    }

    #[must_use]
    pub const fn has_file(&self) -> bool {
        self.episode_file_id != 0
    }
}

/// An episode as reported by the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEpisode {
    pub external_episode_id: Option<i32>,
    pub season_number: i32,
    pub episode_number: i32,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<DateTime<Utc>>,
}

impl RemoteEpisode {
    #[must_use]
    pub const fn numbering(&self) -> SeasonEpisode {
        SeasonEpisode::new(self.season_number, self.episode_number)
    }
}
