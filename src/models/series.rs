use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::SeriesId;

/// A series row as stored in the local library.
///
/// Descriptive fields are owned by the refresh engine and are replaced
/// wholesale from the metadata provider on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub external_id: i32,
    pub title: String,
    pub clean_title: String,
    pub air_time: Option<String>,
    pub overview: Option<String>,
    pub status: String,
    /// Runtime of one episode in minutes.
    pub runtime: i32,
    #[serde(default)]
    pub images: Vec<SeriesImage>,
    pub network: Option<String>,
    pub first_aired: Option<NaiveDate>,
    /// `None` until the first successful refresh, so never-synced series sort first.
    pub last_info_sync: Option<DateTime<Utc>>,
}

impl Series {
    /// A freshly added series that only knows its provider id.
    #[must_use]
    pub fn placeholder(id: SeriesId, external_id: i32) -> Self {
        Self {
            id,
            external_id,
            title: String::new(),
            clean_title: String::new(),
            air_time: None,
            overview: None,
            status: "unknown".to_string(),
            runtime: 0,
            images: Vec::new(),
            network: None,
            first_aired: None,
            last_info_sync: None,
        }
    }

    /// Title for log lines, falling back to the id for series that were never synced.
    #[must_use]
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            format!("Series #{}", self.id)
        } else {
            self.title.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesImage {
    pub cover_type: String,
    pub url: String,
}

/// Series-level fields as reported by the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteSeries {
    pub title: String,
    pub air_time: Option<String>,
    pub overview: Option<String>,
    pub status: String,
    pub runtime: i32,
    pub images: Vec<SeriesImage>,
    pub network: Option<String>,
    pub first_aired: Option<NaiveDate>,
}
