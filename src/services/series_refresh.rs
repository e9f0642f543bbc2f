//! Series-level refresh: pulls the provider record, replaces the descriptive
//! fields of the local row and hands the episode list to
//! [`EpisodeInfoRefresher`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::SeriesId;
use crate::domain::events::LibraryEvent;
use crate::models::{RemoteSeries, Series};
use crate::parser::normalize_title;
use crate::services::episode_refresh::{EpisodeInfoRefresher, EpisodeRefreshSummary};
use crate::services::traits::{
    EpisodeRepository, EventPublisher, MetadataProvider, SeasonRepository, SeriesRepository,
};

/// Errors that abort the refresh of one series.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Series {0} not found")]
    SeriesNotFound(SeriesId),

    #[error("Metadata provider error for series {series_id} (external id {external_id}): {message}")]
    Provider {
        series_id: SeriesId,
        external_id: i32,
        message: String,
    },

    #[error("Persistence error ({operation}): {message}")]
    Persistence {
        operation: &'static str,
        message: String,
    },
}

impl RefreshError {
    pub(crate) fn persistence(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |e| Self::Persistence {
            operation,
            message: format!("{e:#}"),
        }
    }
}

/// Result of a successful series refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRefreshOutcome {
    pub series: Series,
    pub episodes: EpisodeRefreshSummary,
}

/// Replaces the descriptive fields of `series` with the provider values.
///
/// This is a full replace: a field the provider no longer reports is cleared.
pub fn merge_remote_series(series: &mut Series, remote: RemoteSeries, synced_at: DateTime<Utc>) {
    series.clean_title = normalize_title(&remote.title);
    series.title = remote.title;
    series.air_time = remote.air_time;
    series.overview = remote.overview;
    series.status = remote.status;
    series.runtime = remote.runtime;
    series.images = remote.images;
    series.network = remote.network;
    series.first_aired = remote.first_aired;
    series.last_info_sync = Some(synced_at);
}

pub struct SeriesReconciler {
    provider: Arc<dyn MetadataProvider>,
    series: Arc<dyn SeriesRepository>,
    episodes: EpisodeInfoRefresher,
    events: Arc<dyn EventPublisher>,
}

impl SeriesReconciler {
    #[must_use]
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        series: Arc<dyn SeriesRepository>,
        episodes: Arc<dyn EpisodeRepository>,
        seasons: Arc<dyn SeasonRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            provider,
            series,
            episodes: EpisodeInfoRefresher::new(episodes, seasons, Arc::clone(&events)),
            events,
        }
    }

    /// Refreshes one series and its episodes.
    ///
    /// `SeriesUpdated` is published after the episode lists are persisted.
    ///
    /// # Errors
    ///
    /// - [`RefreshError::SeriesNotFound`] if the local row does not exist
    /// - [`RefreshError::Provider`] if the metadata fetch fails
    /// - [`RefreshError::Persistence`] if any repository call fails
    pub async fn refresh(&self, id: SeriesId) -> Result<SeriesRefreshOutcome, RefreshError> {
        let mut series = self
            .series
            .get(id)
            .await
            .map_err(RefreshError::persistence("get series"))?
            .ok_or(RefreshError::SeriesNotFound(id))?;

        debug!(series_id = %id, external_id = series.external_id, "Fetching series info");

        let remote = self
            .provider
            .fetch(series.external_id)
            .await
            .map_err(|e| RefreshError::Provider {
                series_id: id,
                external_id: series.external_id,
                message: format!("{e:#}"),
            })?;

        merge_remote_series(&mut series, remote.series, Utc::now());

        self.series
            .update(&series)
            .await
            .map_err(RefreshError::persistence("update series"))?;

        info!(series_id = %id, title = %series.title, "Updated series info");

        let episodes = self.episodes.refresh(&series, &remote.episodes).await?;

        self.events.publish(LibraryEvent::SeriesUpdated {
            series: series.clone(),
        });

        Ok(SeriesRefreshOutcome { series, episodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesImage;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn merge_replaces_descriptive_fields() {
        let mut series = Series {
            title: "Old Title".to_string(),
            overview: Some("Old overview".to_string()),
            network: Some("Old Network".to_string()),
            runtime: 60,
            ..Series::placeholder(SeriesId::new(4), 81189)
        };
        let remote = RemoteSeries {
            title: "The New Title".to_string(),
            air_time: Some("21:00".to_string()),
            overview: None,
            status: "Ended".to_string(),
            runtime: 45,
            images: vec![SeriesImage {
                cover_type: "poster".to_string(),
                url: "https://example.org/poster.jpg".to_string(),
            }],
            network: None,
            first_aired: NaiveDate::from_ymd_opt(2008, 1, 20),
        };
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        merge_remote_series(&mut series, remote, now);

        assert_eq!(series.id, SeriesId::new(4));
        assert_eq!(series.external_id, 81189);
        assert_eq!(series.title, "The New Title");
        assert_eq!(series.clean_title, "newtitle");
        assert_eq!(series.overview, None);
        assert_eq!(series.network, None);
        assert_eq!(series.runtime, 45);
        assert_eq!(series.status, "Ended");
        assert_eq!(series.images.len(), 1);
        assert_eq!(series.last_info_sync, Some(now));
    }

    #[test]
    fn persistence_error_keeps_operation() {
        let err = RefreshError::persistence("update series")(anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "Persistence error (update series): disk full");
    }
}
