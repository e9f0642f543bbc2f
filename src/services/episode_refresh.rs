//! Episode half of a series refresh.
//!
//! [`plan_changes`] is the pure part: it matches every remote record,
//! partitions the results into new and updated episodes and spreads
//! colliding air dates. [`EpisodeInfoRefresher`] persists the plan and
//! publishes the matching events.

use std::sync::Arc;
use tracing::{error, info, trace};

use crate::domain::SeasonEpisode;
use crate::domain::events::LibraryEvent;
use crate::models::{Episode, RemoteEpisode, Season, Series};
use crate::services::air_date::resolve_air_date_conflicts;
use crate::services::episode_matcher::{EpisodeMatchError, EpisodeMatcher, MatchOutcome, apply_remote};
use crate::services::ignore::initial_ignored;
use crate::services::series_refresh::RefreshError;
use crate::services::traits::{EpisodeRepository, EventPublisher, SeasonRepository};

/// A remote record that could not be merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub numbering: SeasonEpisode,
    pub error: EpisodeMatchError,
}

/// Outcome of matching one series' remote episode list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EpisodeChanges {
    pub new: Vec<Episode>,
    pub updated: Vec<Episode>,
    pub failures: Vec<RecordFailure>,
    pub unlinked: usize,
    pub air_dates_adjusted: usize,
}

impl EpisodeChanges {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.new.len() + self.updated.len()
    }

    #[must_use]
    pub fn summary(&self) -> EpisodeRefreshSummary {
        EpisodeRefreshSummary {
            added: self.new.len(),
            updated: self.updated.len(),
            failed: self.failures.len(),
            unlinked: self.unlinked,
            air_dates_adjusted: self.air_dates_adjusted,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeRefreshSummary {
    pub added: usize,
    pub updated: usize,
    pub failed: usize,
    pub unlinked: usize,
    pub air_dates_adjusted: usize,
}

impl EpisodeRefreshSummary {
    #[must_use]
    pub const fn succeeded(&self) -> usize {
        self.added + self.updated
    }
}

/// Matches `remote` against `local` and builds the insert/update lists.
///
/// Records are processed in season/episode order. A record that fails is
/// logged and skipped; it never stops the records after it.
#[must_use]
pub fn plan_changes(
    series: &Series,
    remote: &[RemoteEpisode],
    local: Vec<Episode>,
    seasons: &[Season],
) -> EpisodeChanges {
    let mut ordered: Vec<&RemoteEpisode> = remote.iter().collect();
    ordered.sort_by_key(|e| e.numbering());

    let mut matcher = EpisodeMatcher::new(local, remote);
    let mut changes = EpisodeChanges::default();

    for record in ordered {
        trace!(
            series = %series.title,
            episode = %record.numbering(),
            "Updating episode info"
        );

        match matcher.resolve(record) {
            Ok(MatchOutcome::Existing(mut episode)) => {
                if apply_remote(&mut episode, record, series.id) {
                    changes.unlinked += 1;
                }
                changes.updated.push(episode);
            }
            Ok(MatchOutcome::New) => {
                let mut episode = Episode::new(series.id);
                episode.ignored = initial_ignored(record.numbering(), seasons);
                apply_remote(&mut episode, record, series.id);
                changes.new.push(episode);
            }
            Err(e) => {
                error!(
                    series_id = %series.id,
                    series = %series.title,
                    episode = %record.numbering(),
                    error = %e,
                    "An error has occurred while updating episode info"
                );
                changes.failures.push(RecordFailure {
                    numbering: record.numbering(),
                    error: e,
                });
            }
        }
    }

    changes.air_dates_adjusted = resolve_air_date_conflicts(
        changes.new.iter_mut().chain(changes.updated.iter_mut()),
        series.runtime,
    );

    changes
}

/// Loads the local episode state of a series, applies a [`plan_changes`]
/// plan and publishes `EpisodeInfoAdded` / `EpisodeInfoUpdated`.
#[derive(Clone)]
pub struct EpisodeInfoRefresher {
    episodes: Arc<dyn EpisodeRepository>,
    seasons: Arc<dyn SeasonRepository>,
    events: Arc<dyn EventPublisher>,
}

impl EpisodeInfoRefresher {
    #[must_use]
    pub fn new(
        episodes: Arc<dyn EpisodeRepository>,
        seasons: Arc<dyn SeasonRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            episodes,
            seasons,
            events,
        }
    }

    /// # Errors
    ///
    /// Returns [`RefreshError::Persistence`] if loading or saving episodes
    /// fails. Failures of single records are only counted.
    pub async fn refresh(
        &self,
        series: &Series,
        remote: &[RemoteEpisode],
    ) -> Result<EpisodeRefreshSummary, RefreshError> {
        trace!(series = %series.display_title(), "Starting episode info refresh");

        let local = self
            .episodes
            .list_by_series(series.id)
            .await
            .map_err(RefreshError::persistence("list episodes"))?;
        let seasons = self
            .seasons
            .list_by_series(series.id)
            .await
            .map_err(RefreshError::persistence("list seasons"))?;

        let changes = plan_changes(series, remote, local, &seasons);
        let summary = changes.summary();

        if !changes.new.is_empty() {
            self.episodes
                .insert_many(&changes.new)
                .await
                .map_err(RefreshError::persistence("insert episodes"))?;
        }
        if !changes.updated.is_empty() {
            self.episodes
                .update_many(&changes.updated)
                .await
                .map_err(RefreshError::persistence("update episodes"))?;
        }

        if !changes.new.is_empty() {
            self.events.publish(LibraryEvent::EpisodeInfoAdded {
                series: series.clone(),
                episodes: changes.new,
            });
        }
        if !changes.updated.is_empty() {
            self.events.publish(LibraryEvent::EpisodeInfoUpdated {
                episodes: changes.updated,
            });
        }

        record_metrics(&summary);

        if summary.failed == 0 {
            info!(
                series_id = %series.id,
                added = summary.added,
                updated = summary.updated,
                "Finished episode refresh for series: {}.",
                series.title
            );
        } else {
            info!(
                series_id = %series.id,
                "Finished episode refresh for series: {}. Successful: {} - Failed: {}",
                series.title,
                summary.succeeded(),
                summary.failed
            );
        }

        Ok(summary)
    }
}

fn record_metrics(summary: &EpisodeRefreshSummary) {
    let as_u64 = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
    metrics::counter!("episode_refresh_records_total", "outcome" => "added")
        .increment(as_u64(summary.added));
    metrics::counter!("episode_refresh_records_total", "outcome" => "updated")
        .increment(as_u64(summary.updated));
    metrics::counter!("episode_refresh_records_total", "outcome" => "failed")
        .increment(as_u64(summary.failed));
}
