//! Entry points for series refreshes: a refresh command for one or all
//! series, and the `SeriesAdded` listener.
//!
//! Refreshes of the same series are serialized through a per-series lock, so
//! a command and a `SeriesAdded` notification for the same id cannot
//! interleave their read-modify-write of the series and its episodes.
//! Different series are not blocked by each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::SeriesId;
use crate::domain::events::LibraryEvent;
use crate::services::series_refresh::{RefreshError, SeriesReconciler, SeriesRefreshOutcome};
use crate::services::traits::SeriesRepository;

/// Refresh request. `series_id: None` refreshes every known series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshSeriesCommand {
    pub series_id: Option<SeriesId>,
}

impl RefreshSeriesCommand {
    #[must_use]
    pub const fn single(series_id: SeriesId) -> Self {
        Self {
            series_id: Some(series_id),
        }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self { series_id: None }
    }
}

#[derive(Debug, Default)]
pub struct RefreshSummary {
    pub refreshed: Vec<SeriesId>,
    pub failed: Vec<(SeriesId, RefreshError)>,
}

impl RefreshSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct RefreshController {
    reconciler: SeriesReconciler,
    series: Arc<dyn SeriesRepository>,
    locks: Mutex<HashMap<SeriesId, Arc<tokio::sync::Mutex<()>>>>,
}

impl RefreshController {
    #[must_use]
    pub fn new(reconciler: SeriesReconciler, series: Arc<dyn SeriesRepository>) -> Self {
        Self {
            reconciler,
            series,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Runs a refresh command.
    ///
    /// # Errors
    ///
    /// For a single series, the [`RefreshError`] of that series. For
    /// refresh-all, only a failure to list the series; per-series failures
    /// are reported in the summary.
    pub async fn execute(
        &self,
        command: RefreshSeriesCommand,
    ) -> Result<RefreshSummary, RefreshError> {
        match command.series_id {
            Some(id) => {
                self.refresh_series(id).await?;
                Ok(RefreshSummary {
                    refreshed: vec![id],
                    failed: Vec::new(),
                })
            }
            None => self.refresh_all().await,
        }
    }

    /// Refreshes one series while holding its lock.
    ///
    /// # Errors
    ///
    /// See [`SeriesReconciler::refresh`].
    pub async fn refresh_series(&self, id: SeriesId) -> Result<SeriesRefreshOutcome, RefreshError> {
        let lock = self.lock_for(id);
        let guard = lock.lock().await;

        let result = self.reconciler.refresh(id).await;

        drop(guard);
        self.release_lock(id, lock);

        let outcome = if result.is_ok() { "succeeded" } else { "failed" };
        metrics::counter!("series_refresh_total", "outcome" => outcome).increment(1);
        result
    }

    /// Refreshes every known series, least recently synced first.
    ///
    /// Series are processed one after another and a failing series does not
    /// stop the ones after it.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Persistence`] if the series list cannot be loaded.
    pub async fn refresh_all(&self) -> Result<RefreshSummary, RefreshError> {
        let start = Instant::now();
        let mut all = self
            .series
            .list()
            .await
            .map_err(RefreshError::persistence("list series"))?;
        all.sort_by_key(|s| s.last_info_sync);

        info!(
            event = "series_refresh_started",
            count = all.len(),
            "Refreshing all series"
        );

        let mut summary = RefreshSummary::default();
        for series in all {
            match self.refresh_series(series.id).await {
                Ok(_) => summary.refreshed.push(series.id),
                Err(e) => {
                    error!(
                        series_id = %series.id,
                        series = %series.display_title(),
                        error = %e,
                        "Failed to refresh series"
                    );
                    summary.failed.push((series.id, e));
                }
            }
        }

        info!(
            event = "series_refresh_finished",
            refreshed = summary.refreshed.len(),
            failed = summary.failed.len(),
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Series refresh complete"
        );

        Ok(summary)
    }

    /// Listens for `SeriesAdded` on `event_bus` and refreshes each new series.
    pub fn start_listener(
        self: Arc<Self>,
        event_bus: &broadcast::Sender<LibraryEvent>,
    ) -> JoinHandle<()> {
        let mut rx = event_bus.subscribe();
        let controller = self;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(LibraryEvent::SeriesAdded { series }) => {
                        info!(series_id = %series.id, "Series added, running initial refresh");
                        if let Err(e) = controller.refresh_series(series.id).await {
                            error!(series_id = %series.id, error = %e, "Initial series refresh failed");
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!(count, "Series-added listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Event bus closed, stopping series-added listener");
                        break;
                    }
                }
            }
        })
    }

    /// Number of series that currently have a refresh running or waiting.
    #[must_use]
    pub fn active_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn lock_for(&self, id: SeriesId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    /// Drops the map entry once no other refresh holds or waits on it.
    /// Handles are only cloned under the map lock, so the count is stable here.
    fn release_lock(&self, id: SeriesId, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&id);
        }
    }
}
