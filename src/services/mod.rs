pub mod air_date;
pub mod episode_matcher;
pub mod episode_refresh;
pub mod ignore;
pub mod refresh_controller;
pub mod scheduler;
pub mod series_refresh;
pub mod traits;

pub use episode_matcher::{EpisodeMatchError, EpisodeMatcher, MatchOutcome};
pub use episode_refresh::{EpisodeChanges, EpisodeInfoRefresher, EpisodeRefreshSummary, plan_changes};
pub use refresh_controller::{RefreshController, RefreshSeriesCommand, RefreshSummary};
pub use scheduler::Scheduler;
pub use series_refresh::{RefreshError, SeriesReconciler, SeriesRefreshOutcome};
pub use traits::{
    EpisodeRepository, EventPublisher, MetadataProvider, RemoteSeriesInfo, SeasonRepository,
    SeriesRepository,
};
