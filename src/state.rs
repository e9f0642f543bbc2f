use std::sync::Arc;
use tokio::sync::broadcast;

use crate::clients::tvmaze::TvMazeClient;
use crate::config::{Config, MetadataConfig};
use crate::db::Store;
use crate::domain::events::LibraryEvent;
use crate::services::traits::{
    EpisodeRepository, EventPublisher, MetadataProvider, SeasonRepository, SeriesRepository,
};
use crate::services::{RefreshController, SeriesReconciler};

/// Build the HTTP client used for metadata calls.
fn build_shared_http_client(config: &MetadataConfig) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub store: Store,

    pub event_bus: broadcast::Sender<LibraryEvent>,

    pub refresh: Arc<RefreshController>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(&config.metadata)?;
        let metadata: Arc<dyn MetadataProvider> = Arc::new(TvMazeClient::new(
            http_client,
            config.metadata.base_url.clone(),
        ));

        Ok(Self::with_components(&config, store, metadata))
    }

    /// Wires the refresh engine around an existing store and provider.
    #[must_use]
    pub fn with_components(
        config: &Config,
        store: Store,
        metadata: Arc<dyn MetadataProvider>,
    ) -> Self {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size.max(1));

        let store_arc = Arc::new(store.clone());
        let reconciler = SeriesReconciler::new(
            metadata,
            store_arc.clone() as Arc<dyn SeriesRepository>,
            store_arc.clone() as Arc<dyn EpisodeRepository>,
            store_arc.clone() as Arc<dyn SeasonRepository>,
            Arc::new(event_bus.clone()) as Arc<dyn EventPublisher>,
        );
        let refresh = Arc::new(RefreshController::new(
            reconciler,
            store_arc as Arc<dyn SeriesRepository>,
        ));

        Self {
            store,
            event_bus,
            refresh,
        }
    }

    pub fn publish(&self, event: LibraryEvent) {
        self.event_bus.publish(event);
    }
}
