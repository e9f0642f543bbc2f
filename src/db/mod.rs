use crate::domain::{EpisodeId, SeriesId};
use crate::models::{Episode, Season, Series};
use crate::services::traits;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn series_repo(&self) -> repositories::series::SeriesRepository {
        repositories::series::SeriesRepository::new(self.conn.clone())
    }

    fn episode_repo(&self) -> repositories::episode::EpisodeRepository {
        repositories::episode::EpisodeRepository::new(self.conn.clone())
    }

    fn season_repo(&self) -> repositories::season::SeasonRepository {
        repositories::season::SeasonRepository::new(self.conn.clone())
    }

    pub async fn add_series(&self, external_id: i32) -> Result<Series> {
        self.series_repo().add(external_id).await
    }

    pub async fn get_series(&self, id: SeriesId) -> Result<Option<Series>> {
        self.series_repo().get(id.value()).await
    }

    pub async fn get_series_by_external_id(&self, external_id: i32) -> Result<Option<Series>> {
        self.series_repo().get_by_external_id(external_id).await
    }

    pub async fn list_series(&self) -> Result<Vec<Series>> {
        self.series_repo().list().await
    }

    pub async fn list_episodes(&self, series_id: SeriesId) -> Result<Vec<Episode>> {
        self.episode_repo().list_by_series(series_id.value()).await
    }

    pub async fn list_seasons(&self, series_id: SeriesId) -> Result<Vec<Season>> {
        self.season_repo().list_by_series(series_id.value()).await
    }

    pub async fn upsert_season(&self, season: &Season) -> Result<()> {
        self.season_repo().upsert(season).await
    }

    pub async fn set_episode_file(&self, episode_id: EpisodeId, episode_file_id: i32) -> Result<()> {
        self.episode_repo()
            .set_file(episode_id.value(), episode_file_id)
            .await
    }
}

#[async_trait::async_trait]
impl traits::SeriesRepository for Store {
    async fn get(&self, id: SeriesId) -> Result<Option<Series>> {
        self.get_series(id).await
    }

    async fn list(&self) -> Result<Vec<Series>> {
        self.list_series().await
    }

    async fn update(&self, series: &Series) -> Result<()> {
        self.series_repo().update(series).await
    }
}

#[async_trait::async_trait]
impl traits::EpisodeRepository for Store {
    async fn list_by_series(&self, series_id: SeriesId) -> Result<Vec<Episode>> {
        self.list_episodes(series_id).await
    }

    async fn insert_many(&self, episodes: &[Episode]) -> Result<()> {
        self.episode_repo().insert_many(episodes).await
    }

    async fn update_many(&self, episodes: &[Episode]) -> Result<()> {
        self.episode_repo().update_many(episodes).await
    }
}

#[async_trait::async_trait]
impl traits::SeasonRepository for Store {
    async fn list_by_series(&self, series_id: SeriesId) -> Result<Vec<Season>> {
        self.list_seasons(series_id).await
    }
}
