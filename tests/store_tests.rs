use std::sync::Arc;

use chrono::{TimeZone, Utc};
use episodarr::config::Config;
use episodarr::db::Store;
use episodarr::domain::{EpisodeId, SeasonEpisode, SeriesId};
use episodarr::models::{Episode, RemoteEpisode, RemoteSeries, Season, SeriesImage};
use episodarr::services::{
    EpisodeRepository, MetadataProvider, RemoteSeriesInfo, SeriesRepository,
};
use episodarr::state::SharedState;

async fn memory_store() -> Store {
    // every pooled connection to sqlite::memory: is a separate database
    Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open in-memory store")
}

fn episode(series_id: SeriesId, external: i32, season: i32, number: i32) -> Episode {
    Episode {
        external_episode_id: Some(external),
        season_number: season,
        episode_number: number,
        title: Some(format!("Episode {number}")),
        air_date: Some(Utc.with_ymd_and_hms(2019, 4, 1, 1, 0, 0).unwrap()),
        ..Episode::new(series_id)
    }
}

#[tokio::test]
async fn series_round_trip() {
    let store = memory_store().await;
    store.ping().await.unwrap();

    let mut series = store.add_series(1505).await.unwrap();
    assert!(series.id.value() > 0);
    assert_eq!(series.last_info_sync, None);

    series.title = "Brooklyn Nine-Nine".to_string();
    series.images = vec![SeriesImage {
        cover_type: "poster".to_string(),
        url: "https://static.tvmaze.com/poster.jpg".to_string(),
    }];
    series.first_aired = chrono::NaiveDate::from_ymd_opt(2013, 9, 17);
    series.last_info_sync = Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    SeriesRepository::update(&store, &series).await.unwrap();

    let loaded = store.get_series(series.id).await.unwrap().unwrap();
    assert_eq!(loaded, series);
    assert_eq!(
        store.get_series_by_external_id(1505).await.unwrap().map(|s| s.id),
        Some(series.id)
    );
}

#[tokio::test]
async fn duplicate_external_id_is_rejected() {
    let store = memory_store().await;
    store.add_series(7).await.unwrap();
    assert!(store.add_series(7).await.is_err());
}

#[tokio::test]
async fn list_puts_never_synced_first() {
    let store = memory_store().await;
    let mut old = store.add_series(1).await.unwrap();
    let mut recent = store.add_series(2).await.unwrap();
    let never = store.add_series(3).await.unwrap();

    recent.last_info_sync = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    old.last_info_sync = Some(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
    SeriesRepository::update(&store, &recent).await.unwrap();
    SeriesRepository::update(&store, &old).await.unwrap();

    let ids: Vec<SeriesId> = store
        .list_series()
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![never.id, old.id, recent.id]);
}

#[tokio::test]
async fn episodes_insert_update_and_link() {
    let store = memory_store().await;
    let series = store.add_series(10).await.unwrap();

    store
        .insert_many(&[episode(series.id, 1, 1, 1), episode(series.id, 2, 1, 2)])
        .await
        .unwrap();

    let mut episodes = store.list_episodes(series.id).await.unwrap();
    assert_eq!(episodes.len(), 2);
    assert!(episodes.iter().all(|e| e.id.is_saved()));
    assert_eq!(episodes[0].numbering(), SeasonEpisode::new(1, 1));

    episodes[1].title = Some("Renamed".to_string());
    episodes[1].ignored = true;
    store.update_many(&episodes).await.unwrap();

    store.set_episode_file(episodes[0].id, 99).await.unwrap();

    let reloaded = store.list_episodes(series.id).await.unwrap();
    assert_eq!(reloaded[0].episode_file_id, 99);
    assert_eq!(reloaded[1].title.as_deref(), Some("Renamed"));
    assert!(reloaded[1].ignored);
    assert_eq!(reloaded[1].air_date, episodes[1].air_date);
}

#[tokio::test]
async fn updating_unsaved_episode_fails() {
    let store = memory_store().await;
    let series = store.add_series(11).await.unwrap();

    assert!(store.update_many(&[episode(series.id, 1, 1, 1)]).await.is_err());
    assert!(store.set_episode_file(EpisodeId::new(404), 1).await.is_err());
}

#[tokio::test]
async fn season_upsert_replaces_ignored_flag() {
    let store = memory_store().await;
    let series = store.add_series(12).await.unwrap();
    let mut season = Season {
        series_id: series.id,
        season_number: 2,
        ignored: false,
    };

    store.upsert_season(&season).await.unwrap();
    season.ignored = true;
    store.upsert_season(&season).await.unwrap();

    assert_eq!(store.list_seasons(series.id).await.unwrap(), vec![season]);
}

struct StaticProvider {
    info: std::sync::Mutex<RemoteSeriesInfo>,
}

#[async_trait::async_trait]
impl MetadataProvider for StaticProvider {
    async fn fetch(&self, _external_id: i32) -> anyhow::Result<RemoteSeriesInfo> {
        Ok(self.info.lock().unwrap().clone())
    }
}

fn remote(external: i32, season: i32, number: i32) -> RemoteEpisode {
    RemoteEpisode {
        external_episode_id: Some(external),
        season_number: season,
        episode_number: number,
        title: Some(format!("Remote {season}x{number}")),
        overview: None,
        air_date: None,
    }
}

#[tokio::test]
async fn refresh_against_sqlite_store() {
    let store = memory_store().await;
    let provider = Arc::new(StaticProvider {
        info: std::sync::Mutex::new(RemoteSeriesInfo {
            series: RemoteSeries {
                title: "Dark".to_string(),
                status: "Ended".to_string(),
                runtime: 60,
                ..RemoteSeries::default()
            },
            episodes: vec![remote(1, 1, 1), remote(2, 1, 2), remote(3, 0, 0)],
        }),
    });
    let state = SharedState::with_components(&Config::default(), store.clone(), provider.clone());

    let series = store.add_series(17861).await.unwrap();
    let outcome = state.refresh.refresh_series(series.id).await.unwrap();
    assert_eq!(outcome.episodes.added, 3);

    let episodes = store.list_episodes(series.id).await.unwrap();
    let pilot = episodes
        .iter()
        .find(|e| e.external_episode_id == Some(1))
        .unwrap();
    store.set_episode_file(pilot.id, 5).await.unwrap();

    // provider moves the pilot to S01E03
    provider.info.lock().unwrap().episodes[0] = remote(1, 1, 3);
    let outcome = state.refresh.refresh_series(series.id).await.unwrap();
    assert_eq!(outcome.episodes.added, 0);
    assert_eq!(outcome.episodes.updated, 3);
    assert_eq!(outcome.episodes.unlinked, 1);

    let reloaded = store.list_episodes(series.id).await.unwrap();
    assert_eq!(reloaded.len(), 3);
    let moved = reloaded.iter().find(|e| e.id == pilot.id).unwrap();
    assert_eq!(moved.numbering(), SeasonEpisode::new(1, 3));
    assert_eq!(moved.episode_file_id, 0);

    let synced = store.get_series(series.id).await.unwrap().unwrap();
    assert_eq!(synced.title, "Dark");
    assert_eq!(synced.clean_title, "dark");
    assert!(synced.last_info_sync.is_some());
}
