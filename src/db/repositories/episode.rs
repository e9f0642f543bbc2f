use crate::db::repositories::{format_timestamp, parse_timestamp};
use crate::domain::{EpisodeId, SeriesId};
use crate::entities::{episodes, prelude::*};
use crate::models::Episode;
use anyhow::Result;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait, sea_query::Expr,
};

/// Repository for episode rows
pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: episodes::Model) -> Result<Episode> {
        Ok(Episode {
            id: EpisodeId::new(m.id),
            series_id: SeriesId::new(m.series_id),
            external_episode_id: m.external_episode_id,
            season_number: m.season_number,
            episode_number: m.episode_number,
            title: m.title,
            overview: m.overview,
            air_date: m.air_date.as_deref().map(parse_timestamp).transpose()?,
            episode_file_id: m.episode_file_id,
            ignored: m.ignored,
        })
    }

    fn to_active_model(episode: &Episode) -> episodes::ActiveModel {
        episodes::ActiveModel {
            id: if episode.id.is_saved() {
                Set(episode.id.value())
            } else {
                NotSet
            },
            series_id: Set(episode.series_id.value()),
            external_episode_id: Set(episode.external_episode_id),
            season_number: Set(episode.season_number),
            episode_number: Set(episode.episode_number),
            title: Set(episode.title.clone()),
            overview: Set(episode.overview.clone()),
            air_date: Set(episode.air_date.map(format_timestamp)),
            episode_file_id: Set(episode.episode_file_id),
            ignored: Set(episode.ignored),
        }
    }

    pub async fn list_by_series(&self, series_id: i32) -> Result<Vec<Episode>> {
        let rows = Episodes::find()
            .filter(episodes::Column::SeriesId.eq(series_id))
            .order_by_asc(episodes::Column::SeasonNumber)
            .order_by_asc(episodes::Column::EpisodeNumber)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    /// Inserts all episodes in one transaction.
    pub async fn insert_many(&self, episodes: &[Episode]) -> Result<()> {
        if episodes.is_empty() {
            return Ok(());
        }

        let active_models: Vec<episodes::ActiveModel> = episodes
            .iter()
            .map(|episode| {
                let mut model = Self::to_active_model(episode);
                model.id = NotSet;
                model
            })
            .collect();

        let txn = self.conn.begin().await?;
        // 10 columns per row keeps 100-row batches under SQLite's variable limit
        for chunk in active_models.chunks(100) {
            Episodes::insert_many(chunk.to_vec()).exec(&txn).await?;
        }
        txn.commit().await?;

        Ok(())
    }

    /// Writes every episode back in one transaction; all rows must already exist.
    pub async fn update_many(&self, episodes: &[Episode]) -> Result<()> {
        if episodes.is_empty() {
            return Ok(());
        }

        if let Some(unsaved) = episodes.iter().find(|e| !e.id.is_saved()) {
            anyhow::bail!(
                "Cannot update episode {} of series {} that has not been saved",
                unsaved.numbering(),
                unsaved.series_id
            );
        }

        let txn = self.conn.begin().await?;
        for episode in episodes {
            Episodes::update(Self::to_active_model(episode))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        Ok(())
    }

    /// Links (or with `0`, unlinks) a media file.
    pub async fn set_file(&self, episode_id: i32, episode_file_id: i32) -> Result<()> {
        let result = Episodes::update_many()
            .col_expr(episodes::Column::EpisodeFileId, Expr::value(episode_file_id))
            .filter(episodes::Column::Id.eq(episode_id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            anyhow::bail!("Episode {episode_id} not found");
        }

        Ok(())
    }
}
