use crate::db::repositories::{format_timestamp, parse_timestamp};
use crate::domain::SeriesId;
use crate::entities::{prelude::Series as SeriesEntity, series};
use crate::models::{Series, SeriesImage};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::info;

pub struct SeriesRepository {
    conn: DatabaseConnection,
}

impl SeriesRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: series::Model) -> Result<Series> {
        let images: Vec<SeriesImage> = model
            .images
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .with_context(|| format!("Invalid images for series {}", model.id))?
            .unwrap_or_default();

        let first_aired = model
            .first_aired
            .as_deref()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
            .transpose()
            .with_context(|| format!("Invalid first_aired for series {}", model.id))?;

        let last_info_sync = model
            .last_info_sync
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(Series {
            id: SeriesId::new(model.id),
            external_id: model.external_id,
            title: model.title,
            clean_title: model.clean_title,
            air_time: model.air_time,
            overview: model.overview,
            status: model.status,
            runtime: model.runtime,
            images,
            network: model.network,
            first_aired,
            last_info_sync,
        })
    }

    fn to_active_model(series: &Series) -> Result<series::ActiveModel> {
        let images = if series.images.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&series.images)?)
        };

        Ok(series::ActiveModel {
            id: if series.id.value() == 0 {
                NotSet
            } else {
                Set(series.id.value())
            },
            external_id: Set(series.external_id),
            title: Set(series.title.clone()),
            clean_title: Set(series.clean_title.clone()),
            air_time: Set(series.air_time.clone()),
            overview: Set(series.overview.clone()),
            status: Set(series.status.clone()),
            runtime: Set(series.runtime),
            images: Set(images),
            network: Set(series.network.clone()),
            first_aired: Set(series.first_aired.map(|d| d.format("%Y-%m-%d").to_string())),
            last_info_sync: Set(series.last_info_sync.map(format_timestamp)),
        })
    }

    /// Inserts a placeholder row for `external_id` and returns it with its new id.
    pub async fn add(&self, external_id: i32) -> Result<Series> {
        if self.get_by_external_id(external_id).await?.is_some() {
            anyhow::bail!("Series with external id {external_id} already exists");
        }

        let placeholder = Series::placeholder(SeriesId::default(), external_id);
        let result = SeriesEntity::insert(Self::to_active_model(&placeholder)?)
            .exec(&self.conn)
            .await?;

        info!(external_id, id = result.last_insert_id, "Added series");

        Ok(Series {
            id: SeriesId::new(result.last_insert_id),
            ..placeholder
        })
    }

    pub async fn get(&self, id: i32) -> Result<Option<Series>> {
        SeriesEntity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(Self::map_model)
            .transpose()
    }

    pub async fn get_by_external_id(&self, external_id: i32) -> Result<Option<Series>> {
        SeriesEntity::find()
            .filter(series::Column::ExternalId.eq(external_id))
            .one(&self.conn)
            .await?
            .map(Self::map_model)
            .transpose()
    }

    /// All series, never-synced first, then least recently synced.
    pub async fn list(&self) -> Result<Vec<Series>> {
        let rows = SeriesEntity::find()
            .order_by_asc(series::Column::LastInfoSync)
            .order_by_asc(series::Column::Id)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    pub async fn update(&self, series: &Series) -> Result<()> {
        if series.id.value() == 0 {
            anyhow::bail!("Cannot update series that has not been saved");
        }

        SeriesEntity::update(Self::to_active_model(series)?)
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to update series {}", series.id))?;
        Ok(())
    }
}
