use crate::domain::SeriesId;
use crate::entities::{prelude::*, seasons};
use crate::models::Season;
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

pub struct SeasonRepository {
    conn: DatabaseConnection,
}

impl SeasonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_by_series(&self, series_id: i32) -> Result<Vec<Season>> {
        let rows = Seasons::find()
            .filter(seasons::Column::SeriesId.eq(series_id))
            .order_by_asc(seasons::Column::SeasonNumber)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Season {
                series_id: SeriesId::new(row.series_id),
                season_number: row.season_number,
                ignored: row.ignored,
            })
            .collect())
    }

    pub async fn upsert(&self, season: &Season) -> Result<()> {
        let active_model = seasons::ActiveModel {
            series_id: Set(season.series_id.value()),
            season_number: Set(season.season_number),
            ignored: Set(season.ignored),
        };

        Seasons::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    seasons::Column::SeriesId,
                    seasons::Column::SeasonNumber,
                ])
                .update_column(seasons::Column::Ignored)
                .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
