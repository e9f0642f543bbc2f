use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "series")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub external_id: i32,
    pub title: String,
    pub clean_title: String,
    pub air_time: Option<String>,
    pub overview: Option<String>,
    pub status: String,
    pub runtime: i32,
    /// JSON array of `{cover_type, url}` objects.
    pub images: Option<String>,
    pub network: Option<String>,
    /// `YYYY-MM-DD`
    pub first_aired: Option<String>,
    /// RFC 3339, UTC.
    pub last_info_sync: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seasons::Entity")]
    Seasons,
    #[sea_orm(has_many = "super::episodes::Entity")]
    Episodes,
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seasons.def()
    }
}

impl Related<super::episodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Episodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
