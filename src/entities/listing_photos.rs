use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Photo metadata for a listing. The binary itself lives behind
/// `file_path`; this table only carries the reference. At most one photo
/// per listing has `is_main` set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "listing_photos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub listing_id: i64,
    pub filename: String,
    pub original_filename: Option<String>,
    pub file_path: String,
    pub file_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub caption: Option<String>,
    pub sort_order: i32,
    pub is_main: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
