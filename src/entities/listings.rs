use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "property_type")]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "rental")]
    Rental,
    #[sea_orm(string_value = "both")]
    Both,
}

impl PropertyType {
    pub fn for_sale(&self) -> bool {
        matches!(self, PropertyType::Sale | PropertyType::Both)
    }

    pub fn for_rental(&self) -> bool {
        matches!(self, PropertyType::Rental | PropertyType::Both)
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Sale => write!(f, "sale"),
            PropertyType::Rental => write!(f, "rental"),
            PropertyType::Both => write!(f, "both"),
        }
    }
}

#[derive(
    Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "listing_status")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "rented")]
    Rented,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Active => write!(f, "active"),
            ListingStatus::Inactive => write!(f, "inactive"),
            ListingStatus::Sold => write!(f, "sold"),
            ListingStatus::Rented => write!(f, "rented"),
        }
    }
}

/// A timeshare listing. Counters (`view_count`, `inquiry_count`,
/// `favorite_count`) are approximate under concurrency; only the
/// entitlement check at creation is strict.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    pub resort_name: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<Decimal>,
    pub sleeps: Option<i32>,
    pub unit_size: Option<String>,
    pub floor: Option<String>,
    pub view_type: Option<String>,
    pub ownership_type: Option<String>,
    pub week_number: Option<String>,
    pub season: Option<String>,
    pub usage_type: Option<String>,
    pub sale_price: Option<Decimal>,
    pub rental_price_weekly: Option<Decimal>,
    pub rental_price_nightly: Option<Decimal>,
    pub maintenance_fee: Option<Decimal>,
    pub available_dates: Option<String>,
    pub check_in_day: Option<String>,
    pub amenities: Option<String>,
    pub contact_method: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub status: ListingStatus,
    pub is_featured: bool,
    pub featured_until: Option<DateTime<Utc>>,
    pub photo_count: i32,
    pub main_photo_url: Option<String>,
    pub view_count: i32,
    pub inquiry_count: i32,
    pub favorite_count: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_viewed: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
