use crate::entities::listing_entity as listings;
use crate::entities::listing_photo_entity as photos;
use crate::entities::{ListingStatus, PropertyType};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use utoipa::{IntoParams, ToSchema};

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateListingRequest {
    #[schema(example = "2BR Ocean View at Marriott Aruba")]
    pub title: String,
    pub description: Option<String>,
    pub property_type: PropertyType,
    #[schema(example = "Marriott's Aruba Surf Club")]
    pub resort_name: String,
    #[schema(example = "Palm Beach")]
    pub city: String,
    #[schema(example = "Aruba")]
    pub state: String,
    #[schema(example = "Aruba")]
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
}

impl CreateListingRequest {
    /// Field-level validation; entitlement checks happen separately inside
    /// the creation transaction.
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("title", &self.title),
            ("resort_name", &self.resort_name),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::ValidationError(format!(
                    "Missing required field: {name}"
                )));
            }
        }

        if self.property_type.for_sale() && self.sale_price.is_none() {
            return Err(AppError::ValidationError(
                "Sale price required for sale listings".to_string(),
            ));
        }
        if self.property_type.for_rental()
            && self.rental_price_weekly.is_none()
            && self.rental_price_nightly.is_none()
        {
            return Err(AppError::ValidationError(
                "Rental price required for rental listings".to_string(),
            ));
        }

        if let Some(email) = self.contact_email.as_deref() {
            if !email_regex().is_match(email) {
                return Err(AppError::ValidationError(
                    "Invalid contact email address".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Owner-updatable fields. This is the whitelist: anything not named here
/// (featured flags, counters, ownership) cannot be changed through the
/// update endpoint, and unknown fields are rejected outright.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub resort_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
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
    pub status: Option<ListingStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Price,
    CreatedAt,
    ViewCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListingSearchParams {
    /// Matches the exact type, plus listings marked "both".
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    /// Minimum number of bedrooms.
    pub bedrooms: Option<i32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Free-text query over title/description/resort/city/state.
    pub q: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortDirection>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FreeTextQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PhotoUpload {
    pub file_path: String,
    pub original_filename: Option<String>,
    pub file_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub caption: Option<String>,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddPhotosRequest {
    pub photos: Vec<PhotoUpload>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PhotoResponse {
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

impl From<photos::Model> for PhotoResponse {
    fn from(p: photos::Model) -> Self {
        Self {
            id: p.id,
            listing_id: p.listing_id,
            filename: p.filename,
            original_filename: p.original_filename,
            file_path: p.file_path,
            file_size: p.file_size,
            width: p.width,
            height: p.height,
            caption: p.caption,
            sort_order: p.sort_order,
            is_main: p.is_main,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListingResponse {
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
    pub price_display: String,
    pub location_display: String,
}

impl From<listings::Model> for ListingResponse {
    fn from(l: listings::Model) -> Self {
        let price_display = price_display(&l);
        let location_display = location_display(&l);
        Self {
            id: l.id,
            user_id: l.user_id,
            title: l.title,
            description: l.description,
            property_type: l.property_type,
            resort_name: l.resort_name,
            city: l.city,
            state: l.state,
            country: l.country,
            zip_code: l.zip_code,
            bedrooms: l.bedrooms,
            bathrooms: l.bathrooms,
            sleeps: l.sleeps,
            unit_size: l.unit_size,
            floor: l.floor,
            view_type: l.view_type,
            ownership_type: l.ownership_type,
            week_number: l.week_number,
            season: l.season,
            usage_type: l.usage_type,
            sale_price: l.sale_price,
            rental_price_weekly: l.rental_price_weekly,
            rental_price_nightly: l.rental_price_nightly,
            maintenance_fee: l.maintenance_fee,
            available_dates: l.available_dates,
            check_in_day: l.check_in_day,
            amenities: l.amenities,
            contact_method: l.contact_method,
            contact_phone: l.contact_phone,
            contact_email: l.contact_email,
            status: l.status,
            is_featured: l.is_featured,
            featured_until: l.featured_until,
            photo_count: l.photo_count,
            main_photo_url: l.main_photo_url,
            view_count: l.view_count,
            inquiry_count: l.inquiry_count,
            favorite_count: l.favorite_count,
            created_at: l.created_at,
            updated_at: l.updated_at,
            last_viewed: l.last_viewed,
            price_display,
            location_display,
        }
    }
}

/// Renders the headline price line from whichever price fields apply to the
/// listing's property type, e.g. `Sale: $150,000 | Rental: $1,500/week`.
pub fn price_display(listing: &listings::Model) -> String {
    let mut parts = Vec::new();
    if let Some(sale) = listing.sale_price {
        if listing.property_type.for_sale() {
            parts.push(format!("Sale: {}", format_usd(sale)));
        }
    }
    if let Some(weekly) = listing.rental_price_weekly {
        if listing.property_type.for_rental() {
            parts.push(format!("Rental: {}/week", format_usd(weekly)));
        }
    }
    if parts.is_empty() {
        "Contact for pricing".to_string()
    } else {
        parts.join(" | ")
    }
}

pub fn location_display(listing: &listings::Model) -> String {
    format!("{}, {}, {}", listing.city, listing.state, listing.country)
}

/// Whole-dollar rendering with thousands separators.
fn format_usd(amount: Decimal) -> String {
    let whole = amount.round().to_i64().unwrap_or(0);
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_listing() -> listings::Model {
        listings::Model {
            id: 1,
            user_id: 1,
            title: "2BR Ocean View".to_string(),
            description: None,
            property_type: PropertyType::Sale,
            resort_name: "Surf Club".to_string(),
            city: "Orlando".to_string(),
            state: "FL".to_string(),
            country: "USA".to_string(),
            zip_code: None,
            bedrooms: Some(2),
            bathrooms: None,
            sleeps: None,
            unit_size: None,
            floor: None,
            view_type: None,
            ownership_type: None,
            week_number: None,
            season: None,
            usage_type: None,
            sale_price: None,
            rental_price_weekly: None,
            rental_price_nightly: None,
            maintenance_fee: None,
            available_dates: None,
            check_in_day: None,
            amenities: None,
            contact_method: None,
            contact_phone: None,
            contact_email: None,
            status: ListingStatus::Active,
            is_featured: false,
            featured_until: None,
            photo_count: 0,
            main_photo_url: None,
            view_count: 0,
            inquiry_count: 0,
            favorite_count: 0,
            created_at: None,
            updated_at: None,
            last_viewed: None,
        }
    }

    fn sample_request() -> CreateListingRequest {
        CreateListingRequest {
            title: "2BR Ocean View".to_string(),
            description: None,
            property_type: PropertyType::Sale,
            resort_name: "Surf Club".to_string(),
            city: "Orlando".to_string(),
            state: "FL".to_string(),
            country: "USA".to_string(),
            zip_code: None,
            bedrooms: None,
            bathrooms: None,
            sleeps: None,
            unit_size: None,
            floor: None,
            view_type: None,
            ownership_type: None,
            week_number: None,
            season: None,
            usage_type: None,
            sale_price: Some(Decimal::new(150_000, 0)),
            rental_price_weekly: None,
            rental_price_nightly: None,
            maintenance_fee: None,
            available_dates: None,
            check_in_day: None,
            amenities: None,
            contact_method: None,
            contact_phone: None,
            contact_email: None,
        }
    }

    #[test]
    fn test_price_display_sale_only() {
        let mut l = sample_listing();
        l.sale_price = Some(Decimal::new(150_000, 0));
        assert_eq!(price_display(&l), "Sale: $150,000");
    }

    #[test]
    fn test_price_display_both() {
        let mut l = sample_listing();
        l.property_type = PropertyType::Both;
        l.sale_price = Some(Decimal::new(150_000, 0));
        l.rental_price_weekly = Some(Decimal::new(1_500, 0));
        assert_eq!(price_display(&l), "Sale: $150,000 | Rental: $1,500/week");
    }

    #[test]
    fn test_price_display_ignores_prices_outside_property_type() {
        // a pure rental listing does not advertise a stray sale price
        let mut l = sample_listing();
        l.property_type = PropertyType::Rental;
        l.sale_price = Some(Decimal::new(150_000, 0));
        l.rental_price_weekly = Some(Decimal::new(999, 0));
        assert_eq!(price_display(&l), "Rental: $999/week");
    }

    #[test]
    fn test_price_display_fallback() {
        let l = sample_listing();
        assert_eq!(price_display(&l), "Contact for pricing");
    }

    #[test]
    fn test_price_display_rounds_cents() {
        let mut l = sample_listing();
        l.sale_price = Some(Decimal::new(14_999_950, 2)); // 149,999.50
        assert_eq!(price_display(&l), "Sale: $150,000");
    }

    #[test]
    fn test_location_display() {
        let l = sample_listing();
        assert_eq!(location_display(&l), "Orlando, FL, USA");
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample_request().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_required_field() {
        let mut req = sample_request();
        req.city = "   ".to_string();
        let err = req.validate().unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg.contains("city")));
    }

    #[test]
    fn test_validate_sale_requires_sale_price() {
        let mut req = sample_request();
        req.sale_price = None;
        assert!(matches!(
            req.validate(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_rental_requires_a_rental_price() {
        let mut req = sample_request();
        req.property_type = PropertyType::Rental;
        req.sale_price = None;
        assert!(req.validate().is_err());

        req.rental_price_nightly = Some(Decimal::new(250, 0));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_both_requires_sale_and_rental_prices() {
        let mut req = sample_request();
        req.property_type = PropertyType::Both;
        assert!(req.validate().is_err());

        req.rental_price_weekly = Some(Decimal::new(1_500, 0));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_contact_email() {
        let mut req = sample_request();
        req.contact_email = Some("not-an-email".to_string());
        assert!(req.validate().is_err());

        req.contact_email = Some("owner@example.com".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_rejects_unknown_fields() {
        // counters and featured flags are not in the whitelist
        let err = serde_json::from_str::<UpdateListingRequest>(r#"{"view_count": 999}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<UpdateListingRequest>(r#"{"is_featured": true}"#);
        assert!(err.is_err());

        let ok = serde_json::from_str::<UpdateListingRequest>(r#"{"title": "New title"}"#);
        assert!(ok.is_ok());
    }
}
