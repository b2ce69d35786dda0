use crate::entities::favorite_entity as favorites;
use crate::models::listing::ListingResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SaveFavoriteRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFavoriteNotesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteResponse {
    pub id: i64,
    pub user_id: i64,
    pub listing_id: i64,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<favorites::Model> for FavoriteResponse {
    fn from(f: favorites::Model) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            listing_id: f.listing_id,
            notes: f.notes,
            created_at: f.created_at,
        }
    }
}

/// A saved favorite joined with the listing it points at, as returned by
/// the "my favorites" endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteWithListing {
    #[serde(flatten)]
    pub favorite: FavoriteResponse,
    pub listing: ListingResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteStatusResponse {
    pub listing_id: i64,
    pub is_favorited: bool,
}
