use crate::entities::user_entity as users;
use crate::entities::MembershipStatus;
use crate::models::plan::PlanTierResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "owner@example.com")]
    pub email: String,
    #[schema(example = "beachlover")]
    pub username: String,
    #[schema(example = "Str0ngPass!")]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub tier_id: Option<String>,
    pub membership_status: MembershipStatus,
    pub membership_expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for UserResponse {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            tier_id: u.tier_id,
            membership_status: u.membership_status,
            membership_expires_at: u.membership_expires_at,
            created_at: u.created_at,
        }
    }
}

/// Active-listing consumption against the plan's allowance.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingUsage {
    pub active_listings: u64,
    /// `null` means unlimited.
    pub max_listings: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    /// The resolved tier, after legacy aliases and the default fallback.
    pub plan: PlanTierResponse,
    pub usage: ListingUsage,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}
