use crate::entities::membership_entity as memberships;
use crate::entities::MembershipStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipResponse {
    pub id: i64,
    pub tier_id: String,
    pub status: MembershipStatus,
    pub amount: Option<Decimal>,
    pub started_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<memberships::Model> for MembershipResponse {
    fn from(m: memberships::Model) -> Self {
        Self {
            id: m.id,
            tier_id: m.tier_id,
            status: m.status,
            amount: m.amount,
            started_at: m.started_at,
            ends_at: m.ends_at,
        }
    }
}

/// The caller's effective membership: the resolved plan plus the current
/// membership record when one exists. Users with no paid membership still
/// resolve to the default tier.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentMembershipResponse {
    pub tier: crate::models::plan::PlanTierResponse,
    pub status: MembershipStatus,
    pub membership: Option<MembershipResponse>,
}
