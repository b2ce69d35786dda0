use crate::entities::memberships::MembershipStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// A subscriber. `tier_id` is the plan-catalog key; NULL resolves to the
/// default (Starter) tier. Rows are never deleted, only deactivated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub tier_id: Option<String>,
    pub membership_status: MembershipStatus,
    pub membership_started_at: Option<DateTime<Utc>>,
    pub membership_expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
