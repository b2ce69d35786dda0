use crate::entities::membership_entity as memberships;
use crate::entities::user_entity as users;
use crate::entities::MembershipStatus;
use crate::error::{AppError, AppResult};
use crate::models::membership::{CurrentMembershipResponse, MembershipResponse};
use crate::models::plan::PlanTierResponse;
use crate::plans::PlanCatalog;
use chrono::{Duration, Utc};
use log::{info, warn};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue::Set, DatabaseConnection, Order, QueryOrder, TransactionTrait};

/// Paid memberships run in fixed 30-day periods; renewals extend from the
/// current period end, not from the renewal moment.
const MEMBERSHIP_PERIOD_DAYS: i64 = 30;

#[derive(Clone)]
pub struct MembershipService {
    db: DatabaseConnection,
    catalog: PlanCatalog,
}

impl MembershipService {
    pub fn new(db: DatabaseConnection, catalog: PlanCatalog) -> Self {
        Self { db, catalog }
    }

    /// Activates a paid tier for a user, superseding any currently active
    /// membership, and mirrors the result onto the user row that the
    /// entitlement checks read.
    pub async fn activate(
        &self,
        user_id: i64,
        tier_id: &str,
        stripe_session_id: Option<String>,
        stripe_subscription_id: Option<String>,
        amount: Option<Decimal>,
    ) -> AppResult<memberships::Model> {
        // normalize legacy tier identifiers before persisting
        let tier = self.catalog.lookup(Some(tier_id));

        let txn = self.db.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let superseded = memberships::Entity::update_many()
            .col_expr(
                memberships::Column::Status,
                memberships::Column::Status.save_as(Expr::val(MembershipStatus::Expired)),
            )
            .filter(memberships::Column::UserId.eq(user_id))
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .exec(&txn)
            .await?;
        if superseded.rows_affected > 0 {
            info!(
                "Superseded {} active membership(s) for user {}",
                superseded.rows_affected, user_id
            );
        }

        let now = Utc::now();
        let ends_at = now + Duration::days(MEMBERSHIP_PERIOD_DAYS);

        let membership = memberships::ActiveModel {
            user_id: Set(user_id),
            tier_id: Set(tier.id.to_string()),
            status: Set(MembershipStatus::Active),
            stripe_session_id: Set(stripe_session_id),
            stripe_subscription_id: Set(stripe_subscription_id),
            amount: Set(amount),
            started_at: Set(now),
            ends_at: Set(Some(ends_at)),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };
        let membership = membership.insert(&txn).await?;

        let mut user_update: users::ActiveModel = user.into();
        user_update.tier_id = Set(Some(tier.id.to_string()));
        user_update.membership_status = Set(MembershipStatus::Active);
        user_update.membership_started_at = Set(Some(now));
        user_update.membership_expires_at = Set(Some(ends_at));
        user_update.updated_at = Set(Some(now));
        user_update.update(&txn).await?;

        txn.commit().await?;
        info!("Activated {} membership for user {}", tier.id, user_id);
        Ok(membership)
    }

    /// Extends the membership tied to a gateway subscription by one period.
    /// Called on recurring payment success.
    pub async fn renew_by_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> AppResult<memberships::Model> {
        let txn = self.db.begin().await?;

        let membership = memberships::Entity::find()
            .filter(memberships::Column::StripeSubscriptionId.eq(stripe_subscription_id))
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No active membership for subscription {stripe_subscription_id}"
                ))
            })?;

        let now = Utc::now();
        // a late renewal after a gap starts counting from now
        let base = membership.ends_at.filter(|e| *e > now).unwrap_or(now);
        let ends_at = base + Duration::days(MEMBERSHIP_PERIOD_DAYS);
        let user_id = membership.user_id;

        let mut active: memberships::ActiveModel = membership.into();
        active.ends_at = Set(Some(ends_at));
        active.updated_at = Set(Some(now));
        let membership = active.update(&txn).await?;

        users::Entity::update_many()
            .col_expr(
                users::Column::MembershipExpiresAt,
                Expr::value(Some(ends_at)),
            )
            .col_expr(
                users::Column::MembershipStatus,
                users::Column::MembershipStatus.save_as(Expr::val(MembershipStatus::Active)),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!("Renewed membership for user {} until {}", user_id, ends_at);
        Ok(membership)
    }

    /// Marks the membership tied to a gateway subscription as cancelled and
    /// drops the user back to the default tier.
    pub async fn cancel_by_subscription(&self, stripe_subscription_id: &str) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let membership = memberships::Entity::find()
            .filter(memberships::Column::StripeSubscriptionId.eq(stripe_subscription_id))
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .one(&txn)
            .await?;

        let Some(membership) = membership else {
            // cancellation webhooks can arrive after expiry sweeps; nothing
            // left to do
            warn!("Cancellation for unknown subscription {stripe_subscription_id}");
            return Ok(());
        };

        let now = Utc::now();
        let user_id = membership.user_id;

        let mut active: memberships::ActiveModel = membership.into();
        active.status = Set(MembershipStatus::Cancelled);
        active.updated_at = Set(Some(now));
        active.update(&txn).await?;

        users::Entity::update_many()
            .col_expr(users::Column::TierId, Expr::value(Option::<String>::None))
            .col_expr(
                users::Column::MembershipStatus,
                users::Column::MembershipStatus.save_as(Expr::val(MembershipStatus::Cancelled)),
            )
            .col_expr(
                users::Column::MembershipExpiresAt,
                Expr::value(Some(now)),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!("Cancelled membership for user {}", user_id);
        Ok(())
    }

    /// Sweeps memberships whose period has lapsed without renewal. Run
    /// periodically from a background task.
    pub async fn expire_lapsed(&self) -> AppResult<u64> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let lapsed = memberships::Entity::update_many()
            .col_expr(
                memberships::Column::Status,
                memberships::Column::Status.save_as(Expr::val(MembershipStatus::Expired)),
            )
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .filter(memberships::Column::EndsAt.lt(now))
            .exec(&txn)
            .await?;

        users::Entity::update_many()
            .col_expr(users::Column::TierId, Expr::value(Option::<String>::None))
            .col_expr(
                users::Column::MembershipStatus,
                users::Column::MembershipStatus.save_as(Expr::val(MembershipStatus::Expired)),
            )
            .filter(users::Column::MembershipExpiresAt.lt(now))
            .filter(users::Column::MembershipStatus.eq(MembershipStatus::Active))
            .filter(users::Column::TierId.is_not_null())
            .exec(&txn)
            .await?;

        txn.commit().await?;
        if lapsed.rows_affected > 0 {
            info!("Expired {} lapsed membership(s)", lapsed.rows_affected);
        }
        Ok(lapsed.rows_affected)
    }

    /// The caller's effective plan. Users without a paid membership resolve
    /// to the default tier.
    pub async fn current(&self, user_id: i64) -> AppResult<CurrentMembershipResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let tier = self.catalog.lookup(user.tier_id.as_deref());

        let membership = memberships::Entity::find()
            .filter(memberships::Column::UserId.eq(user_id))
            .filter(memberships::Column::Status.eq(MembershipStatus::Active))
            .order_by(memberships::Column::StartedAt, Order::Desc)
            .one(&self.db)
            .await?;

        Ok(CurrentMembershipResponse {
            tier: PlanTierResponse::from(tier),
            status: user.membership_status,
            membership: membership.map(MembershipResponse::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user(id: i64, tier_id: Option<&str>, status: MembershipStatus) -> users::Model {
        users::Model {
            id,
            email: format!("user{id}@example.com"),
            username: format!("user{id}"),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            phone: None,
            tier_id: tier_id.map(|t| t.to_string()),
            membership_status: status,
            membership_started_at: None,
            membership_expires_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_current_resolves_default_tier_without_membership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, None, MembershipStatus::Active)]])
            .append_query_results([Vec::<memberships::Model>::new()])
            .into_connection();
        let service = MembershipService::new(db, PlanCatalog::builtin());

        let current = service.current(1).await.unwrap();
        assert_eq!(current.tier.id, "starter_monthly");
        assert_eq!(current.status, MembershipStatus::Active);
        assert!(current.membership.is_none());
    }

    #[tokio::test]
    async fn test_current_resolves_legacy_tier_alias() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, Some("premium"), MembershipStatus::Active)]])
            .append_query_results([Vec::<memberships::Model>::new()])
            .into_connection();
        let service = MembershipService::new(db, PlanCatalog::builtin());

        let current = service.current(1).await.unwrap();
        assert_eq!(current.tier.id, "premium_monthly");
        assert_eq!(current.tier.max_listings, Some(5));
    }

    #[tokio::test]
    async fn test_renew_unknown_subscription_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<memberships::Model>::new()])
            .into_connection();
        let service = MembershipService::new(db, PlanCatalog::builtin());

        let err = service.renew_by_subscription("sub_missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_unknown_subscription_is_ignored() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<memberships::Model>::new()])
            .into_connection();
        let service = MembershipService::new(db, PlanCatalog::builtin());

        assert!(service.cancel_by_subscription("sub_missing").await.is_ok());
    }
}
