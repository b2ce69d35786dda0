use crate::entities::listing_entity as listings;
use crate::entities::user_entity as users;
use crate::entities::{ListingStatus, MembershipStatus};
use crate::error::{AppError, AppResult};
use crate::models::user::{
    AuthResponse, ListingUsage, LoginRequest, ProfileResponse, RegisterRequest,
    TokenPairResponse, UpdateProfileRequest, UserResponse,
};
use crate::plans::PlanCatalog;
use crate::utils::jwt::JwtService;
use crate::utils::password::{hash_password, validate_password, verify_password};
use chrono::Utc;
use log::info;
use regex::Regex;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ActiveValue::Set, DatabaseConnection, FromQueryResult, QuerySelect, SqlErr};
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

#[derive(FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    jwt: JwtService,
    catalog: PlanCatalog,
}

impl UserService {
    pub fn new(db: DatabaseConnection, jwt: JwtService, catalog: PlanCatalog) -> Self {
        Self { db, jwt, catalog }
    }

    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        let email = req.email.trim().to_lowercase();
        let username = req.username.trim().to_string();

        if !email_regex().is_match(&email) {
            return Err(AppError::ValidationError("Invalid email address".to_string()));
        }
        if username.len() < 3 || username.len() > 32 {
            return Err(AppError::ValidationError(
                "Username must be between 3 and 32 characters".to_string(),
            ));
        }
        validate_password(&req.password)?;

        let password_hash = hash_password(&req.password)?;
        let now = Utc::now();

        let user = users::ActiveModel {
            email: Set(email.clone()),
            username: Set(username),
            password_hash: Set(password_hash),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            phone: Set(req.phone),
            // everyone starts on the free default tier; tier_id stays NULL
            // until a paid membership is activated
            tier_id: Set(None),
            membership_status: Set(MembershipStatus::Active),
            membership_started_at: Set(Some(now)),
            membership_expires_at: Set(None),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        };

        let user = match user.insert(&self.db).await {
            Ok(user) => user,
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Err(AppError::Conflict(
                        "Email or username already registered".to_string(),
                    ));
                }
                return Err(err.into());
            }
        };

        info!("Registered user {} ({})", user.id, email);
        self.issue_tokens(user)
    }

    pub async fn login(&self, req: LoginRequest) -> AppResult<AuthResponse> {
        let email = req.email.trim().to_lowercase();

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&req.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        info!("User {} logged in", user.id);
        self.issue_tokens(user)
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPairResponse> {
        let claims = self.jwt.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        Ok(TokenPairResponse {
            access_token: self.jwt.generate_access_token(user.id, &user.email)?,
            refresh_token: self.jwt.generate_refresh_token(user.id, &user.email)?,
        })
    }

    /// The user together with their resolved plan and how much of the
    /// active-listing allowance is in use.
    pub async fn get_profile(&self, user_id: i64) -> AppResult<ProfileResponse> {
        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let tier = self.catalog.lookup(user.tier_id.as_deref());
        let active_listings = {
            let row = listings::Entity::find()
                .filter(listings::Column::UserId.eq(user_id))
                .filter(listings::Column::Status.eq(ListingStatus::Active))
                .select_only()
                .column_as(Expr::val(1).count(), "count")
                .into_model::<CountRow>()
                .one(&self.db)
                .await?;
            row.map(|r| r.count as u64).unwrap_or(0)
        };

        Ok(ProfileResponse {
            plan: tier.into(),
            usage: ListingUsage {
                active_listings,
                max_listings: tier.max_listings,
            },
            user: user.into(),
        })
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(first_name) = req.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = req.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(phone) = req.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(Some(Utc::now()));

        let user = active.update(&self.db).await?;
        Ok(user.into())
    }

    pub async fn find_user(&self, user_id: i64) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt.generate_access_token(user.id, &user.email)?;
        let refresh_token = self.jwt.generate_refresh_token(user.id, &user.email)?;
        Ok(AuthResponse {
            user: user.into(),
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn user(id: i64, tier_id: Option<&str>) -> users::Model {
        users::Model {
            id,
            email: format!("user{id}@example.com"),
            username: format!("user{id}"),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            phone: None,
            tier_id: tier_id.map(|t| t.to_string()),
            membership_status: MembershipStatus::Active,
            membership_started_at: None,
            membership_expires_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn count_row(count: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        let mut row = BTreeMap::new();
        row.insert("count", sea_orm::Value::from(count));
        row
    }

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600, 86400)
    }

    #[tokio::test]
    async fn test_profile_includes_plan_and_listing_usage() {
        // no tier on record resolves to the default Starter plan
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, None)]])
            .append_query_results([vec![count_row(1)]])
            .into_connection();
        let service = UserService::new(db, jwt(), PlanCatalog::builtin());

        let profile = service.get_profile(1).await.unwrap();
        assert_eq!(profile.plan.id, "starter_monthly");
        assert_eq!(profile.usage.active_listings, 1);
        assert_eq!(profile.usage.max_listings, Some(1));
        assert_eq!(profile.user.id, 1);
    }

    #[tokio::test]
    async fn test_profile_unlimited_tier_has_no_listing_cap() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(2, Some("unlimited_monthly"))]])
            .append_query_results([vec![count_row(37)]])
            .into_connection();
        let service = UserService::new(db, jwt(), PlanCatalog::builtin());

        let profile = service.get_profile(2).await.unwrap();
        assert_eq!(profile.plan.id, "unlimited_monthly");
        assert_eq!(profile.usage.active_listings, 37);
        assert_eq!(profile.usage.max_listings, None);
    }
}
