use crate::entities::listing_entity as listings;
use crate::entities::listing_photo_entity as photos;
use crate::entities::user_entity as users;
use crate::entities::ListingStatus;
use crate::error::{AppError, AppResult};
use crate::models::listing::{
    AddPhotosRequest, CreateListingRequest, PhotoUpload, UpdateListingRequest,
};
use crate::models::pagination::PaginationParams;
use crate::plans::{can_attach_photos, can_create_listing, PlanCatalog};
use chrono::Utc;
use log::info;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, DatabaseConnection, FromQueryResult, Order, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

#[derive(FromQueryResult)]
struct CountRow {
    count: i64,
}

async fn count_active_listings<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<u64> {
    let row = listings::Entity::find()
        .filter(listings::Column::UserId.eq(user_id))
        .filter(listings::Column::Status.eq(ListingStatus::Active))
        .select_only()
        .column_as(Expr::val(1).count(), "count")
        .into_model::<CountRow>()
        .one(conn)
        .await?;
    Ok(row.map(|r| r.count as u64).unwrap_or(0))
}

async fn count_photos<C: ConnectionTrait>(conn: &C, listing_id: i64) -> AppResult<u64> {
    let row = photos::Entity::find()
        .filter(photos::Column::ListingId.eq(listing_id))
        .select_only()
        .column_as(Expr::val(1).count(), "count")
        .into_model::<CountRow>()
        .one(conn)
        .await?;
    Ok(row.map(|r| r.count as u64).unwrap_or(0))
}

#[derive(Clone)]
pub struct ListingService {
    db: DatabaseConnection,
    catalog: PlanCatalog,
}

impl ListingService {
    pub fn new(db: DatabaseConnection, catalog: PlanCatalog) -> Self {
        Self { db, catalog }
    }

    /// Creates a listing for `user_id`, enforcing the plan's active-listing
    /// cap. The owner row is locked `FOR UPDATE` for the duration of the
    /// transaction, serializing the count-then-insert against concurrent
    /// creates and reactivations by the same user.
    pub async fn create_listing(
        &self,
        user_id: i64,
        req: CreateListingRequest,
    ) -> AppResult<listings::Model> {
        req.validate()?;

        let txn = self.db.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let active = count_active_listings(&txn, user_id).await?;
        let decision = can_create_listing(&self.catalog, user.tier_id.as_deref(), active);
        if !decision.allowed {
            return Err(AppError::EntitlementError(
                decision
                    .reason
                    .unwrap_or_else(|| "Listing limit reached".to_string()),
            ));
        }

        let now = Utc::now();
        let listing = listings::ActiveModel {
            user_id: Set(user_id),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            property_type: Set(req.property_type),
            resort_name: Set(req.resort_name.trim().to_string()),
            city: Set(req.city.trim().to_string()),
            state: Set(req.state.trim().to_string()),
            country: Set(req.country.trim().to_string()),
            zip_code: Set(req.zip_code),
            bedrooms: Set(req.bedrooms),
            bathrooms: Set(req.bathrooms),
            sleeps: Set(req.sleeps),
            unit_size: Set(req.unit_size),
            floor: Set(req.floor),
            view_type: Set(req.view_type),
            ownership_type: Set(req.ownership_type),
            week_number: Set(req.week_number),
            season: Set(req.season),
            usage_type: Set(req.usage_type),
            sale_price: Set(req.sale_price),
            rental_price_weekly: Set(req.rental_price_weekly),
            rental_price_nightly: Set(req.rental_price_nightly),
            maintenance_fee: Set(req.maintenance_fee),
            available_dates: Set(req.available_dates),
            check_in_day: Set(req.check_in_day),
            amenities: Set(req.amenities),
            contact_method: Set(req.contact_method),
            contact_phone: Set(req.contact_phone),
            contact_email: Set(req.contact_email),
            status: Set(ListingStatus::Active),
            is_featured: Set(false),
            featured_until: Set(None),
            photo_count: Set(0),
            main_photo_url: Set(None),
            view_count: Set(0),
            inquiry_count: Set(0),
            favorite_count: Set(0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            last_viewed: Set(None),
            ..Default::default()
        };

        let listing = listing.insert(&txn).await?;
        txn.commit().await?;

        info!("User {} created listing {}", user_id, listing.id);
        Ok(listing)
    }

    /// Fetches a single listing. Non-active listings are only visible to
    /// their owner; everyone else gets a 404 rather than a hint that the
    /// listing exists.
    pub async fn get_listing(
        &self,
        listing_id: i64,
        viewer_id: Option<i64>,
    ) -> AppResult<listings::Model> {
        let listing = listings::Entity::find_by_id(listing_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

        if listing.status != ListingStatus::Active && viewer_id != Some(listing.user_id) {
            return Err(AppError::NotFound("Listing not found".to_string()));
        }

        Ok(listing)
    }

    pub async fn update_listing(
        &self,
        user_id: i64,
        listing_id: i64,
        req: UpdateListingRequest,
    ) -> AppResult<listings::Model> {
        let txn = self.db.begin().await?;

        let listing = find_owned(&txn, user_id, listing_id).await?;

        // reactivating a listing must respect the active-listing cap again;
        // the owner-row lock serializes this against concurrent creates
        if req.status == Some(ListingStatus::Active) && listing.status != ListingStatus::Active {
            let user = users::Entity::find_by_id(user_id)
                .lock_exclusive()
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            let active = count_active_listings(&txn, user_id).await?;
            let decision = can_create_listing(&self.catalog, user.tier_id.as_deref(), active);
            if !decision.allowed {
                return Err(AppError::EntitlementError(
                    decision
                        .reason
                        .unwrap_or_else(|| "Listing limit reached".to_string()),
                ));
            }
        }

        let mut active: listings::ActiveModel = listing.into();
        apply_update(&mut active, req);
        active.updated_at = Set(Some(Utc::now()));

        let listing = active.update(&txn).await?;
        txn.commit().await?;
        Ok(listing)
    }

    /// Hard delete. Photos and favorites go with it via FK cascades.
    pub async fn delete_listing(&self, user_id: i64, listing_id: i64) -> AppResult<()> {
        let listing = find_owned(&self.db, user_id, listing_id).await?;
        listings::Entity::delete_by_id(listing.id)
            .exec(&self.db)
            .await?;
        info!("User {} deleted listing {}", user_id, listing_id);
        Ok(())
    }

    /// The owner's own listings, every status, newest first.
    pub async fn list_user_listings(
        &self,
        user_id: i64,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<listings::Model>, u64)> {
        let base = listings::Entity::find().filter(listings::Column::UserId.eq(user_id));

        let total = {
            let row = base
                .clone()
                .select_only()
                .column_as(Expr::val(1).count(), "count")
                .into_model::<CountRow>()
                .one(&self.db)
                .await?;
            row.map(|r| r.count as u64).unwrap_or(0)
        };

        let items = base
            .order_by(listings::Column::CreatedAt, Order::Desc)
            .offset(pagination.get_offset())
            .limit(pagination.get_limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Counter bumps are single atomic UPDATEs; lost increments under
    /// extreme concurrency are acceptable for analytics counters.
    pub async fn record_view(&self, listing_id: i64) -> AppResult<()> {
        listings::Entity::update_many()
            .col_expr(
                listings::Column::ViewCount,
                Expr::col(listings::Column::ViewCount).add(1),
            )
            .col_expr(
                listings::Column::LastViewed,
                Expr::value(Some(Utc::now())),
            )
            .filter(listings::Column::Id.eq(listing_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn record_inquiry(&self, listing_id: i64) -> AppResult<()> {
        let result = listings::Entity::update_many()
            .col_expr(
                listings::Column::InquiryCount,
                Expr::col(listings::Column::InquiryCount).add(1),
            )
            .filter(listings::Column::Id.eq(listing_id))
            .filter(listings::Column::Status.eq(ListingStatus::Active))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Listing not found".to_string()));
        }
        Ok(())
    }

    /// Attaches photos to an owned listing, enforcing the plan's per-listing
    /// photo cap against the resulting total.
    pub async fn add_photos(
        &self,
        user_id: i64,
        listing_id: i64,
        req: AddPhotosRequest,
    ) -> AppResult<Vec<photos::Model>> {
        if req.photos.is_empty() {
            return Err(AppError::ValidationError("No photos provided".to_string()));
        }

        let txn = self.db.begin().await?;

        let listing = listings::Entity::find_by_id(listing_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
        if listing.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not own this listing".to_string(),
            ));
        }

        let user = users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let existing = count_photos(&txn, listing_id).await?;
        let requested = existing as u32 + req.photos.len() as u32;
        let decision = can_attach_photos(&self.catalog, user.tier_id.as_deref(), requested);
        if !decision.allowed {
            return Err(AppError::EntitlementError(
                decision
                    .reason
                    .unwrap_or_else(|| "Photo limit exceeded".to_string()),
            ));
        }

        let main_flags = assign_main_flags(&req.photos, listing.main_photo_url.is_some());

        if req.photos.iter().any(|p| p.is_main) {
            photos::Entity::update_many()
                .col_expr(photos::Column::IsMain, Expr::value(false))
                .filter(photos::Column::ListingId.eq(listing_id))
                .exec(&txn)
                .await?;
        }

        let now = Utc::now();
        let mut inserted = Vec::with_capacity(req.photos.len());
        let mut main_url: Option<String> = None;
        for (i, (upload, is_main)) in req.photos.into_iter().zip(main_flags).enumerate() {
            let photo = photos::ActiveModel {
                listing_id: Set(listing_id),
                filename: Set(format!("{}.jpg", Uuid::new_v4())),
                original_filename: Set(upload.original_filename),
                file_path: Set(upload.file_path),
                file_size: Set(upload.file_size),
                width: Set(upload.width),
                height: Set(upload.height),
                caption: Set(upload.caption),
                sort_order: Set(upload.sort_order.unwrap_or(existing as i32 + i as i32)),
                is_main: Set(is_main),
                created_at: Set(Some(now)),
                ..Default::default()
            };
            let photo = photo.insert(&txn).await?;
            if is_main {
                main_url = Some(photo.file_path.clone());
            }
            inserted.push(photo);
        }

        let mut listing_update: listings::ActiveModel = listing.into();
        listing_update.photo_count = Set((existing + inserted.len() as u64) as i32);
        if let Some(url) = main_url {
            listing_update.main_photo_url = Set(Some(url));
        }
        listing_update.updated_at = Set(Some(now));
        listing_update.update(&txn).await?;

        txn.commit().await?;
        Ok(inserted)
    }

    pub async fn delete_photo(
        &self,
        user_id: i64,
        listing_id: i64,
        photo_id: i64,
    ) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let listing = listings::Entity::find_by_id(listing_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
        if listing.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not own this listing".to_string(),
            ));
        }

        let photo = photos::Entity::find_by_id(photo_id)
            .one(&txn)
            .await?
            .filter(|p| p.listing_id == listing_id)
            .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;
        let was_main = photo.is_main;

        photos::Entity::delete_by_id(photo.id).exec(&txn).await?;

        let remaining = count_photos(&txn, listing_id).await?;
        let mut listing_update: listings::ActiveModel = listing.into();
        listing_update.photo_count = Set(remaining as i32);

        if was_main {
            // hand main status to the lowest-sorted remaining photo
            let next = photos::Entity::find()
                .filter(photos::Column::ListingId.eq(listing_id))
                .order_by(photos::Column::SortOrder, Order::Asc)
                .one(&txn)
                .await?;
            match next {
                Some(next) => {
                    let url = next.file_path.clone();
                    let mut next_update: photos::ActiveModel = next.into();
                    next_update.is_main = Set(true);
                    next_update.update(&txn).await?;
                    listing_update.main_photo_url = Set(Some(url));
                }
                None => {
                    listing_update.main_photo_url = Set(None);
                }
            }
        }

        listing_update.updated_at = Set(Some(Utc::now()));
        listing_update.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn list_photos(&self, listing_id: i64) -> AppResult<Vec<photos::Model>> {
        Ok(photos::Entity::find()
            .filter(photos::Column::ListingId.eq(listing_id))
            .order_by(photos::Column::SortOrder, Order::Asc)
            .all(&self.db)
            .await?)
    }
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    listing_id: i64,
) -> AppResult<listings::Model> {
    let listing = listings::Entity::find_by_id(listing_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
    if listing.user_id != user_id {
        return Err(AppError::Forbidden(
            "You do not own this listing".to_string(),
        ));
    }
    Ok(listing)
}

/// Decides which uploads end up flagged as the main photo. At most one
/// upload keeps the flag: the first one the client marked, or the first
/// upload overall when the listing has no main photo yet.
fn assign_main_flags(uploads: &[PhotoUpload], listing_has_main: bool) -> Vec<bool> {
    let first_marked = uploads.iter().position(|p| p.is_main);
    let main_index = match first_marked {
        Some(i) => Some(i),
        None if !listing_has_main && !uploads.is_empty() => Some(0),
        None => None,
    };
    (0..uploads.len()).map(|i| Some(i) == main_index).collect()
}

fn apply_update(active: &mut listings::ActiveModel, req: UpdateListingRequest) {
    if let Some(v) = req.title {
        active.title = Set(v);
    }
    if let Some(v) = req.description {
        active.description = Set(Some(v));
    }
    if let Some(v) = req.property_type {
        active.property_type = Set(v);
    }
    if let Some(v) = req.resort_name {
        active.resort_name = Set(v);
    }
    if let Some(v) = req.city {
        active.city = Set(v);
    }
    if let Some(v) = req.state {
        active.state = Set(v);
    }
    if let Some(v) = req.country {
        active.country = Set(v);
    }
    if let Some(v) = req.zip_code {
        active.zip_code = Set(Some(v));
    }
    if let Some(v) = req.bedrooms {
        active.bedrooms = Set(Some(v));
    }
    if let Some(v) = req.bathrooms {
        active.bathrooms = Set(Some(v));
    }
    if let Some(v) = req.sleeps {
        active.sleeps = Set(Some(v));
    }
    if let Some(v) = req.unit_size {
        active.unit_size = Set(Some(v));
    }
    if let Some(v) = req.floor {
        active.floor = Set(Some(v));
    }
    if let Some(v) = req.view_type {
        active.view_type = Set(Some(v));
    }
    if let Some(v) = req.ownership_type {
        active.ownership_type = Set(Some(v));
    }
    if let Some(v) = req.week_number {
        active.week_number = Set(Some(v));
    }
    if let Some(v) = req.season {
        active.season = Set(Some(v));
    }
    if let Some(v) = req.usage_type {
        active.usage_type = Set(Some(v));
    }
    if let Some(v) = req.sale_price {
        active.sale_price = Set(Some(v));
    }
    if let Some(v) = req.rental_price_weekly {
        active.rental_price_weekly = Set(Some(v));
    }
    if let Some(v) = req.rental_price_nightly {
        active.rental_price_nightly = Set(Some(v));
    }
    if let Some(v) = req.maintenance_fee {
        active.maintenance_fee = Set(Some(v));
    }
    if let Some(v) = req.available_dates {
        active.available_dates = Set(Some(v));
    }
    if let Some(v) = req.check_in_day {
        active.check_in_day = Set(Some(v));
    }
    if let Some(v) = req.amenities {
        active.amenities = Set(Some(v));
    }
    if let Some(v) = req.contact_method {
        active.contact_method = Set(Some(v));
    }
    if let Some(v) = req.contact_phone {
        active.contact_phone = Set(Some(v));
    }
    if let Some(v) = req.contact_email {
        active.contact_email = Set(Some(v));
    }
    if let Some(v) = req.status {
        active.status = Set(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{MembershipStatus, PropertyType};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::collections::BTreeMap;

    fn listing(id: i64, owner: i64, status: ListingStatus) -> listings::Model {
        listings::Model {
            id,
            user_id: owner,
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
            sale_price: Some(rust_decimal::Decimal::new(150_000, 0)),
            rental_price_weekly: None,
            rental_price_nightly: None,
            maintenance_fee: None,
            available_dates: None,
            check_in_day: None,
            amenities: None,
            contact_method: None,
            contact_phone: None,
            contact_email: None,
            status,
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
            sale_price: Some(rust_decimal::Decimal::new(150_000, 0)),
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

    #[tokio::test]
    async fn test_create_listing_denied_at_plan_cap() {
        // free default tier allows a single active listing
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, None)]])
            .append_query_results([vec![count_row(1)]])
            .into_connection();
        let service = ListingService::new(db, PlanCatalog::builtin());

        let err = service
            .create_listing(1, sample_request())
            .await
            .unwrap_err();
        match err {
            AppError::EntitlementError(msg) => {
                assert_eq!(
                    msg,
                    "Listing limit reached. Your Starter plan allows 1 active listing."
                );
            }
            other => panic!("expected entitlement error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_listing_requires_ownership() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![listing(7, 1, ListingStatus::Active)]])
            .into_connection();
        let service = ListingService::new(db, PlanCatalog::builtin());

        let err = service
            .update_listing(2, 7, UpdateListingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_inactive_listing_hidden_from_strangers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![listing(7, 1, ListingStatus::Inactive)],
                vec![listing(7, 1, ListingStatus::Inactive)],
                vec![listing(7, 1, ListingStatus::Inactive)],
            ])
            .into_connection();
        let service = ListingService::new(db, PlanCatalog::builtin());

        assert!(matches!(
            service.get_listing(7, None).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.get_listing(7, Some(2)).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        // the owner still sees it
        assert!(service.get_listing(7, Some(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_add_photos_denied_over_plan_cap() {
        let uploads: Vec<_> = (0..7)
            .map(|i| crate::models::listing::PhotoUpload {
                file_path: format!("/uploads/{i}.jpg"),
                original_filename: None,
                file_size: None,
                width: None,
                height: None,
                caption: None,
                sort_order: None,
                is_main: false,
            })
            .collect();

        // starter cap is 6 photos per listing
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![listing(7, 1, ListingStatus::Active)]])
            .append_query_results([vec![user(1, None)]])
            .append_query_results([vec![count_row(0)]])
            .into_connection();
        let service = ListingService::new(db, PlanCatalog::builtin());

        let err = service
            .add_photos(1, 7, AddPhotosRequest { photos: uploads })
            .await
            .unwrap_err();
        match err {
            AppError::EntitlementError(msg) => {
                assert_eq!(
                    msg,
                    "Photo limit exceeded. Your Starter plan allows up to 6 photos per listing."
                );
            }
            other => panic!("expected entitlement error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_starter_cap_frees_up_after_marking_sold() {
        // create fills the single starter slot, a second create is denied,
        // marking the first listing sold frees the slot again
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(1, None)]])
            .append_query_results([vec![count_row(0)]])
            .append_query_results([vec![listing(10, 1, ListingStatus::Active)]])
            .append_query_results([vec![user(1, None)]])
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![listing(10, 1, ListingStatus::Active)]])
            .append_query_results([vec![listing(10, 1, ListingStatus::Sold)]])
            .append_query_results([vec![user(1, None)]])
            .append_query_results([vec![count_row(0)]])
            .append_query_results([vec![listing(11, 1, ListingStatus::Active)]])
            .into_connection();
        let service = ListingService::new(db, PlanCatalog::builtin());

        let first = service.create_listing(1, sample_request()).await.unwrap();
        assert_eq!(first.id, 10);

        let denied = service
            .create_listing(1, sample_request())
            .await
            .unwrap_err();
        assert!(matches!(denied, AppError::EntitlementError(_)));

        let sold = service
            .update_listing(
                1,
                10,
                UpdateListingRequest {
                    status: Some(ListingStatus::Sold),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(sold.status, ListingStatus::Sold);

        let second = service.create_listing(1, sample_request()).await.unwrap();
        assert_eq!(second.id, 11);
    }

    #[test]
    fn test_at_most_one_upload_keeps_the_main_flag() {
        fn upload(is_main: bool) -> PhotoUpload {
            PhotoUpload {
                file_path: "/uploads/p.jpg".to_string(),
                original_filename: None,
                file_size: None,
                width: None,
                height: None,
                caption: None,
                sort_order: None,
                is_main,
            }
        }

        // two flagged uploads: only the first keeps the flag
        let flags = assign_main_flags(&[upload(true), upload(true)], true);
        assert_eq!(flags, vec![true, false]);

        // nothing flagged, listing already has a main photo
        let flags = assign_main_flags(&[upload(false), upload(false)], true);
        assert_eq!(flags, vec![false, false]);

        // nothing flagged, no main photo yet: promote the first upload
        let flags = assign_main_flags(&[upload(false), upload(false)], false);
        assert_eq!(flags, vec![true, false]);

        assert!(assign_main_flags(&[], false).is_empty());
    }
}
