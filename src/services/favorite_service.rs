use crate::entities::favorite_entity as favorites;
use crate::entities::listing_entity as listings;
use crate::entities::ListingStatus;
use crate::error::{AppError, AppResult};
use crate::models::pagination::PaginationParams;
use chrono::Utc;
use log::info;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, FromQueryResult, Order, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait,
};
use std::collections::HashMap;

#[derive(FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Clone)]
pub struct FavoriteService {
    db: DatabaseConnection,
}

impl FavoriteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Saves a listing to the user's favorites and bumps the listing's
    /// favorite counter in the same transaction. The unique index on
    /// (user_id, listing_id) backstops the existence pre-check under
    /// concurrent saves.
    pub async fn add_favorite(
        &self,
        user_id: i64,
        listing_id: i64,
        notes: Option<String>,
    ) -> AppResult<favorites::Model> {
        let txn = self.db.begin().await?;

        let listing = listings::Entity::find_by_id(listing_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
        if listing.status != ListingStatus::Active {
            return Err(AppError::NotFound("Listing not found".to_string()));
        }

        let existing = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::ListingId.eq(listing_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "Listing already in favorites".to_string(),
            ));
        }

        let favorite = favorites::ActiveModel {
            user_id: Set(user_id),
            listing_id: Set(listing_id),
            notes: Set(notes),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        let favorite = match favorite.insert(&txn).await {
            Ok(favorite) => favorite,
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Err(AppError::Conflict(
                        "Listing already in favorites".to_string(),
                    ));
                }
                return Err(err.into());
            }
        };

        listings::Entity::update_many()
            .col_expr(
                listings::Column::FavoriteCount,
                Expr::col(listings::Column::FavoriteCount).add(1),
            )
            .filter(listings::Column::Id.eq(listing_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!("User {} favorited listing {}", user_id, listing_id);
        Ok(favorite)
    }

    pub async fn remove_favorite(&self, user_id: i64, listing_id: i64) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let deleted = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::ListingId.eq(listing_id))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(AppError::NotFound("Favorite not found".to_string()));
        }

        // decrement clamped at zero
        listings::Entity::update_many()
            .col_expr(
                listings::Column::FavoriteCount,
                Expr::col(listings::Column::FavoriteCount).sub(1),
            )
            .filter(listings::Column::Id.eq(listing_id))
            .filter(listings::Column::FavoriteCount.gt(0))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// The user's saved favorites, newest first, each paired with its
    /// listing. Favorites whose listing has since been deleted cannot occur
    /// (FK cascade), but deactivated listings still show.
    pub async fn list_favorites(
        &self,
        user_id: i64,
        pagination: &PaginationParams,
    ) -> AppResult<(Vec<(favorites::Model, listings::Model)>, u64)> {
        let base = favorites::Entity::find().filter(favorites::Column::UserId.eq(user_id));

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

        let page = base
            .order_by(favorites::Column::CreatedAt, Order::Desc)
            .offset(pagination.get_offset())
            .limit(pagination.get_limit())
            .all(&self.db)
            .await?;

        let listing_ids: Vec<i64> = page.iter().map(|f| f.listing_id).collect();
        let mut by_id: HashMap<i64, listings::Model> = listings::Entity::find()
            .filter(listings::Column::Id.is_in(listing_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        let items = page
            .into_iter()
            .filter_map(|f| by_id.remove(&f.listing_id).map(|l| (f, l)))
            .collect();

        Ok((items, total))
    }

    pub async fn update_notes(
        &self,
        user_id: i64,
        listing_id: i64,
        notes: Option<String>,
    ) -> AppResult<favorites::Model> {
        let favorite = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::ListingId.eq(listing_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Favorite not found".to_string()))?;

        let mut active: favorites::ActiveModel = favorite.into();
        active.notes = Set(notes);
        Ok(active.update(&self.db).await?)
    }

    pub async fn is_favorited(&self, user_id: i64, listing_id: i64) -> AppResult<bool> {
        let existing = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::ListingId.eq(listing_id))
            .one(&self.db)
            .await?;
        Ok(existing.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PropertyType;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn active_listing(id: i64, owner: i64) -> listings::Model {
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

    fn favorite(id: i64, user_id: i64, listing_id: i64) -> favorites::Model {
        favorites::Model {
            id,
            user_id,
            listing_id,
            notes: None,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_add_favorite_rejects_duplicate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![active_listing(7, 2)]])
            .append_query_results([vec![favorite(1, 1, 7)]])
            .into_connection();
        let service = FavoriteService::new(db);

        let err = service.add_favorite(1, 7, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_add_favorite_requires_active_listing() {
        let mut listing = active_listing(7, 2);
        listing.status = ListingStatus::Sold;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![listing]])
            .into_connection();
        let service = FavoriteService::new(db);

        let err = service.add_favorite(1, 7, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_favorite_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let service = FavoriteService::new(db);

        let err = service.remove_favorite(1, 7).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_is_favorited() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![favorite(1, 1, 7)]])
            .append_query_results([Vec::<favorites::Model>::new()])
            .into_connection();
        let service = FavoriteService::new(db);

        assert!(service.is_favorited(1, 7).await.unwrap());
        assert!(!service.is_favorited(1, 8).await.unwrap());
    }
}
