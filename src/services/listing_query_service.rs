use crate::entities::listing_entity as listings;
use crate::entities::{ListingStatus, PropertyType};
use crate::error::AppResult;
use crate::models::listing::{ListingSearchParams, SortBy, SortDirection};
use crate::models::pagination::PaginationParams;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Condition, Expr, Func, SimpleExpr};
use sea_orm::{
    DatabaseConnection, FromQueryResult, Order, QueryOrder, QuerySelect, Select,
};

#[derive(FromQueryResult)]
struct CountRow {
    count: i64,
}

/// Effective sort key for price ordering. Sale-only listings sort by sale
/// price, rental-only by weekly rate, mixed listings by whichever is set
/// first.
fn price_sort_key() -> SimpleExpr {
    SimpleExpr::FunctionCall(Func::coalesce::<_, SimpleExpr>([
        Expr::col(listings::Column::SalePrice).into(),
        Expr::col(listings::Column::RentalPriceWeekly).into(),
    ]))
}

fn contains(column: listings::Column, value: &str) -> SimpleExpr {
    use sea_orm::sea_query::extension::postgres::PgExpr;
    Expr::col(column).ilike(format!("%{}%", value.trim()))
}

/// Read side of the marketplace: public browse/search over `active`
/// listings only. Writes never go through here.
#[derive(Clone)]
pub struct ListingQueryService {
    db: DatabaseConnection,
}

impl ListingQueryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Filtered, ordered select without pagination. Split out so the
    /// generated SQL can be inspected directly.
    pub fn build_search_select(params: &ListingSearchParams) -> Select<listings::Entity> {
        use sea_orm::sea_query::ExprTrait;

        let mut select =
            listings::Entity::find().filter(listings::Column::Status.eq(ListingStatus::Active));

        if let Some(property_type) = params.property_type {
            // "both" listings satisfy either sale or rental searches
            if property_type == PropertyType::Both {
                select = select.filter(listings::Column::PropertyType.eq(PropertyType::Both));
            } else {
                select = select.filter(
                    listings::Column::PropertyType
                        .is_in([property_type, PropertyType::Both]),
                );
            }
        }

        if let Some(city) = params.city.as_deref() {
            select = select.filter(contains(listings::Column::City, city));
        }
        if let Some(state) = params.state.as_deref() {
            select = select.filter(contains(listings::Column::State, state));
        }
        if let Some(country) = params.country.as_deref() {
            select = select.filter(contains(listings::Column::Country, country));
        }
        if let Some(bedrooms) = params.bedrooms {
            select = select.filter(listings::Column::Bedrooms.gte(bedrooms));
        }

        if params.min_price.is_some() || params.max_price.is_some() {
            // a listing matches if either its sale price or its weekly
            // rental rate falls in the requested range
            let mut sale = Condition::all();
            let mut rental = Condition::all();
            if let Some(min) = params.min_price {
                sale = sale.add(listings::Column::SalePrice.gte(min));
                rental = rental.add(listings::Column::RentalPriceWeekly.gte(min));
            }
            if let Some(max) = params.max_price {
                sale = sale.add(listings::Column::SalePrice.lte(max));
                rental = rental.add(listings::Column::RentalPriceWeekly.lte(max));
            }
            select = select.filter(Condition::any().add(sale).add(rental));
        }

        if let Some(q) = params.q.as_deref() {
            let q = q.trim();
            if !q.is_empty() {
                select = select.filter(
                    Condition::any()
                        .add(contains(listings::Column::Title, q))
                        .add(contains(listings::Column::Description, q))
                        .add(contains(listings::Column::ResortName, q))
                        .add(contains(listings::Column::City, q))
                        .add(contains(listings::Column::State, q)),
                );
            }
        }

        // paid placement always wins the first sort position
        select = select.order_by(listings::Column::IsFeatured, Order::Desc);

        let direction = |default: Order| match params.sort_order {
            Some(SortDirection::Asc) => Order::Asc,
            Some(SortDirection::Desc) => Order::Desc,
            None => default,
        };

        match params.sort_by {
            Some(SortBy::Price) => {
                let key = price_sort_key();
                // unpriced listings go last regardless of direction
                select = select
                    .order_by(Expr::expr(key.clone()).is_null(), Order::Asc)
                    .order_by(key, direction(Order::Asc));
            }
            Some(SortBy::ViewCount) => {
                select = select.order_by(listings::Column::ViewCount, direction(Order::Desc));
            }
            Some(SortBy::CreatedAt) | None => {
                select = select.order_by(listings::Column::CreatedAt, direction(Order::Desc));
            }
        }

        select
    }

    pub async fn search(
        &self,
        params: &ListingSearchParams,
    ) -> AppResult<(Vec<listings::Model>, u64)> {
        use sea_orm::sea_query::ExprTrait;

        let pagination = PaginationParams {
            page: params.page,
            per_page: params.per_page,
        };

        let total = {
            let row = Self::build_search_select(params)
                .select_only()
                .column_as(Expr::val(1).count(), "count")
                .into_model::<CountRow>()
                .one(&self.db)
                .await?;
            row.map(|r| r.count as u64).unwrap_or(0)
        };

        let items = Self::build_search_select(params)
            .offset(pagination.get_offset())
            .limit(pagination.get_limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Lightweight free-text lookup for typeahead. Blank queries return
    /// nothing without touching the database.
    pub async fn search_listings(&self, q: &str) -> AppResult<Vec<listings::Model>> {
        let q = q.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let items = listings::Entity::find()
            .filter(listings::Column::Status.eq(ListingStatus::Active))
            .filter(
                Condition::any()
                    .add(contains(listings::Column::Title, q))
                    .add(contains(listings::Column::Description, q))
                    .add(contains(listings::Column::ResortName, q))
                    .add(contains(listings::Column::City, q))
                    .add(contains(listings::Column::State, q)),
            )
            .order_by(listings::Column::IsFeatured, Order::Desc)
            .order_by(listings::Column::CreatedAt, Order::Desc)
            .limit(50)
            .all(&self.db)
            .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(params: &ListingSearchParams) -> String {
        ListingQueryService::build_search_select(params)
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_base_query_is_active_only_and_featured_first() {
        let s = sql(&ListingSearchParams::default());
        // enum values render with a cast, so match loosely
        assert!(s.contains(r#""status" ="#) && s.contains("'active'"), "{s}");
        assert!(s.contains(r#"ORDER BY "listings"."is_featured" DESC"#), "{s}");
        // default sort is newest first
        assert!(s.contains(r#""created_at" DESC"#), "{s}");
    }

    #[test]
    fn test_location_filters_are_case_insensitive_substrings() {
        let params = ListingSearchParams {
            city: Some("orlando".to_string()),
            state: Some("fl".to_string()),
            ..Default::default()
        };
        let s = sql(&params);
        assert!(s.contains(r#""city" ILIKE '%orlando%'"#), "{s}");
        assert!(s.contains(r#""state" ILIKE '%fl%'"#), "{s}");
    }

    #[test]
    fn test_property_type_filter_includes_both() {
        let params = ListingSearchParams {
            property_type: Some(PropertyType::Sale),
            ..Default::default()
        };
        let s = sql(&params);
        assert!(s.contains(r#""property_type" IN"#), "{s}");
        assert!(s.contains("'sale'") && s.contains("'both'"), "{s}");
    }

    #[test]
    fn test_price_range_spans_sale_and_rental_columns() {
        let params = ListingSearchParams {
            min_price: Some(Decimal::new(1_000, 0)),
            max_price: Some(Decimal::new(5_000, 0)),
            ..Default::default()
        };
        let s = sql(&params);
        assert!(s.contains(r#""sale_price" >= 1000"#), "{s}");
        assert!(s.contains(r#""rental_price_weekly" >= 1000"#), "{s}");
        assert!(s.contains(r#""sale_price" <= 5000"#), "{s}");
        assert!(s.contains(" OR "), "{s}");
    }

    #[test]
    fn test_bedrooms_is_a_minimum() {
        let params = ListingSearchParams {
            bedrooms: Some(2),
            ..Default::default()
        };
        let s = sql(&params);
        assert!(s.contains(r#""bedrooms" >= 2"#), "{s}");
    }

    #[test]
    fn test_free_text_spans_expected_columns() {
        let params = ListingSearchParams {
            q: Some("marriott".to_string()),
            ..Default::default()
        };
        let s = sql(&params);
        for col in ["title", "description", "resort_name", "city", "state"] {
            assert!(s.contains(&format!(r#""{col}" ILIKE '%marriott%'"#)), "{s}");
        }
    }

    #[test]
    fn test_blank_free_text_adds_no_filter() {
        let params = ListingSearchParams {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!sql(&params).contains("ILIKE"));
    }

    #[test]
    fn test_price_sort_uses_coalesce_with_nulls_last() {
        let params = ListingSearchParams {
            sort_by: Some(SortBy::Price),
            sort_order: Some(SortDirection::Desc),
            ..Default::default()
        };
        let s = sql(&params);
        assert!(
            s.contains(r#"COALESCE("sale_price", "rental_price_weekly")"#),
            "{s}"
        );
        // NULL keys sort after real prices in either direction
        assert!(s.contains("IS NULL ASC"), "{s}");
        let featured = s.find(r#""is_featured" DESC"#).unwrap();
        let coalesce = s.find("COALESCE").unwrap();
        assert!(featured < coalesce, "featured-first must outrank price: {s}");
    }

    #[test]
    fn test_view_count_sort() {
        let params = ListingSearchParams {
            sort_by: Some(SortBy::ViewCount),
            ..Default::default()
        };
        let s = sql(&params);
        assert!(s.contains(r#""view_count" DESC"#), "{s}");
    }
}
