use crate::middlewares::{current_user_id, optional_user_id};
use crate::models::listing::{
    AddPhotosRequest, CreateListingRequest, FreeTextQuery, ListingResponse, ListingSearchParams,
    PhotoResponse, UpdateListingRequest,
};
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use crate::models::ApiResponse;
use crate::services::{ListingQueryService, ListingService};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};

#[utoipa::path(
    get,
    path = "/api/v1/listings",
    tag = "listings",
    params(ListingSearchParams),
    responses(
        (status = 200, description = "Filtered page of active listings")
    )
)]
pub async fn browse_listings(
    query_service: web::Data<ListingQueryService>,
    params: web::Query<ListingSearchParams>,
) -> Result<HttpResponse> {
    let params = params.into_inner();
    match query_service.search(&params).await {
        Ok((items, total)) => {
            let items: Vec<ListingResponse> = items.into_iter().map(Into::into).collect();
            let pagination = PaginationParams::new(params.page, params.per_page);
            Ok(HttpResponse::Ok().json(ApiResponse::success(PaginatedResponse::new(
                items,
                &pagination,
                total as i64,
            ))))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/listings/search",
    tag = "listings",
    params(FreeTextQuery),
    responses(
        (status = 200, description = "Free-text matches, featured first, capped at 50")
    )
)]
pub async fn search_listings(
    query_service: web::Data<ListingQueryService>,
    params: web::Query<FreeTextQuery>,
) -> Result<HttpResponse> {
    let q = params.q.as_deref().unwrap_or("");
    match query_service.search_listings(q).await {
        Ok(items) => {
            let items: Vec<ListingResponse> = items.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/listings/my",
    tag = "listings",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's listings across all statuses"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_listings(
    listing_service: web::Data<ListingService>,
    req: HttpRequest,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let pagination = params.into_inner();

    match listing_service
        .list_user_listings(user_id, &pagination)
        .await
    {
        Ok((items, total)) => {
            let items: Vec<ListingResponse> = items.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(PaginatedResponse::new(
                items,
                &pagination,
                total as i64,
            ))))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/listings",
    tag = "listings",
    request_body = CreateListingRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Listing created", body = ListingResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Plan listing limit reached")
    )
)]
pub async fn create_listing(
    listing_service: web::Data<ListingService>,
    req: HttpRequest,
    request: web::Json<CreateListingRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match listing_service
        .create_listing(user_id, request.into_inner())
        .await
    {
        Ok(listing) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(ListingResponse::from(listing)))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    tag = "listings",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Listing detail", body = ListingResponse),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn get_listing(
    listing_service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let listing_id = path.into_inner();
    let viewer_id = optional_user_id(&req);

    match listing_service.get_listing(listing_id, viewer_id).await {
        Ok(listing) => {
            // a failed counter bump never fails the read
            let _ = listing_service.record_view(listing_id).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(ListingResponse::from(listing))))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/listings/{id}",
    tag = "listings",
    params(("id" = i64, Path, description = "Listing id")),
    request_body = UpdateListingRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Listing updated", body = ListingResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn update_listing(
    listing_service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateListingRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match listing_service
        .update_listing(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(listing) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(ListingResponse::from(listing))))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    tag = "listings",
    params(("id" = i64, Path, description = "Listing id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Listing deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn delete_listing(
    listing_service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match listing_service.delete_listing(user_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            serde_json::json!({}),
            "Listing deleted".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/inquiry",
    tag = "listings",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Inquiry recorded"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn record_inquiry(
    listing_service: web::Data<ListingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match listing_service.record_inquiry(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            serde_json::json!({}),
            "Inquiry recorded".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}/photos",
    tag = "listings",
    params(("id" = i64, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Photos in sort order")
    )
)]
pub async fn list_photos(
    listing_service: web::Data<ListingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match listing_service.list_photos(path.into_inner()).await {
        Ok(photos) => {
            let photos: Vec<PhotoResponse> = photos.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(photos)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/listings/{id}/photos",
    tag = "listings",
    params(("id" = i64, Path, description = "Listing id")),
    request_body = AddPhotosRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Photos attached"),
        (status = 403, description = "Not the owner or photo limit exceeded"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn add_photos(
    listing_service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AddPhotosRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match listing_service
        .add_photos(user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(photos) => {
            let photos: Vec<PhotoResponse> = photos.into_iter().map(Into::into).collect();
            Ok(HttpResponse::Created().json(ApiResponse::success(photos)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}/photos/{photo_id}",
    tag = "listings",
    params(
        ("id" = i64, Path, description = "Listing id"),
        ("photo_id" = i64, Path, description = "Photo id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Photo removed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Listing or photo not found")
    )
)]
pub async fn delete_photo(
    listing_service: web::Data<ListingService>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let (listing_id, photo_id) = path.into_inner();

    match listing_service
        .delete_photo(user_id, listing_id, photo_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            serde_json::json!({}),
            "Photo removed".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn listing_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/listings")
            // literal segments before the {id} catch-all
            .route("/search", web::get().to(search_listings))
            .route("/my", web::get().to(my_listings))
            .route("", web::get().to(browse_listings))
            .route("", web::post().to(create_listing))
            .route("/{id}", web::get().to(get_listing))
            .route("/{id}", web::put().to(update_listing))
            .route("/{id}", web::delete().to(delete_listing))
            .route("/{id}/inquiry", web::post().to(record_inquiry))
            .route("/{id}/photos", web::get().to(list_photos))
            .route("/{id}/photos", web::post().to(add_photos))
            .route("/{id}/photos/{photo_id}", web::delete().to(delete_photo)),
    );
}
