use crate::middlewares::current_user_id;
use crate::models::favorite::{
    FavoriteResponse, FavoriteStatusResponse, FavoriteWithListing, SaveFavoriteRequest,
    UpdateFavoriteNotesRequest,
};
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use crate::models::ApiResponse;
use crate::services::FavoriteService;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};

#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    tag = "favorites",
    params(PaginationParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's saved listings, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_favorites(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let pagination = params.into_inner();

    match favorite_service.list_favorites(user_id, &pagination).await {
        Ok((items, total)) => {
            let items: Vec<FavoriteWithListing> = items
                .into_iter()
                .map(|(favorite, listing)| FavoriteWithListing {
                    favorite: favorite.into(),
                    listing: listing.into(),
                })
                .collect();
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
    path = "/api/v1/favorites/{listing_id}",
    tag = "favorites",
    params(("listing_id" = i64, Path, description = "Listing id")),
    request_body = SaveFavoriteRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Listing saved", body = FavoriteResponse),
        (status = 404, description = "Listing not found"),
        (status = 409, description = "Already in favorites")
    )
)]
pub async fn add_favorite(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: Option<web::Json<SaveFavoriteRequest>>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let notes = request.and_then(|r| r.into_inner().notes);

    match favorite_service
        .add_favorite(user_id, path.into_inner(), notes)
        .await
    {
        Ok(favorite) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(FavoriteResponse::from(favorite)))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/favorites/{listing_id}",
    tag = "favorites",
    params(("listing_id" = i64, Path, description = "Listing id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorite removed"),
        (status = 404, description = "Favorite not found")
    )
)]
pub async fn remove_favorite(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match favorite_service
        .remove_favorite(user_id, path.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            serde_json::json!({}),
            "Favorite removed".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/favorites/{listing_id}/notes",
    tag = "favorites",
    params(("listing_id" = i64, Path, description = "Listing id")),
    request_body = UpdateFavoriteNotesRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notes updated", body = FavoriteResponse),
        (status = 404, description = "Favorite not found")
    )
)]
pub async fn update_notes(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateFavoriteNotesRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match favorite_service
        .update_notes(user_id, path.into_inner(), request.into_inner().notes)
        .await
    {
        Ok(favorite) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(FavoriteResponse::from(favorite))))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/favorites/{listing_id}/status",
    tag = "favorites",
    params(("listing_id" = i64, Path, description = "Listing id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Whether the caller has saved this listing", body = FavoriteStatusResponse)
    )
)]
pub async fn favorite_status(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;
    let listing_id = path.into_inner();

    match favorite_service.is_favorited(user_id, listing_id).await {
        Ok(is_favorited) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FavoriteStatusResponse {
                listing_id,
                is_favorited,
            },
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn favorite_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/favorites")
            .route("", web::get().to(list_favorites))
            .route("/{listing_id}", web::post().to(add_favorite))
            .route("/{listing_id}", web::delete().to(remove_favorite))
            .route("/{listing_id}/notes", web::put().to(update_notes))
            .route("/{listing_id}/status", web::get().to(favorite_status)),
    );
}
