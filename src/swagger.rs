use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{ListingStatus, MembershipStatus, PropertyType};
use crate::handlers;
use crate::models::common::ApiError;
use crate::models::favorite::{
    FavoriteResponse, FavoriteStatusResponse, FavoriteWithListing, SaveFavoriteRequest,
    UpdateFavoriteNotesRequest,
};
use crate::models::listing::{
    AddPhotosRequest, CreateListingRequest, ListingResponse, PhotoResponse, PhotoUpload,
    SortBy, SortDirection, UpdateListingRequest,
};
use crate::models::membership::{CurrentMembershipResponse, MembershipResponse};
use crate::models::pagination::PaginationInfo;
use crate::models::plan::{PlanComparisonFeature, PlanComparisonResponse, PlanTierResponse};
use crate::models::user::{
    AuthResponse, ListingUsage, LoginRequest, ProfileResponse, RefreshRequest, RegisterRequest,
    TokenPairResponse, UpdateProfileRequest, UserResponse,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_me,
        handlers::user::update_me,
        handlers::user::get_my_membership,
        handlers::plan::list_plans,
        handlers::plan::compare_plans,
        handlers::listing::browse_listings,
        handlers::listing::search_listings,
        handlers::listing::my_listings,
        handlers::listing::create_listing,
        handlers::listing::get_listing,
        handlers::listing::update_listing,
        handlers::listing::delete_listing,
        handlers::listing::record_inquiry,
        handlers::listing::list_photos,
        handlers::listing::add_photos,
        handlers::listing::delete_photo,
        handlers::favorite::list_favorites,
        handlers::favorite::add_favorite,
        handlers::favorite::remove_favorite,
        handlers::favorite::update_notes,
        handlers::favorite::favorite_status,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            UpdateProfileRequest,
            UserResponse,
            ProfileResponse,
            ListingUsage,
            AuthResponse,
            TokenPairResponse,
            PlanTierResponse,
            PlanComparisonFeature,
            PlanComparisonResponse,
            MembershipResponse,
            CurrentMembershipResponse,
            MembershipStatus,
            PropertyType,
            ListingStatus,
            CreateListingRequest,
            UpdateListingRequest,
            ListingResponse,
            SortBy,
            SortDirection,
            AddPhotosRequest,
            PhotoUpload,
            PhotoResponse,
            SaveFavoriteRequest,
            UpdateFavoriteNotesRequest,
            FavoriteResponse,
            FavoriteWithListing,
            FavoriteStatusResponse,
            PaginationInfo,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "users", description = "Profile and membership API"),
        (name = "plans", description = "Subscription tier catalog"),
        (name = "listings", description = "Timeshare listing API"),
        (name = "favorites", description = "Saved listings API"),
    ),
    info(
        title = "Timeshare Marketplace API",
        version = "1.0.0",
        description = "REST API for the timeshare resale and rental marketplace"
    ),
    servers(
        (url = "/", description = "This server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
