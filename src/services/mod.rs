pub mod favorite_service;
pub mod listing_query_service;
pub mod listing_service;
pub mod membership_service;
pub mod user_service;

pub use favorite_service::FavoriteService;
pub use listing_query_service::ListingQueryService;
pub use listing_service::ListingService;
pub use membership_service::MembershipService;
pub use user_service::UserService;
